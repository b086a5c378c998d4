use thiserror::Error;

/// Errors raised while assembling a virtual board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("unknown target '{0}'")]
    UnknownTarget(String),

    #[error("target '{0}' is already registered")]
    DuplicateTarget(String),

    #[error("malformed option '{0}', expected <path>=<value>")]
    MalformedOption(String),

    #[error("invalid value '{value}' for option '{key}': {reason}")]
    InvalidOption {
        key: String,
        value: String,
        reason: String,
    },

    #[error("malformed argument '{0}', expected <name>=<value>")]
    MalformedArgument(String),

    #[error("argument '{0}' is declared twice")]
    DuplicateArgument(String),

    #[error("unrecognized argument '{0}'")]
    UnknownArgument(String),

    #[error("invalid value '{value}' for argument '{name}': {reason}")]
    InvalidArgument {
        name: String,
        value: String,
        reason: String,
    },
}
