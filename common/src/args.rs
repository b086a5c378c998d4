//! # Board Argument Parser
//!
//! Boards declare the command-line arguments they understand while they are
//! being constructed; the user supplies values as `--arg name=value`.
//! Once the selected target is built, [`ArgParser::check_unknown`] rejects
//! values nobody declared.

use std::collections::BTreeMap;

use crate::error::BoardError;

/// A declared board argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: String,
    pub default: Option<String>,
    pub help: String,
}

#[derive(Clone, Debug, Default)]
pub struct ArgParser {
    declared: Vec<ArgSpec>,
    supplied: BTreeMap<String, String>,
}

impl ArgParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser holding user supplied `name=value` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, BoardError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parser = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| BoardError::MalformedArgument(pair.to_string()))?;
            let name = normalize_name(name).ok_or_else(|| BoardError::MalformedArgument(pair.to_string()))?;
            parser.supplied.insert(name, value.trim().to_string());
        }
        Ok(parser)
    }

    pub fn supply(&mut self, name: &str, value: impl Into<String>) -> Result<(), BoardError> {
        let name = normalize_name(name).ok_or_else(|| BoardError::MalformedArgument(name.to_string()))?;
        self.supplied.insert(name, value.into());
        Ok(())
    }

    /// Declares an argument. Declaring the same name twice is an error.
    pub fn add_argument(&mut self, name: &str, default: Option<&str>, help: &str) -> Result<(), BoardError> {
        let name = normalize_name(name).ok_or_else(|| BoardError::MalformedArgument(name.to_string()))?;
        if self.is_declared(&name) {
            return Err(BoardError::DuplicateArgument(name));
        }

        tracing::trace!(argument = %name, "declared board argument");
        self.declared.push(ArgSpec {
            name,
            default: default.map(str::to_string),
            help: help.to_string(),
        });
        Ok(())
    }

    pub fn is_declared(&self, name: &str) -> bool {
        normalize_name(name).is_some_and(|name| self.declared.iter().any(|spec| spec.name == name))
    }

    /// Value of a declared argument: the supplied one, else its default.
    pub fn value(&self, name: &str) -> Option<&str> {
        let name = normalize_name(name)?;
        let spec = self.declared.iter().find(|spec| spec.name == name)?;
        self.supplied
            .get(&name)
            .map(String::as_str)
            .or(spec.default.as_deref())
    }

    /// Declared arguments in declaration order along with their resolved value.
    pub fn arguments(&self) -> impl Iterator<Item = (&ArgSpec, Option<&str>)> {
        self.declared.iter().map(move |spec| (spec, self.value(&spec.name)))
    }

    pub fn check_unknown(&self) -> Result<(), BoardError> {
        match self.supplied.keys().find(|name| !self.is_declared(name)) {
            Some(name) => Err(BoardError::UnknownArgument(name.clone())),
            None => Ok(()),
        }
    }
}

fn normalize_name(name: &str) -> Option<String> {
    let name = name.trim().trim_start_matches('-');
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some(name.to_string())
}
