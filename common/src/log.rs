//! Logging helpers shared by every crate of the workspace.
//!
//! The macro forwards to [`tracing`] with a fixed target so the CLI formatter
//! can pick a dedicated prefix for it.

/// Target used by [`success!`](crate::success).
pub const SUCCESS_TARGET: &str = "pulpvp::success";

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        ::tracing::info!(target: $crate::log::SUCCESS_TARGET, $($arg)*)
    };
}
