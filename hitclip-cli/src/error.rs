// ============================================================================
// hitclip-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Result alias and context helpers
//
// The CLI reports failures with the core error type so that `main` has a
// single thing to print. `CliErrorContext` prefixes a failure with what the
// CLI was doing when it happened.

use hitclip_core::{CoreError, CoreResult};

use std::fmt;

/// Result type for CLI operations.
pub type CliResult<T> = CoreResult<T>;

/// Adds a description of the failed step to an error.
pub trait CliErrorContext<T> {
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display;

    /// Like `cli_context`, building the message only on failure.
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| CoreError::OperationFailed(format!("{context}: {}", e.into())))
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| CoreError::OperationFailed(format!("{}: {}", f(), e.into())))
    }
}

impl<T> CliErrorContext<T> for Option<T> {
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.ok_or_else(|| CoreError::OperationFailed(context.to_string()))
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| CoreError::OperationFailed(f().to_string()))
    }
}
