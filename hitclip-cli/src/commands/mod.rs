//! Command implementations for the CLI.

/// The `clip` command: detect hits and cut clips around them.
pub mod clip;
