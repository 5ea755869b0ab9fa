// hitclip-cli/src/lib.rs
//
// Library portion of the hitclip CLI: argument definitions, command logic,
// settings record, logging and terminal presentation.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod progress;
pub mod settings;
pub mod terminal;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, ClipArgs, Commands};
pub use commands::clip::run_clip;
pub use error::{CliErrorContext, CliResult};
