// ============================================================================
// hitclip-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console and per-run log file
//
// Installs a fern dispatch with two outputs:
// - console: info (or debug with --verbose), printed above any progress bars
// - file: everything at debug level, timestamped, with ANSI codes removed
//
// Library code and the terminal helpers only ever call the `log` macros.

use crate::error::{CliErrorContext, CliResult};
use crate::terminal::should_use_color;

use hitclip_core::CoreError;
use indicatif::MultiProgress;
use log::{Level, LevelFilter};
use owo_colors::OwoColorize;

use std::fs;
use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Path of the log file for a run started now.
pub fn run_log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("hitclip_run_{}.log", get_timestamp()))
}

/// Installs the global logger. Console lines are routed through `bars` so
/// they never tear an active progress display.
pub fn init(verbose: bool, log_file: &Path, bars: MultiProgress) -> CliResult<()> {
    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent)
            .cli_with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = fern::log_file(log_file)
        .cli_with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    let console_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let color = should_use_color();

    let console = fern::Dispatch::new()
        .level(console_level)
        .format(move |out, message, record| {
            out.finish(format_args!("{}{}", level_tag(record.level(), color), message))
        })
        .chain(fern::Output::call(move |record| {
            bars.suspend(|| println!("{}", record.args()));
        }));

    let file_log = fern::Dispatch::new()
        .level(LevelFilter::Debug)
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                strip_ansi_escapes::strip_str(message.to_string())
            ))
        })
        .chain(file);

    fern::Dispatch::new()
        .level(LevelFilter::Debug)
        .chain(console)
        .chain(file_log)
        .apply()
        .map_err(|e| CoreError::OperationFailed(format!("Failed to install logger: {e}")))
}

/// Prefix for console lines. Info lines carry the terminal styling already.
fn level_tag(level: Level, color: bool) -> String {
    let tag = match level {
        Level::Error => "error: ",
        Level::Warn => "warning: ",
        Level::Info => return String::new(),
        Level::Debug => "debug: ",
        Level::Trace => "trace: ",
    };
    if !color {
        return tag.to_string();
    }
    match level {
        Level::Error => tag.red().bold().to_string(),
        Level::Warn => tag.yellow().to_string(),
        _ => tag.dimmed().to_string(),
    }
}
