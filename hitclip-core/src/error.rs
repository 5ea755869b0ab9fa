// ============================================================================
// hitclip-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Core Error Types and Helpers
//
// This module defines the error enum shared by every part of hitclip-core and
// a handful of constructors for the command-execution variants, so callers do
// not have to format the same messages over and over.
//
// PROPAGATION:
// - Per-frame errors (InvalidFrameSize) and per-clip errors (ExtractionFailed)
//   are absorbed by the orchestrator and never abort a batch.
// - Cancelled ends the current recording's work without counting as a failure.
// - Configuration, reference image and discovery errors abort before or at
//   batch start.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors produced by hitclip-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("No compatible video files found (supported: .mp4)")]
    NoFilesFound,

    #[error("Invalid configuration:\n{}", .0.join("\n"))]
    InvalidConfig(Vec<String>),

    #[error("Reference marker image unavailable at {}: {reason}", path.display())]
    ReferenceImageMissing { path: PathBuf, reason: String },

    #[error("Frame of {width}x{height} is smaller than the 100x100 detection window")]
    InvalidFrameSize { width: u32, height: u32 },

    #[error("Clip extraction failed for {}: {reason}", output.display())]
    ExtractionFailed { output: PathBuf, reason: String },

    #[error("Required dependency '{0}' not found on PATH")]
    DependencyNotFound(String),

    #[error("Failed to start {command}: {source}")]
    CommandStart {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed waiting on {command}: {source}")]
    CommandWait {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{command} exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("ffprobe output could not be parsed: {0}")]
    FfprobeParse(String),

    #[error("Video information error: {0}")]
    VideoInfoError(String),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("{0}")]
    OperationFailed(String),

    #[error("Cancelled")]
    Cancelled,
}

/// Result type used throughout hitclip-core.
pub type CoreResult<T> = Result<T, CoreError>;

/// Builds a `CommandStart` error for a process that could not be spawned.
pub fn command_start_error(command: impl Into<String>, source: io::Error) -> CoreError {
    CoreError::CommandStart {
        command: command.into(),
        source,
    }
}

/// Builds a `CommandWait` error for a process whose status could not be collected.
pub fn command_wait_error(command: impl Into<String>, source: io::Error) -> CoreError {
    CoreError::CommandWait {
        command: command.into(),
        source,
    }
}

/// Builds a `CommandFailed` error for a process that exited unsuccessfully.
pub fn command_failed_error(
    command: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        command: command.into(),
        status,
        stderr: stderr.into(),
    }
}

impl CoreError {
    /// True for errors that only affect a single frame or clip.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidFrameSize { .. } | CoreError::ExtractionFailed { .. }
        )
    }
}
