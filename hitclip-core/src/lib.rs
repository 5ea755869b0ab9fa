//! Core library for finding knock/elimination markers in gameplay recordings
//! and cutting short clips around them using ffmpeg and ffprobe.
//!
//! This crate provides recording discovery, sampled frame decoding, marker
//! template matching, event deduplication, lossless clip extraction and the
//! batch orchestrator that ties them together.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use hitclip_core::config::RunConfigBuilder;
//! use hitclip_core::detection::MarkerClassifier;
//! use hitclip_core::pipeline::{CancellationToken, NullProgress, Orchestrator, RunOutcome};
//! use std::path::PathBuf;
//!
//! let config = RunConfigBuilder::new()
//!     .input_dir(PathBuf::from("/recordings"))
//!     .output_dir(PathBuf::from("/clips"))
//!     .pre_secs(4.0)
//!     .post_secs(3.0)
//!     .build()
//!     .unwrap();
//! config.validate().unwrap();
//!
//! let classifier = MarkerClassifier::load(&config.reference_image).unwrap();
//! let outcome = Orchestrator::sidecar()
//!     .run(&config, &classifier, &NullProgress, &CancellationToken::new())
//!     .unwrap();
//!
//! if let RunOutcome::Completed(summary) = outcome {
//!     println!("{} clips written", summary.clips_written.len());
//! }
//! ```

pub mod config;
pub mod detection;
pub mod discovery;
pub mod error;
pub mod external;
pub mod extraction;
pub mod pipeline;
pub mod utils;
pub mod video;

// Re-exports for public API
pub use config::{RawRunSettings, RunConfig, RunConfigBuilder};
pub use detection::{Classification, MarkerClassifier, dedupe_timestamps, frame_indices};
pub use discovery::find_processable_files;
pub use error::{CoreError, CoreResult};
pub use extraction::{ClipJob, ClipWindow};
pub use pipeline::{
    CancellationToken, ClipFailure, NullProgress, Orchestrator, ProgressSink, RunOutcome,
    RunState, RunSummary,
};
pub use utils::{format_duration, format_timestamp};
pub use video::VideoSource;
