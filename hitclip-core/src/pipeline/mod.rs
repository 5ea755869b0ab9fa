//! Batch pipeline: drives detection and extraction over a directory.

pub mod orchestrator;
pub mod progress;

pub use orchestrator::{ClipFailure, Orchestrator, RunOutcome, RunSummary};
pub use progress::{CancellationToken, NullProgress, ProgressSink, RunState};
