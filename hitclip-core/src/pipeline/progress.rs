//! Progress reporting and cancellation seams between the pipeline and its
//! front end.
//!
//! The pipeline runs on a worker thread, so both types are shared across
//! threads: sinks must be `Send + Sync`, and the token is an atomic flag.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Lifecycle of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Scanning,
    Processing { video: PathBuf },
    Completed,
    Cancelled,
    Failed(String),
}

/// Receives progress updates from a run.
pub trait ProgressSink: Send + Sync {
    /// Called once per sampled frame of the current recording.
    fn report_frame_progress(&self, percent: f32, current: u64, total: u64);

    /// Called before each recording and once more when the batch completes.
    fn report_video_progress(&self, percent: f32, current: u64, total: u64);

    /// Called on each state transition.
    fn state_changed(&self, _state: &RunState) {}
}

/// Sink that discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report_frame_progress(&self, _percent: f32, _current: u64, _total: u64) {}
    fn report_video_progress(&self, _percent: f32, _current: u64, _total: u64) {}
}

/// Cooperative cancellation flag, checked between frames and recordings.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// `current / total` as a percentage, 0 for an empty total.
pub fn percent(current: u64, total: u64) -> f32 {
    if total == 0 {
        0.0
    } else {
        (current as f64 / total as f64 * 100.0) as f32
    }
}
