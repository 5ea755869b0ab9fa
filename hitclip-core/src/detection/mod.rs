//! Marker detection
//!
//! Turns a recording into event timestamps: [`sampler`] picks the frames to
//! inspect, [`classifier`] decides whether the marker is visible in each one,
//! and [`dedupe`] folds bursts of positives into single events.

pub mod classifier;
pub mod dedupe;
pub mod sampler;

pub use classifier::{Classification, MarkerClassifier};
pub use dedupe::dedupe_timestamps;
pub use sampler::{DecodeControl, FrameIndices, FrameRead, SampledFrame, frame_indices};

/// A sampled frame the classifier flagged as showing the marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionEvent {
    pub timestamp_secs: f64,
    pub score: f64,
}
