//! Clip time windows.

/// Start and end of a clip, in seconds from the start of the recording.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipWindow {
    pub start_secs: f64,
    pub end_secs: f64,
}

impl ClipWindow {
    /// Window of `pre` seconds before and `post` seconds after `timestamp`,
    /// clamped so it never starts before zero.
    pub fn around(timestamp: f64, pre: f64, post: f64) -> Self {
        Self {
            start_secs: (timestamp - pre).max(0.0),
            end_secs: timestamp + post,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}
