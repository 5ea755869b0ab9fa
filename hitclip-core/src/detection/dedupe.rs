//! Collapse positive detections into one timestamp per event.
//!
//! A marker stays on screen for several sampled frames, so a single knock
//! produces a burst of positives. Within a burst only the sample right before
//! a gap of more than [`EVENT_GAP_SECS`] survives; the final positive is always
//! kept. Timestamps are rounded to two decimals.

/// Minimum gap between two positives for them to count as separate events.
pub const EVENT_GAP_SECS: f64 = 0.8;

/// Returns one rounded timestamp per distinct event.
///
/// Input must be in non-decreasing order, as produced by a forward scan.
pub fn dedupe_timestamps(timestamps: &[f64]) -> Vec<f64> {
    let Some((&last, _)) = timestamps.split_last() else {
        return Vec::new();
    };

    let mut events: Vec<f64> = timestamps
        .windows(2)
        .filter(|pair| pair[1] - pair[0] > EVENT_GAP_SECS)
        .map(|pair| round_centis(pair[0]))
        .collect();
    events.push(round_centis(last));
    events
}

fn round_centis(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
