//! Formatting helpers shared by the library logs and the CLI summary.

/// Formats seconds as `HH:MM:SS`.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats a position in a recording as `MM:SS.cc`, or `H:MM:SS.cc` past an hour.
#[must_use]
pub fn format_timestamp(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "--:--.--".to_string();
    }

    let centis = (seconds * 100.0).round() as u64;
    let hours = centis / 360_000;
    let minutes = (centis % 360_000) / 6000;
    let secs = (centis % 6000) / 100;
    let frac = centis % 100;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}.{frac:02}")
    } else {
        format!("{minutes:02}:{secs:02}.{frac:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_are_zero_padded() {
        assert_eq!(format_duration(0.0), "00:00:00");
        assert_eq!(format_duration(3725.9), "01:02:05");
        assert_eq!(format_duration(-1.0), "??:??:??");
    }

    #[test]
    fn timestamps_keep_centiseconds() {
        assert_eq!(format_timestamp(1.5), "00:01.50");
        assert_eq!(format_timestamp(754.25), "12:34.25");
        assert_eq!(format_timestamp(3661.0), "1:01:01.00");
    }
}
