//! FFprobe integration for reading recording properties
//!
//! The orchestrator needs the frame count (to size the sampling sequence and
//! the progress bar), the frame rate and the frame dimensions of the first
//! video stream. Everything goes through the `ffprobe` crate.

use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use crate::video::VideoSource;
use ffprobe::{FfProbeError, ffprobe};
use std::path::Path;

/// Trait for probing recordings, so tests can supply canned properties.
pub trait FfprobeExecutor {
    /// Reads the properties of the first video stream of `input_path`.
    fn probe_video(&self, input_path: &Path) -> CoreResult<VideoSource>;
}

/// `FfprobeExecutor` backed by the `ffprobe` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl FfprobeExecutor for CrateFfprobeExecutor {
    fn probe_video(&self, input_path: &Path) -> CoreResult<VideoSource> {
        log::debug!(
            "Running ffprobe (via crate) for video properties on: {}",
            input_path.display()
        );
        let metadata = ffprobe(input_path).map_err(|err| {
            log::error!(
                "ffprobe failed for video properties on {}: {:?}",
                input_path.display(),
                err
            );
            map_ffprobe_error(err, "video properties")
        })?;

        let video_stream = metadata
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| {
                CoreError::VideoInfoError(format!(
                    "No video stream found in {}",
                    input_path.display()
                ))
            })?;

        let (width, height) = match (video_stream.width, video_stream.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w as u32, h as u32),
            (w, h) => {
                return Err(CoreError::VideoInfoError(format!(
                    "Invalid dimensions in {}: width={:?}, height={:?}",
                    input_path.display(),
                    w,
                    h
                )));
            }
        };

        let fps = parse_frame_rate(&video_stream.avg_frame_rate)
            .or_else(|| parse_frame_rate(&video_stream.r_frame_rate))
            .ok_or_else(|| {
                CoreError::FfprobeParse(format!(
                    "No usable frame rate for {} (avg={}, r={})",
                    input_path.display(),
                    video_stream.avg_frame_rate,
                    video_stream.r_frame_rate
                ))
            })?;

        let duration = video_stream
            .duration
            .as_deref()
            .or(metadata.format.duration.as_deref())
            .and_then(|d| d.parse::<f64>().ok());

        let frame_count = video_stream
            .nb_frames
            .as_deref()
            .and_then(|n| n.parse::<u64>().ok())
            .filter(|&n| n > 0)
            .or_else(|| duration.map(|d| (d * fps).round() as u64))
            .ok_or_else(|| {
                CoreError::FfprobeParse(format!(
                    "Could not determine frame count for {}",
                    input_path.display()
                ))
            })?;

        Ok(VideoSource {
            path: input_path.to_path_buf(),
            frame_count,
            fps,
            width,
            height,
        })
    }
}

/// Parses an ffprobe rate such as `"30000/1001"` or `"60"`.
///
/// Returns `None` for zero, negative or malformed rates (`"0/0"` is common for
/// streams without a known rate).
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    let value = match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate.trim().parse().ok()?,
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

fn map_ffprobe_error(err: FfProbeError, context: &str) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error(format!("ffprobe ({context})"), io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            command_failed_error(format!("ffprobe ({context})"), output.status, stderr)
        }
        FfProbeError::Deserialize(err) => CoreError::JsonParseError(format!(
            "ffprobe {context} output deserialization: {err}"
        )),
        _ => CoreError::FfprobeParse(format!("Unknown ffprobe error during {context}: {err:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rates_parse_as_fractions_or_plain_numbers() {
        assert_eq!(parse_frame_rate("30/1"), Some(30.0));
        assert_eq!(parse_frame_rate("60"), Some(60.0));
        let ntsc = parse_frame_rate("30000/1001").unwrap();
        assert!((ntsc - 29.97).abs() < 0.01);
    }

    #[test]
    fn unknown_frame_rates_are_rejected() {
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("abc"), None);
        assert_eq!(parse_frame_rate("-1/1"), None);
    }
}
