// ============================================================================
// hitclip-core/src/extraction/clip.rs
// ============================================================================
//
// CLIP EXTRACTION: Lossless Trim of One Event
//
// Each event becomes `<output_dir>/<stem>-<index>.mp4`, cut with stream copy
// so no re-encoding happens. The seek is keyframe-based (`-noaccurate_seek`),
// and `-avoid_negative_ts make_zero` rebases the timestamps of the cut.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ffmpeg_sidecar::command::FfmpegCommand;

use crate::error::{CoreError, CoreResult};
use crate::external::ffmpeg_executor::{FfmpegSpawner, WaitOutcome, wait_with_timeout};
use crate::extraction::window::ClipWindow;
use crate::pipeline::progress::CancellationToken;

/// One clip to cut from a recording.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipJob {
    pub source_path: PathBuf,
    pub window: ClipWindow,
    pub output_path: PathBuf,
}

impl ClipJob {
    /// Job for the `index`-th event of `source_path`.
    pub fn new(
        source_path: &Path,
        output_dir: &Path,
        stem: &str,
        index: usize,
        window: ClipWindow,
    ) -> Self {
        Self {
            source_path: source_path.to_path_buf(),
            window,
            output_path: clip_output_path(output_dir, stem, index),
        }
    }
}

/// `<output_dir>/<stem>-<index>.mp4`
pub fn clip_output_path(output_dir: &Path, stem: &str, index: usize) -> PathBuf {
    output_dir.join(format!("{stem}-{index}.mp4"))
}

/// Builds the trim command for a job.
pub fn build_extract_command(job: &ClipJob) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.args(["-hide_banner", "-nostats", "-loglevel", "error"]);
    cmd.args([
        "-noaccurate_seek".to_string(),
        "-ss".to_string(),
        format!("{:.2}", job.window.start_secs),
        "-i".to_string(),
        job.source_path.to_string_lossy().into_owned(),
        "-t".to_string(),
        format!("{:.2}", job.window.duration_secs()),
        "-vcodec".to_string(),
        "copy".to_string(),
        "-acodec".to_string(),
        "copy".to_string(),
        "-avoid_negative_ts".to_string(),
        "make_zero".to_string(),
        job.output_path.to_string_lossy().into_owned(),
    ]);
    cmd
}

/// Cuts one clip, replacing any existing file at the output path.
///
/// A missing source, a spawn failure, a non-zero exit or a run longer than
/// `timeout` all yield `CoreError::ExtractionFailed`. A cancel request while
/// ffmpeg runs kills it and yields `CoreError::Cancelled`. Whatever ffmpeg
/// wrote before an unsuccessful end is removed.
pub fn extract_clip<S: FfmpegSpawner>(
    spawner: &S,
    job: &ClipJob,
    timeout: Duration,
    cancel: &CancellationToken,
) -> CoreResult<()> {
    let failed = |reason: String| CoreError::ExtractionFailed {
        output: job.output_path.clone(),
        reason,
    };

    if !job.source_path.is_file() {
        return Err(failed(format!(
            "source {} does not exist",
            job.source_path.display()
        )));
    }

    if job.output_path.exists() {
        log::debug!("Removing existing clip {}", job.output_path.display());
        std::fs::remove_file(&job.output_path)
            .map_err(|e| failed(format!("could not remove existing file: {e}")))?;
    }

    log::debug!(
        "Extracting {:.2}s-{:.2}s of {} to {}",
        job.window.start_secs,
        job.window.end_secs,
        job.source_path.display(),
        job.output_path.display()
    );

    let mut process = spawner
        .spawn(build_extract_command(job))
        .map_err(|e| failed(e.to_string()))?;

    let error = match wait_with_timeout(&mut process, timeout, cancel)? {
        WaitOutcome::Exited(status) if status.success() => return Ok(()),
        WaitOutcome::Exited(status) => failed(format!("ffmpeg exited with {status}")),
        WaitOutcome::TimedOut => failed(format!("ffmpeg did not finish within {timeout:?}")),
        WaitOutcome::Cancelled => CoreError::Cancelled,
    };
    remove_partial_output(&job.output_path);
    Err(error)
}

/// Deletes a half-written output; a missing file is fine.
pub(crate) fn remove_partial_output(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => log::debug!("Removed partial output {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Could not remove partial output {}: {}", path.display(), e),
    }
}
