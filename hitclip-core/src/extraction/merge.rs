//! Concatenation of the clips in the output directory.
//!
//! Uses ffmpeg's concat demuxer with stream copy. The list file lives in a
//! temporary file that is removed once ffmpeg is done.

use std::cmp::Ordering;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ffmpeg_sidecar::command::FfmpegCommand;

use crate::discovery::has_video_extension;
use crate::error::{CoreError, CoreResult, command_failed_error};
use crate::external::ffmpeg_executor::{FfmpegSpawner, WaitOutcome, wait_with_timeout};
use crate::extraction::clip::remove_partial_output;
use crate::pipeline::progress::CancellationToken;

/// Suffix of a merged output, `<stem>-final.mp4`.
pub const MERGED_SUFFIX: &str = "-final";

/// Path of the merged output for a recording.
pub fn merged_output_path(output_dir: &Path, stem: &str) -> PathBuf {
    output_dir.join(format!("{stem}{MERGED_SUFFIX}.mp4"))
}

/// Lists the clips to merge, excluding earlier merge outputs.
///
/// Sorted by name prefix, then by the trailing `-<n>` ordinal numerically, so
/// `a-2.mp4` comes before `a-10.mp4`.
pub fn collect_merge_inputs(output_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let mut clips: Vec<PathBuf> = std::fs::read_dir(output_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && has_video_extension(path))
        .filter(|path| !stem_of(path).ends_with(MERGED_SUFFIX))
        .collect();
    clips.sort_by(|a, b| compare_clip_names(&stem_of(a), &stem_of(b)));
    Ok(clips)
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn split_ordinal(stem: &str) -> (&str, Option<u64>) {
    match stem.rsplit_once('-') {
        Some((prefix, ordinal)) => match ordinal.parse::<u64>() {
            Ok(n) => (prefix, Some(n)),
            Err(_) => (stem, None),
        },
        None => (stem, None),
    }
}

fn compare_clip_names(a: &str, b: &str) -> Ordering {
    let (prefix_a, ordinal_a) = split_ordinal(a);
    let (prefix_b, ordinal_b) = split_ordinal(b);
    prefix_a
        .cmp(prefix_b)
        .then(ordinal_a.cmp(&ordinal_b))
        .then_with(|| a.cmp(b))
}

/// Escapes a path for a concat demuxer `file '...'` line.
fn concat_entry(path: &Path) -> String {
    format!("file '{}'\n", path.to_string_lossy().replace('\'', "'\\''"))
}

/// Builds the concat command for a prepared list file.
pub fn build_merge_command(list_path: &Path, output_path: &Path) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.args(["-hide_banner", "-nostats", "-loglevel", "error"]);
    cmd.args(["-f", "concat", "-safe", "0"]);
    cmd.input(list_path);
    cmd.args(["-c", "copy"]);
    cmd.output(output_path);
    cmd
}

/// Concatenates every clip in `output_dir` into `<stem>-final.mp4`.
///
/// Returns `Ok(None)` when the directory holds no clips and
/// `Err(CoreError::Cancelled)` when a cancel request interrupts ffmpeg.
pub fn merge_clips<S: FfmpegSpawner>(
    spawner: &S,
    output_dir: &Path,
    stem: &str,
    timeout: Duration,
    cancel: &CancellationToken,
) -> CoreResult<Option<PathBuf>> {
    let inputs = collect_merge_inputs(output_dir)?;
    if inputs.is_empty() {
        log::debug!("No clips in {} to merge", output_dir.display());
        return Ok(None);
    }

    let output_path = merged_output_path(output_dir, stem);
    if output_path.exists() {
        std::fs::remove_file(&output_path)?;
    }

    let mut list = tempfile::Builder::new()
        .prefix("hitclip-concat-")
        .suffix(".txt")
        .tempfile()?;
    for input in &inputs {
        // The demuxer resolves relative entries against the list's directory.
        let absolute = std::path::absolute(input)?;
        list.write_all(concat_entry(&absolute).as_bytes())?;
    }
    list.flush()?;

    log::info!(
        "Merging {} clips into {}",
        inputs.len(),
        output_path.display()
    );

    let mut process = spawner.spawn(build_merge_command(list.path(), &output_path))?;
    let error = match wait_with_timeout(&mut process, timeout, cancel)? {
        WaitOutcome::Exited(status) if status.success() => return Ok(Some(output_path)),
        WaitOutcome::Exited(status) => {
            command_failed_error("ffmpeg (merge)", status, "concat merge failed")
        }
        WaitOutcome::TimedOut => CoreError::OperationFailed(format!(
            "Merging into {} did not finish within {:?}",
            output_path.display(),
            timeout
        )),
        WaitOutcome::Cancelled => CoreError::Cancelled,
    };
    remove_partial_output(&output_path);
    Err(error)
}
