// ============================================================================
// hitclip-core/src/pipeline/orchestrator.rs
// ============================================================================
//
// ORCHESTRATOR: Batch Detection and Clipping
//
// Runs every recording of the input directory through
//
//   probe -> sample/decode/classify -> dedupe -> extract -> merge -> delete
//
// strictly one recording and one frame at a time. External tools are reached
// through the spawner, decoder and prober the orchestrator was built with.
//
// FAILURE MODEL:
// - Invalid configuration, missing tools and an empty input directory fail
//   the whole run before any clip is written.
// - A recording that cannot be probed is skipped.
// - Undecodable or undersized frames are skipped.
// - A failed clip is recorded in the summary; later clips still run.
//
// CANCELLATION:
// The token is checked between recordings, between frames and between clips,
// and while an extraction or merge is running (the ffmpeg child is killed and
// its partial output removed). A recording interrupted mid-way gets no further
// clips, no merge and is never deleted.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::RunConfig;
use crate::detection::{
    DecodeControl, DetectionEvent, FrameRead, MarkerClassifier, dedupe_timestamps, frame_indices,
};
use crate::discovery::find_processable_files;
use crate::error::{CoreError, CoreResult};
use crate::external::{
    CrateFfprobeExecutor, FfmpegFrameDecoder, FfmpegSpawner, FfprobeExecutor, FrameDecoder,
    SidecarSpawner, check_dependency,
};
use crate::extraction::{ClipJob, ClipWindow, extract_clip, merge_clips};
use crate::pipeline::progress::{CancellationToken, ProgressSink, RunState, percent};
use crate::utils::format_timestamp;
use crate::video::file_stem;

/// A clip that could not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipFailure {
    pub output_path: PathBuf,
    pub reason: String,
}

/// What a run did, whether it completed or was cancelled.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Recordings whose scan finished.
    pub videos_processed: usize,
    pub events_found: usize,
    pub clips_written: Vec<PathBuf>,
    pub clip_failures: Vec<ClipFailure>,
    pub merged_outputs: Vec<PathBuf>,
    pub deleted_sources: Vec<PathBuf>,
    /// Recordings that could not be probed.
    pub skipped_videos: Vec<PathBuf>,
    pub elapsed: Duration,
}

/// How a run ended.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(RunSummary),
    Cancelled(RunSummary),
}

impl RunOutcome {
    pub fn summary(&self) -> &RunSummary {
        match self {
            RunOutcome::Completed(summary) | RunOutcome::Cancelled(summary) => summary,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunOutcome::Cancelled(_))
    }
}

enum VideoOutcome {
    Completed,
    Cancelled,
}

/// Drives a batch over the recordings of the input directory.
#[derive(Debug, Clone)]
pub struct Orchestrator<S, D, P> {
    spawner: S,
    decoder: D,
    prober: P,
    require_tools: bool,
}

impl Orchestrator<SidecarSpawner, FfmpegFrameDecoder<SidecarSpawner>, CrateFfprobeExecutor> {
    /// Production orchestrator backed by ffmpeg and ffprobe on PATH.
    ///
    /// Runs check that both tools are present before scanning.
    pub fn sidecar() -> Self {
        Self {
            spawner: SidecarSpawner,
            decoder: FfmpegFrameDecoder::new(SidecarSpawner),
            prober: CrateFfprobeExecutor::new(),
            require_tools: true,
        }
    }
}

impl<S, D, P> Orchestrator<S, D, P>
where
    S: FfmpegSpawner,
    D: FrameDecoder,
    P: FfprobeExecutor,
{
    /// Orchestrator over caller-supplied tool implementations.
    pub fn new(spawner: S, decoder: D, prober: P) -> Self {
        Self {
            spawner,
            decoder,
            prober,
            require_tools: false,
        }
    }

    /// Runs the batch described by `config`.
    pub fn run(
        &self,
        config: &RunConfig,
        classifier: &MarkerClassifier,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> CoreResult<RunOutcome> {
        let started = Instant::now();
        let set_state = |state: RunState| {
            log::debug!("Run state: {:?}", state);
            progress.state_changed(&state);
        };
        set_state(RunState::Idle);

        // ====================================================================
        // STEP 1: VALIDATE CONFIGURATION AND TOOLS
        // ====================================================================

        config.validate()?;
        if self.require_tools {
            check_dependency("ffmpeg")?;
            check_dependency("ffprobe")?;
        }

        // ====================================================================
        // STEP 2: SCAN THE INPUT DIRECTORY
        // ====================================================================

        set_state(RunState::Scanning);
        let files = match find_processable_files(&config.input_dir) {
            Ok(files) => files,
            Err(e) => {
                set_state(RunState::Failed(e.to_string()));
                return Err(e);
            }
        };
        let total = files.len() as u64;
        log::info!(
            "Found {} recording(s) in {}",
            total,
            config.input_dir.display()
        );

        // ====================================================================
        // STEP 3: PROCESS EACH RECORDING
        // ====================================================================

        let mut summary = RunSummary::default();
        let mut cancelled = false;

        for (idx, path) in files.iter().enumerate() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let idx = idx as u64;
            progress.report_video_progress(percent(idx, total), idx, total);
            set_state(RunState::Processing {
                video: path.clone(),
            });

            match self.process_video(path, config, classifier, progress, cancel, &mut summary)? {
                VideoOutcome::Completed => {}
                VideoOutcome::Cancelled => {
                    cancelled = true;
                    break;
                }
            }
        }

        summary.elapsed = started.elapsed();
        if cancelled {
            log::info!(
                "Run cancelled after {} clip(s)",
                summary.clips_written.len()
            );
            set_state(RunState::Cancelled);
            Ok(RunOutcome::Cancelled(summary))
        } else {
            progress.report_video_progress(100.0, total, total);
            set_state(RunState::Completed);
            Ok(RunOutcome::Completed(summary))
        }
    }

    fn process_video(
        &self,
        path: &Path,
        config: &RunConfig,
        classifier: &MarkerClassifier,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
        summary: &mut RunSummary,
    ) -> CoreResult<VideoOutcome> {
        let source = match self.prober.probe_video(path) {
            Ok(source) => source,
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                summary.skipped_videos.push(path.to_path_buf());
                return Ok(VideoOutcome::Completed);
            }
        };
        log::info!(
            "Scanning {} ({} frames at {:.2} fps, {}x{})",
            path.display(),
            source.frame_count,
            source.fps,
            source.width,
            source.height
        );

        // ---- Detection ----
        let indices = frame_indices(source.frame_count, config.sample_rate);
        let total = indices.len();
        let mut positives: Vec<DetectionEvent> = Vec::new();
        let mut seen: u64 = 0;
        let mut interrupted = false;

        self.decoder.decode_frames(&source, indices, &mut |read: FrameRead| {
            if cancel.is_cancelled() {
                interrupted = true;
                return Ok(DecodeControl::Stop);
            }

            match read {
                FrameRead::Decoded(frame) => match classifier.classify(&frame.image) {
                    Ok(result) if result.is_match => {
                        log::debug!(
                            "Marker at {} (frame {}, mse {:.1})",
                            format_timestamp(frame.timestamp_secs),
                            frame.index,
                            result.score
                        );
                        positives.push(DetectionEvent {
                            timestamp_secs: frame.timestamp_secs,
                            score: result.score,
                        });
                    }
                    Ok(_) => {}
                    Err(e) if e.is_recoverable() => {
                        log::debug!("Skipping frame {}: {}", frame.index, e);
                    }
                    Err(e) => return Err(e),
                },
                FrameRead::Failed { index } => {
                    log::debug!("Frame {} could not be decoded, skipping", index);
                }
            }

            progress.report_frame_progress(percent(seen, total), seen + 1, total);
            seen += 1;
            Ok(DecodeControl::Continue)
        })?;

        if interrupted || cancel.is_cancelled() {
            log::info!("Scan of {} interrupted", path.display());
            return Ok(VideoOutcome::Cancelled);
        }
        summary.videos_processed += 1;

        let timestamps: Vec<f64> = positives.iter().map(|e| e.timestamp_secs).collect();
        let events = dedupe_timestamps(&timestamps);
        summary.events_found += events.len();
        log::info!("{} event(s) in {}", events.len(), path.display());
        for timestamp in &events {
            log::debug!("  event at {}", format_timestamp(*timestamp));
        }

        // ---- Extraction ----
        let stem = file_stem(path);
        let mut failures = 0usize;
        for (index, timestamp) in events.iter().enumerate() {
            if cancel.is_cancelled() {
                log::info!("Extraction for {} interrupted", path.display());
                return Ok(VideoOutcome::Cancelled);
            }
            let window = ClipWindow::around(*timestamp, config.pre_secs, config.post_secs);
            let job = ClipJob::new(path, &config.output_dir, &stem, index, window);
            match extract_clip(&self.spawner, &job, config.extraction_timeout, cancel) {
                Ok(()) => {
                    log::info!("Wrote {}", job.output_path.display());
                    summary.clips_written.push(job.output_path);
                }
                Err(CoreError::Cancelled) => {
                    log::info!(
                        "Extraction of {} interrupted",
                        job.output_path.display()
                    );
                    return Ok(VideoOutcome::Cancelled);
                }
                Err(e) => {
                    log::error!("{}", e);
                    failures += 1;
                    summary.clip_failures.push(ClipFailure {
                        output_path: job.output_path,
                        reason: extraction_reason(e),
                    });
                }
            }
        }

        // ---- Merge ----
        if config.merge_outputs && !events.is_empty() {
            match merge_clips(
                &self.spawner,
                &config.output_dir,
                &stem,
                config.extraction_timeout,
                cancel,
            ) {
                Ok(Some(merged)) => summary.merged_outputs.push(merged),
                Ok(None) => {}
                Err(CoreError::Cancelled) => {
                    log::info!("Merge for {} interrupted", path.display());
                    return Ok(VideoOutcome::Cancelled);
                }
                Err(e) => log::warn!("Merging clips for {} failed: {}", path.display(), e),
            }
        }

        // ---- Delete ----
        if config.delete_original {
            if failures > 0 {
                log::warn!(
                    "Keeping {}: {} clip(s) failed",
                    path.display(),
                    failures
                );
            } else {
                match std::fs::remove_file(path) {
                    Ok(()) => {
                        log::info!("Deleted {}", path.display());
                        summary.deleted_sources.push(path.to_path_buf());
                    }
                    Err(e) => log::warn!("Could not delete {}: {}", path.display(), e),
                }
            }
        }

        Ok(VideoOutcome::Completed)
    }
}

fn extraction_reason(error: CoreError) -> String {
    match error {
        CoreError::ExtractionFailed { reason, .. } => reason,
        other => other.to_string(),
    }
}
