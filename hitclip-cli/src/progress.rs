// ============================================================================
// hitclip-cli/src/progress.rs
// ============================================================================
//
// PROGRESS DISPLAY: indicatif bars fed by the pipeline's progress callbacks
//
// Two bars share one MultiProgress: the batch bar counts recordings, the scan
// bar counts sampled frames of the current recording. The same MultiProgress
// is handed to the logger so log lines are printed above the bars.

use hitclip_core::{ProgressSink, RunState};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use std::io::IsTerminal;
use std::time::Duration;

/// Creates the shared bar area, hidden when stderr is not a terminal.
pub fn new_multi_progress() -> MultiProgress {
    if std::io::stderr().is_terminal() {
        MultiProgress::new()
    } else {
        MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
    }
}

fn bar_style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##.")
}

/// `ProgressSink` that drives a batch bar and a per-recording scan bar.
pub struct IndicatifProgress {
    videos: ProgressBar,
    frames: ProgressBar,
}

impl IndicatifProgress {
    pub fn new(multi: &MultiProgress) -> Self {
        let videos = multi.add(ProgressBar::new(0));
        videos.set_style(bar_style(
            "  ⧖ Recordings: {pos}/{len} [{bar:30}] {elapsed_precise}",
        ));

        let frames = multi.add(ProgressBar::new(0));
        frames.set_style(bar_style(
            "    Scanning:   {percent:>3}% [{bar:30}] {pos}/{len} frames {msg}",
        ));
        frames.enable_steady_tick(Duration::from_millis(200));

        Self { videos, frames }
    }

    /// Removes both bars from the terminal.
    pub fn finish(&self) {
        self.frames.finish_and_clear();
        self.videos.finish_and_clear();
    }
}

impl ProgressSink for IndicatifProgress {
    fn report_frame_progress(&self, _percent: f32, current: u64, total: u64) {
        self.frames.set_length(total);
        self.frames.set_position(current);
    }

    fn report_video_progress(&self, _percent: f32, current: u64, total: u64) {
        self.videos.set_length(total);
        self.videos.set_position(current);
    }

    fn state_changed(&self, state: &RunState) {
        match state {
            RunState::Processing { video } => {
                self.frames.reset();
                self.frames.set_length(0);
                let name = video
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.frames.set_message(name);
            }
            RunState::Completed | RunState::Cancelled | RunState::Failed(_) => self.finish(),
            RunState::Idle | RunState::Scanning => {}
        }
    }
}
