// hitclip-core/tests/common/mod.rs
//
// Scripted stand-ins for ffmpeg, ffprobe and the frame decoder, plus a small
// fixture that wires them into an Orchestrator over temporary directories.

#![allow(dead_code)]

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use hitclip_core::config::{RunConfig, RunConfigBuilder};
use hitclip_core::detection::sampler::{DecodeControl, FrameIndices, FrameRead, SampledFrame};
use hitclip_core::detection::MarkerClassifier;
use hitclip_core::error::{CoreError, CoreResult};
use hitclip_core::external::frame_decoder::FrameHandler;
use hitclip_core::external::{FfmpegProcess, FfmpegSpawner, FfprobeExecutor, FrameDecoder};
use hitclip_core::pipeline::{Orchestrator, ProgressSink, RunState};
use hitclip_core::{CancellationToken, VideoSource};
use image::{Rgb, RgbImage, imageops};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::ops::ControlFlow;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::{TempDir, tempdir};

// ---- Marker pictures ----

pub const MARKER_RGB: Rgb<u8> = Rgb([230, 70, 40]);

/// Same pattern as the bundled `assets/expected.png`.
pub fn marker_reference() -> RgbImage {
    RgbImage::from_fn(100, 100, |x, y| {
        let (x, y) = (i64::from(x), i64::from(y));
        let on_diagonal = (x - y).abs() <= 3 || (x + y - 99).abs() <= 3;
        let outside_diamond = (x - 50).abs() + (y - 50).abs() > 52;
        if on_diagonal && outside_diamond {
            MARKER_RGB
        } else {
            Rgb([0, 0, 0])
        }
    })
}

pub fn classifier() -> MarkerClassifier {
    MarkerClassifier::from_reference(&marker_reference())
}

pub fn marker_frame() -> RgbImage {
    let mut frame = RgbImage::from_pixel(320, 240, Rgb([15, 15, 15]));
    imageops::replace(&mut frame, &marker_reference(), 110, 70);
    frame
}

pub fn blank_frame() -> RgbImage {
    RgbImage::from_pixel(320, 240, Rgb([15, 15, 15]))
}

// ---- FFmpeg mocks ----

/// Mock implementation of FfmpegProcess.
pub struct MockFfmpegProcess {
    events: Vec<FfmpegEvent>,
    exit_status: ExitStatus,
    hang: bool,
    killed: Rc<Cell<bool>>,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<ControlFlow<()>>,
    {
        for event in self.events.drain(..) {
            if handler(event)?.is_break() {
                break;
            }
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }

    fn try_wait(&mut self) -> CoreResult<Option<ExitStatus>> {
        if self.hang && !self.killed.get() {
            Ok(None)
        } else {
            Ok(Some(self.exit_status))
        }
    }

    fn kill(&mut self) -> CoreResult<()> {
        self.killed.set(true);
        Ok(())
    }
}

/// Mock spawner: records every command, succeeds by default and creates an
/// empty file at the last argument (the output path) on success.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    received_calls: Rc<RefCell<Vec<Vec<String>>>>,
    fail_patterns: Rc<RefCell<Vec<String>>>,
    hang_patterns: Rc<RefCell<Vec<String>>>,
    spawn_error_patterns: Rc<RefCell<Vec<String>>>,
    partial_patterns: Rc<RefCell<Vec<String>>>,
    cancel_on_spawn: Rc<RefCell<Option<(String, CancellationToken)>>>,
    killed: Rc<Cell<bool>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands with an argument containing `pattern` exit with status 1.
    pub fn fail_when(&self, pattern: &str) {
        self.fail_patterns.borrow_mut().push(pattern.to_string());
    }

    /// Commands with an argument containing `pattern` never exit on their own.
    pub fn hang_when(&self, pattern: &str) {
        self.hang_patterns.borrow_mut().push(pattern.to_string());
    }

    /// Commands with an argument containing `pattern` fail to start.
    pub fn refuse_when(&self, pattern: &str) {
        self.spawn_error_patterns
            .borrow_mut()
            .push(pattern.to_string());
    }

    /// Commands with an argument containing `pattern` write a truncated file
    /// at the output path before they exit or hang.
    pub fn partial_when(&self, pattern: &str) {
        self.partial_patterns.borrow_mut().push(pattern.to_string());
    }

    /// Requests cancellation on `token` as soon as a command with an
    /// argument containing `pattern` starts.
    pub fn cancel_when_spawned(&self, pattern: &str, token: &CancellationToken) {
        *self.cancel_on_spawn.borrow_mut() = Some((pattern.to_string(), token.clone()));
    }

    pub fn received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.borrow().clone()
    }

    pub fn was_killed(&self) -> bool {
        self.killed.get()
    }

    fn matches(patterns: &RefCell<Vec<String>>, args: &[String]) -> bool {
        patterns
            .borrow()
            .iter()
            .any(|pattern| args.iter().any(|arg| arg.contains(pattern.as_str())))
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        self.received_calls.borrow_mut().push(args.clone());

        if Self::matches(&self.spawn_error_patterns, &args) {
            return Err(CoreError::CommandStart {
                command: "ffmpeg (mock)".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "mock spawn failure"),
            });
        }

        let failing = Self::matches(&self.fail_patterns, &args);
        let hang = Self::matches(&self.hang_patterns, &args);
        if let Some(output) = args.last() {
            if Self::matches(&self.partial_patterns, &args) {
                let _ = std::fs::write(output, b"truncated mp4");
            } else if !failing && !hang {
                let _ = std::fs::File::create(output);
            }
        }

        if let Some((pattern, token)) = self.cancel_on_spawn.borrow().as_ref() {
            if args.iter().any(|arg| arg.contains(pattern.as_str())) {
                token.request_cancel();
            }
        }

        Ok(MockFfmpegProcess {
            events: Vec::new(),
            exit_status: ExitStatus::from_raw(if failing { 1 << 8 } else { 0 }),
            hang,
            killed: Rc::clone(&self.killed),
        })
    }
}

// ---- Frame decoder mock ----

/// One scripted sampled frame.
#[derive(Debug, Clone, Copy)]
pub enum Scripted {
    Marker(f64),
    Blank(f64),
    /// A frame smaller than the detection window.
    Tiny(f64),
    /// A frame that fails to decode.
    Broken,
}

/// Decoder that replays per-file scripts, keyed by file name.
#[derive(Clone, Default)]
pub struct MockFrameDecoder {
    scripts: Rc<RefCell<HashMap<String, Vec<Scripted>>>>,
    decoded: Rc<RefCell<Vec<String>>>,
    frames_delivered: Rc<Cell<usize>>,
}

impl MockFrameDecoder {
    pub fn script(&self, file_name: &str, frames: Vec<Scripted>) {
        self.scripts
            .borrow_mut()
            .insert(file_name.to_string(), frames);
    }

    /// File names `decode_frames` was called for, in order.
    pub fn decoded(&self) -> Vec<String> {
        self.decoded.borrow().clone()
    }

    pub fn frames_delivered(&self) -> usize {
        self.frames_delivered.get()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl FrameDecoder for MockFrameDecoder {
    fn decode_frames(
        &self,
        source: &VideoSource,
        indices: FrameIndices,
        handler: &mut FrameHandler<'_>,
    ) -> CoreResult<()> {
        let name = file_name(&source.path);
        self.decoded.borrow_mut().push(name.clone());
        let script = self.scripts.borrow().get(&name).cloned().unwrap_or_default();

        for (index, frame) in indices.zip(script) {
            let read = match frame {
                Scripted::Marker(t) => FrameRead::Decoded(SampledFrame {
                    index,
                    timestamp_secs: t,
                    image: marker_frame(),
                }),
                Scripted::Blank(t) => FrameRead::Decoded(SampledFrame {
                    index,
                    timestamp_secs: t,
                    image: blank_frame(),
                }),
                Scripted::Tiny(t) => FrameRead::Decoded(SampledFrame {
                    index,
                    timestamp_secs: t,
                    image: RgbImage::new(64, 64),
                }),
                Scripted::Broken => FrameRead::Failed { index },
            };
            self.frames_delivered.set(self.frames_delivered.get() + 1);
            if handler(read)? == DecodeControl::Stop {
                break;
            }
        }
        Ok(())
    }
}

// ---- FFprobe mock ----

/// Prober returning canned properties, keyed by file name.
#[derive(Clone, Default)]
pub struct MockFfprobeExecutor {
    frame_counts: Rc<RefCell<HashMap<String, u64>>>,
    unreadable: Rc<RefCell<HashSet<String>>>,
}

impl MockFfprobeExecutor {
    pub fn set_frame_count(&self, file_name: &str, frames: u64) {
        self.frame_counts
            .borrow_mut()
            .insert(file_name.to_string(), frames);
    }

    pub fn make_unreadable(&self, file_name: &str) {
        self.unreadable.borrow_mut().insert(file_name.to_string());
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn probe_video(&self, input_path: &Path) -> CoreResult<VideoSource> {
        let name = file_name(input_path);
        if self.unreadable.borrow().contains(&name) {
            return Err(CoreError::VideoInfoError(format!("mock: {name} is unreadable")));
        }
        let frame_count = self.frame_counts.borrow().get(&name).copied().unwrap_or(0);
        Ok(VideoSource {
            path: input_path.to_path_buf(),
            frame_count,
            fps: 30.0,
            width: 320,
            height: 240,
        })
    }
}

// ---- Progress recording ----

/// Sink that records every update and can cancel the run when a given
/// recording is about to start.
#[derive(Default)]
pub struct RecordingProgress {
    pub frames: Mutex<Vec<(f32, u64, u64)>>,
    pub videos: Mutex<Vec<(f32, u64, u64)>>,
    pub states: Mutex<Vec<RunState>>,
    cancel_before_video: Option<(u64, CancellationToken)>,
    cancel_after_frames: Option<(usize, CancellationToken)>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation when video progress reports `current == video`.
    pub fn cancelling_before_video(video: u64, token: &CancellationToken) -> Self {
        Self {
            cancel_before_video: Some((video, token.clone())),
            ..Self::default()
        }
    }

    /// Requests cancellation once `frames` frame updates have arrived.
    pub fn cancelling_after_frames(frames: usize, token: &CancellationToken) -> Self {
        Self {
            cancel_after_frames: Some((frames, token.clone())),
            ..Self::default()
        }
    }
}

impl ProgressSink for RecordingProgress {
    fn report_frame_progress(&self, percent: f32, current: u64, total: u64) {
        let mut frames = self.frames.lock().unwrap();
        frames.push((percent, current, total));
        if let Some((limit, token)) = &self.cancel_after_frames {
            if frames.len() >= *limit {
                token.request_cancel();
            }
        }
    }

    fn report_video_progress(&self, percent: f32, current: u64, total: u64) {
        self.videos.lock().unwrap().push((percent, current, total));
        if let Some((video, token)) = &self.cancel_before_video {
            if current == *video {
                token.request_cancel();
            }
        }
    }

    fn state_changed(&self, state: &RunState) {
        self.states.lock().unwrap().push(state.clone());
    }
}

// ---- Fixture ----

/// Temporary input/output directories plus mocks, ready to run.
pub struct Fixture {
    pub input: TempDir,
    pub output: TempDir,
    pub spawner: MockFfmpegSpawner,
    pub decoder: MockFrameDecoder,
    pub prober: MockFfprobeExecutor,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            input: tempdir().expect("input tempdir"),
            output: tempdir().expect("output tempdir"),
            spawner: MockFfmpegSpawner::new(),
            decoder: MockFrameDecoder::default(),
            prober: MockFfprobeExecutor::default(),
        }
    }

    /// Creates `name` in the input directory with one sampled frame per
    /// script entry (sample rate 1).
    pub fn add_video(&self, name: &str, frames: Vec<Scripted>) -> PathBuf {
        let path = self.input.path().join(name);
        std::fs::write(&path, b"not really a video").expect("write video");
        self.prober.set_frame_count(name, frames.len() as u64);
        self.decoder.script(name, frames);
        path
    }

    pub fn config(&self) -> RunConfig {
        RunConfigBuilder::new()
            .input_dir(self.input.path().to_path_buf())
            .output_dir(self.output.path().to_path_buf())
            .sample_rate(1)
            .pre_secs(4.0)
            .post_secs(3.0)
            .extraction_timeout(Duration::from_secs(5))
            .build()
            .expect("fixture config")
    }

    pub fn orchestrator(
        &self,
    ) -> Orchestrator<MockFfmpegSpawner, MockFrameDecoder, MockFfprobeExecutor> {
        Orchestrator::new(
            self.spawner.clone(),
            self.decoder.clone(),
            self.prober.clone(),
        )
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output.path().join(name)
    }
}
