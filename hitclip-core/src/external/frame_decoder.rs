// ============================================================================
// hitclip-core/src/external/frame_decoder.rs
// ============================================================================
//
// FRAME DECODER: Sampled Frame Extraction via FFmpeg
//
// Decodes only the sampled frames of a recording. One ffmpeg process per
// recording does the work:
//
//   ffmpeg -i <in> -an -sn -vf select=not(mod(n\,STRIDE)),showinfo
//          -fps_mode passthrough -f rawvideo -pix_fmt rgb24 -
//
// `select` keeps every STRIDE-th frame, `showinfo` logs each kept frame's
// presentation time on stderr and the frames themselves arrive as rgb24 on
// stdout. Frames and `pts_time` log lines are paired in arrival order.

use std::collections::VecDeque;
use std::ops::ControlFlow;

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, OutputVideoFrame};
use image::RgbImage;

use crate::detection::sampler::{DecodeControl, FrameIndices, FrameRead, SampledFrame};
use crate::error::CoreResult;
use crate::external::ffmpeg_executor::{
    FfmpegProcess, FfmpegSpawner, SidecarSpawner, kill_and_reap,
};
use crate::video::VideoSource;

/// Receives each sampled frame and decides whether decoding continues.
pub type FrameHandler<'a> = dyn FnMut(FrameRead) -> CoreResult<DecodeControl> + 'a;

/// Source of decoded frames at sampled indices.
pub trait FrameDecoder {
    /// Decodes the frames at `indices`, in order, handing each to `handler`.
    ///
    /// Every index is reported exactly once, as `Decoded` or `Failed`, unless
    /// the handler stops early. Decode problems never surface as `Err`; only
    /// a handler error or a failure to start the decoder does.
    fn decode_frames(
        &self,
        source: &VideoSource,
        indices: FrameIndices,
        handler: &mut FrameHandler<'_>,
    ) -> CoreResult<()>;
}

/// `FrameDecoder` that runs ffmpeg through an `FfmpegSpawner`.
#[derive(Debug, Clone, Default)]
pub struct FfmpegFrameDecoder<S: FfmpegSpawner = SidecarSpawner> {
    spawner: S,
}

impl<S: FfmpegSpawner> FfmpegFrameDecoder<S> {
    pub fn new(spawner: S) -> Self {
        Self { spawner }
    }
}

/// Builds the decode command for one recording.
pub fn build_decode_command(source: &VideoSource, stride: u64) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.args(["-hide_banner", "-nostats"]);
    cmd.input(&source.path);
    cmd.args(["-an", "-sn"]);
    cmd.args([
        "-vf".to_string(),
        format!("select=not(mod(n\\,{stride})),showinfo"),
    ]);
    cmd.args(["-fps_mode", "passthrough"]);
    cmd.rawvideo();
    cmd
}

/// Extracts the `pts_time` value from a `showinfo` log line.
pub fn parse_showinfo_pts(line: &str) -> Option<f64> {
    if !line.contains("showinfo") {
        return None;
    }
    let rest = &line[line.find("pts_time:")? + "pts_time:".len()..];
    let value = rest.split_whitespace().next()?;
    value.parse::<f64>().ok().filter(|t| t.is_finite())
}

fn to_frame_read(index: u64, pts: Option<f64>, frame: OutputVideoFrame) -> FrameRead {
    let Some(timestamp_secs) = pts else {
        log::debug!("Frame {} has no presentation time, skipping", index);
        return FrameRead::Failed { index };
    };
    match RgbImage::from_raw(frame.width, frame.height, frame.data) {
        Some(image) => FrameRead::Decoded(SampledFrame {
            index,
            timestamp_secs,
            image,
        }),
        None => {
            log::debug!(
                "Frame {} pixel data does not match {}x{} rgb24, skipping",
                index,
                frame.width,
                frame.height
            );
            FrameRead::Failed { index }
        }
    }
}

impl<S: FfmpegSpawner> FrameDecoder for FfmpegFrameDecoder<S> {
    fn decode_frames(
        &self,
        source: &VideoSource,
        mut indices: FrameIndices,
        handler: &mut FrameHandler<'_>,
    ) -> CoreResult<()> {
        if indices.is_empty() {
            return Ok(());
        }

        let cmd = build_decode_command(source, indices.stride());
        let mut process = self.spawner.spawn(cmd)?;

        let mut frames: VecDeque<OutputVideoFrame> = VecDeque::new();
        let mut timestamps: VecDeque<f64> = VecDeque::new();
        let mut stopped = false;

        let streamed = process.handle_events(|event| {
            match event {
                FfmpegEvent::OutputFrame(frame) => frames.push_back(frame),
                FfmpegEvent::Log(_, line) => {
                    if let Some(pts) = parse_showinfo_pts(&line) {
                        timestamps.push_back(pts);
                    }
                }
                FfmpegEvent::Error(message) => log::debug!("ffmpeg decode: {}", message),
                _ => {}
            }

            while !frames.is_empty() && !timestamps.is_empty() {
                let (Some(frame), Some(pts)) = (frames.pop_front(), timestamps.pop_front()) else {
                    break;
                };
                let Some(index) = indices.next() else {
                    // More frames than the probed count; nothing left to report.
                    continue;
                };
                if handler(to_frame_read(index, Some(pts), frame))? == DecodeControl::Stop {
                    stopped = true;
                    return Ok(ControlFlow::Break(()));
                }
            }
            Ok(ControlFlow::Continue(()))
        });

        if let Err(e) = streamed {
            log::debug!("Decoding {} aborted: {}", source.path.display(), e);
            if let Err(kill_error) = kill_and_reap(&mut process) {
                log::warn!("Could not stop ffmpeg: {}", kill_error);
            }
            return Err(e);
        }

        if stopped {
            log::debug!("Stopping decoder for {}", source.path.display());
            return kill_and_reap(&mut process);
        }

        let reported = report_unpaired(frames, indices, handler);

        let status = process.wait()?;
        if !status.success() {
            log::warn!(
                "ffmpeg exited with {} while decoding {}",
                status,
                source.path.display()
            );
        }
        reported
    }
}

/// Reports frames whose pts line never arrived, then indices ffmpeg never
/// produced, all as `Failed`.
fn report_unpaired(
    frames: VecDeque<OutputVideoFrame>,
    mut indices: FrameIndices,
    handler: &mut FrameHandler<'_>,
) -> CoreResult<()> {
    for frame in frames {
        let Some(index) = indices.next() else {
            return Ok(());
        };
        if handler(to_frame_read(index, None, frame))? == DecodeControl::Stop {
            return Ok(());
        }
    }
    for index in indices {
        if handler(FrameRead::Failed { index })? == DecodeControl::Stop {
            break;
        }
    }
    Ok(())
}
