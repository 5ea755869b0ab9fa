// ============================================================================
// hitclip-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// Traits for spawning ffmpeg and driving the resulting process, plus the
// ffmpeg-sidecar implementation used in production. Both the frame decoder
// and the clip extractor go through `FfmpegSpawner`, so tests can substitute
// a scripted process.
//
// KEY COMPONENTS:
// - FfmpegProcess: an active ffmpeg process (events, wait, kill)
// - FfmpegSpawner: creates FfmpegProcess instances from an FfmpegCommand
// - SidecarSpawner / SidecarProcess: ffmpeg-sidecar backed implementation
// - wait_with_timeout: bounded, cancellable wait that kills a stuck process

use crate::error::{CoreResult, command_failed_error, command_start_error, command_wait_error};
use crate::pipeline::progress::CancellationToken;
use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::ops::ControlFlow;
use std::process::ExitStatus;
use std::time::{Duration, Instant};

/// How often a bounded wait polls the child for an exit status.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Feeds events from the running command to `handler` until the stream
    /// ends or the handler breaks.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<ControlFlow<()>>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;

    /// Returns the exit status if the command already finished.
    fn try_wait(&mut self) -> CoreResult<Option<ExitStatus>>;

    /// Terminates the command.
    fn kill(&mut self) -> CoreResult<()>;
}

/// Trait representing something that can spawn an FfmpegProcess.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;
    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

/// How a bounded wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Exited(ExitStatus),
    TimedOut,
    Cancelled,
}

/// Waits at most `timeout` for the process to exit, giving up early when
/// `cancel` is requested.
///
/// On `TimedOut` and `Cancelled` the process has been killed and reaped.
pub fn wait_with_timeout<P: FfmpegProcess>(
    process: &mut P,
    timeout: Duration,
    cancel: &CancellationToken,
) -> CoreResult<WaitOutcome> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = process.try_wait()? {
            return Ok(WaitOutcome::Exited(status));
        }
        let outcome = if cancel.is_cancelled() {
            log::debug!("Cancel requested, killing ffmpeg");
            WaitOutcome::Cancelled
        } else if Instant::now() >= deadline {
            log::warn!("ffmpeg did not finish within {:?}, killing it", timeout);
            WaitOutcome::TimedOut
        } else {
            std::thread::sleep(WAIT_POLL_INTERVAL);
            continue;
        };
        kill_and_reap(process)?;
        return Ok(outcome);
    }
}

/// Kills the process and collects its exit status so no zombie is left.
pub fn kill_and_reap<P: FfmpegProcess>(process: &mut P) -> CoreResult<()> {
    process.kill()?;
    // The status of a killed child is irrelevant.
    let _ = process.wait();
    Ok(())
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<ControlFlow<()>>,
    {
        let iterator = self.0.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {}", e);
            command_failed_error(
                "ffmpeg (sidecar - get iter)",
                ExitStatus::default(),
                e.to_string(),
            )
        })?;
        for event in iterator {
            if handler(event)?.is_break() {
                break;
            }
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0
            .wait()
            .map_err(|e| command_wait_error("ffmpeg (sidecar)", e))
    }

    fn try_wait(&mut self) -> CoreResult<Option<ExitStatus>> {
        self.0
            .as_inner_mut()
            .try_wait()
            .map_err(|e| command_wait_error("ffmpeg (sidecar)", e))
    }

    fn kill(&mut self) -> CoreResult<()> {
        match self.0.kill() {
            Ok(()) => Ok(()),
            // Already exited.
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
            Err(e) => Err(command_wait_error("ffmpeg (sidecar kill)", e)),
        }
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        log::debug!("Spawning ffmpeg {}", command_args(&cmd).join(" "));
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error("ffmpeg (sidecar)", e))
    }
}

/// Renders the arguments of a command for logs and diagnostics.
pub fn command_args(cmd: &FfmpegCommand) -> Vec<String> {
    cmd.get_args()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}
