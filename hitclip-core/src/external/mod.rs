// ============================================================================
// hitclip-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// Everything that starts a subprocess lives here, behind traits so the
// orchestrator can be driven by scripted implementations in tests.
//
// KEY COMPONENTS:
// - FfmpegSpawner / FfmpegProcess: spawning and driving ffmpeg
// - FrameDecoder: sampled-frame decoding on top of an FfmpegSpawner
// - FfprobeExecutor: recording properties
// - check_dependency: PATH check performed before a run

use crate::error::{CoreError, CoreResult, command_start_error};

use std::io;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Traits and implementations for probing recordings
pub mod ffprobe_executor;

/// Sampled-frame decoding
pub mod frame_decoder;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_executor::{
    FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner, WaitOutcome, kill_and_reap,
    wait_with_timeout,
};
pub use ffprobe_executor::{CrateFfprobeExecutor, FfprobeExecutor};
pub use frame_decoder::{FfmpegFrameDecoder, FrameDecoder};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that an external command can be started.
///
/// Runs `<cmd_name> -version` with output discarded. Only a failure to start
/// matters; the exit status is ignored.
///
/// # Returns
///
/// * `Ok(())` - The command exists and runs
/// * `Err(CoreError::DependencyNotFound)` - The command is not on PATH
/// * `Err(CoreError::CommandStart)` - The command exists but fails to start
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(command_start_error(cmd_name, e))
        }
    }
}
