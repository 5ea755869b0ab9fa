//! Implementation of the 'clip' subcommand.
//!
//! Resolves the run parameters from the command line and the settings record,
//! then drives the core orchestrator on a worker thread while the main thread
//! owns the terminal and listens for a cancel request on stdin.

use crate::cli::ClipArgs;
use crate::error::CliResult;
use crate::logging;
use crate::progress::{IndicatifProgress, new_multi_progress};
use crate::settings::{StoredSettings, settings_path};
use crate::terminal;

use hitclip_core::{
    CancellationToken, CoreError, MarkerClassifier, Orchestrator, RunConfig, RunOutcome,
    RunSummary, format_duration,
};
use log::{debug, info, warn};

use std::io::BufRead;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

/// Builds the run configuration and saves the settings record.
///
/// The record is only rewritten once the values have passed validation.
pub fn resolve_config(args: &ClipArgs, settings_file: &Path) -> CliResult<RunConfig> {
    let mut settings = StoredSettings::load_or_create(settings_file)?;
    settings.apply_args(args);

    let mut config = RunConfig::from_raw(&settings.to_raw(args.merge))?;
    if let Some(reference) = &args.reference {
        config.reference_image = reference.clone();
    }
    if let Some(secs) = args.timeout {
        config.extraction_timeout = Duration::from_secs(secs);
    }

    settings.save(settings_file)?;
    Ok(config)
}

/// Requests cancellation when the user types `q` followed by Enter.
///
/// The listener ends on end-of-input, so a closed stdin never cancels.
fn spawn_cancel_listener(cancel: CancellationToken) {
    let spawned = thread::Builder::new()
        .name("hitclip-cancel".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(text) if text.trim().eq_ignore_ascii_case("q") => {
                        warn!("Cancelling...");
                        cancel.request_cancel();
                        break;
                    }
                    Ok(_) => {}
                    Err(_) => break,
                }
            }
        });
    if let Err(e) = spawned {
        warn!("Cancel listener unavailable: {e}");
    }
}

fn display_initialization_info(config: &RunConfig, log_path: &Path) {
    terminal::print_section("Initialization");
    terminal::print_status("Input", &config.input_dir.display().to_string(), false);
    terminal::print_status("Output", &config.output_dir.display().to_string(), false);
    terminal::print_status("Sample rate", &format!("every {} frames", config.sample_rate), false);
    terminal::print_status(
        "Clip window",
        &format!("{}s before, {}s after", config.pre_secs, config.post_secs),
        false,
    );
    terminal::print_status(
        "Delete sources",
        if config.delete_original { "yes" } else { "no" },
        config.delete_original,
    );
    terminal::print_status("Merge clips", if config.merge_outputs { "yes" } else { "no" }, false);
    terminal::print_status("Log file", &log_path.display().to_string(), false);
    debug!("Reference marker: {}", config.reference_image.display());
    debug!("MSE threshold: {}", config.mse_threshold);
    debug!("Extraction timeout: {:?}", config.extraction_timeout);
}

fn display_summary(summary: &RunSummary, cancelled: bool, total_start: Instant) {
    terminal::print_section("Summary");

    if cancelled {
        terminal::print_warning(&format!(
            "Run cancelled, {} clip(s) were produced before stopping",
            summary.clips_written.len()
        ));
    } else if summary.clips_written.is_empty() {
        terminal::print_warning("No hits found, no clips were written");
    } else {
        terminal::print_success(&format!(
            "Wrote {} clip(s) from {} recording(s)",
            summary.clips_written.len(),
            summary.videos_processed
        ));
    }

    info!("");
    terminal::print_status("Recordings", &summary.videos_processed.to_string(), false);
    terminal::print_status("Hits found", &summary.events_found.to_string(), false);
    terminal::print_status("Clips written", &summary.clips_written.len().to_string(), true);
    if !summary.merged_outputs.is_empty() {
        terminal::print_status("Merged files", &summary.merged_outputs.len().to_string(), false);
    }
    if !summary.deleted_sources.is_empty() {
        terminal::print_status("Deleted", &summary.deleted_sources.len().to_string(), false);
    }
    for failure in &summary.clip_failures {
        terminal::print_warning(&format!(
            "{}: {}",
            failure.output_path.display(),
            failure.reason
        ));
    }
    for skipped in &summary.skipped_videos {
        terminal::print_warning(&format!("Skipped unreadable recording {}", skipped.display()));
    }
    terminal::print_status(
        "Total time",
        &format_duration(total_start.elapsed().as_secs_f64()),
        true,
    );
}

/// Runs detection and extraction over the configured input directory.
pub fn run_clip(args: ClipArgs, verbose: bool) -> CliResult<()> {
    let total_start = Instant::now();

    // ========================================================================
    // STEP 1: RESOLVE CONFIGURATION
    // ========================================================================

    let config = resolve_config(&args, &settings_path()?)?;

    // ========================================================================
    // STEP 2: LOGGING AND REFERENCE MARKER
    // ========================================================================

    let log_dir = args
        .log_dir
        .clone()
        .unwrap_or_else(|| config.output_dir.join("logs"));
    let log_path = logging::run_log_path(&log_dir);
    let bars = new_multi_progress();
    logging::init(verbose, &log_path, bars.clone())?;

    display_initialization_info(&config, &log_path);
    debug!("Run started: {}", chrono::Local::now());

    let classifier = match MarkerClassifier::load(&config.reference_image) {
        Ok(classifier) => classifier.with_threshold(config.mse_threshold),
        Err(e) => {
            terminal::print_error(
                "Reference marker unavailable",
                &e.to_string(),
                Some("Pass --reference or set HITCLIP_REFERENCE_IMAGE"),
            );
            return Err(e);
        }
    };

    // ========================================================================
    // STEP 3: RUN THE BATCH ON A WORKER THREAD
    // ========================================================================

    terminal::print_section("Scanning");
    terminal::print_processing("Type q and press Enter to stop");

    let cancel = CancellationToken::new();
    spawn_cancel_listener(cancel.clone());
    let progress = IndicatifProgress::new(&bars);

    let result = thread::scope(|scope| -> CliResult<RunOutcome> {
        let worker = thread::Builder::new()
            .name("hitclip-worker".to_string())
            .spawn_scoped(scope, || {
                Orchestrator::sidecar().run(&config, &classifier, &progress, &cancel)
            })?;
        worker
            .join()
            .unwrap_or_else(|_| Err(CoreError::OperationFailed("Worker thread panicked".into())))
    });
    progress.finish();

    // ========================================================================
    // STEP 4: REPORT
    // ========================================================================

    match result {
        Ok(RunOutcome::Completed(summary)) => display_summary(&summary, false, total_start),
        Ok(RunOutcome::Cancelled(summary)) => display_summary(&summary, true, total_start),
        Err(CoreError::NoFilesFound) => {
            terminal::print_error(
                "Nothing to scan",
                &CoreError::NoFilesFound.to_string(),
                Some("Check that the input directory contains .mp4 recordings"),
            );
            return Err(CoreError::NoFilesFound);
        }
        Err(e) => {
            terminal::print_error("Run failed", &e.to_string(), None);
            return Err(e);
        }
    }

    debug!("Finished at: {}", chrono::Local::now());
    Ok(())
}
