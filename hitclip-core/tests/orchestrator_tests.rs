// hitclip-core/tests/orchestrator_tests.rs
//
// End-to-end runs of the orchestrator over scripted recordings.

mod common;

use common::{Fixture, RecordingProgress, Scripted, classifier};
use hitclip_core::error::CoreError;
use hitclip_core::pipeline::{CancellationToken, NullProgress, RunOutcome, RunState};

#[test]
fn empty_input_directory_fails_without_clips() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = Fixture::new();
    std::fs::write(fixture.input.path().join("notes.txt"), b"")?;
    let progress = RecordingProgress::new();

    let result = fixture.orchestrator().run(
        &fixture.config(),
        &classifier(),
        &progress,
        &CancellationToken::new(),
    );

    assert!(matches!(result, Err(CoreError::NoFilesFound)));
    assert!(fixture.spawner.received_calls().is_empty());
    assert!(std::fs::read_dir(fixture.output.path())?.next().is_none());
    let states = progress.states.lock().unwrap();
    assert!(matches!(states.last(), Some(RunState::Failed(_))));
    Ok(())
}

#[test]
fn bursts_become_one_clip_per_event() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = Fixture::new();
    fixture.add_video(
        "a.mp4",
        vec![
            Scripted::Blank(0.0),
            Scripted::Marker(1.0),
            Scripted::Marker(1.2),
            Scripted::Marker(1.5),
            Scripted::Blank(2.0),
            Scripted::Marker(10.0),
        ],
    );
    fixture.add_video("b.mp4", vec![Scripted::Blank(0.0), Scripted::Blank(1.0)]);

    let outcome = fixture.orchestrator().run(
        &fixture.config(),
        &classifier(),
        &NullProgress,
        &CancellationToken::new(),
    )?;

    let RunOutcome::Completed(summary) = outcome else {
        panic!("run should complete");
    };
    assert_eq!(summary.videos_processed, 2);
    assert_eq!(summary.events_found, 2);
    assert_eq!(
        summary.clips_written,
        vec![fixture.output_path("a-0.mp4"), fixture.output_path("a-1.mp4")]
    );
    assert!(summary.clip_failures.is_empty());
    assert!(fixture.output_path("a-0.mp4").exists());
    assert!(fixture.output_path("a-1.mp4").exists());

    // Windows: 1.5 -> [0, 4.5], 10.0 -> [6, 13]
    let calls = fixture.spawner.received_calls();
    assert_eq!(calls.len(), 2);
    let window = |args: &[String]| {
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let t = args.iter().position(|a| a == "-t").unwrap();
        (args[ss + 1].clone(), args[t + 1].clone())
    };
    assert_eq!(window(&calls[0]), ("0.00".to_string(), "4.50".to_string()));
    assert_eq!(window(&calls[1]), ("6.00".to_string(), "7.00".to_string()));
    Ok(())
}

#[test]
fn progress_is_reported_per_frame_and_per_video() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = Fixture::new();
    fixture.add_video(
        "a.mp4",
        vec![Scripted::Blank(0.0), Scripted::Blank(1.0), Scripted::Blank(2.0)],
    );
    fixture.add_video("b.mp4", vec![Scripted::Blank(0.0)]);
    let progress = RecordingProgress::new();

    fixture.orchestrator().run(
        &fixture.config(),
        &classifier(),
        &progress,
        &CancellationToken::new(),
    )?;

    let frames = progress.frames.lock().unwrap();
    let counters: Vec<(u64, u64)> = frames.iter().map(|&(_, c, t)| (c, t)).collect();
    assert_eq!(counters, vec![(1, 3), (2, 3), (3, 3), (1, 1)]);
    assert_eq!(frames[0].0, 0.0);

    let videos = progress.videos.lock().unwrap();
    assert_eq!(*videos, vec![(0.0, 0, 2), (50.0, 1, 2), (100.0, 2, 2)]);

    let states = progress.states.lock().unwrap();
    assert_eq!(states.first(), Some(&RunState::Idle));
    assert_eq!(states.last(), Some(&RunState::Completed));
    Ok(())
}

#[test]
fn cancelling_before_second_video_keeps_earlier_clips() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = Fixture::new();
    let first = fixture.add_video("a.mp4", vec![Scripted::Marker(5.0)]);
    let second = fixture.add_video("b.mp4", vec![Scripted::Marker(5.0), Scripted::Marker(9.0)]);
    let mut config = fixture.config();
    config.delete_original = true;

    let token = CancellationToken::new();
    let progress = RecordingProgress::cancelling_before_video(1, &token);
    let outcome = fixture
        .orchestrator()
        .run(&config, &classifier(), &progress, &token)?;

    let RunOutcome::Cancelled(summary) = outcome else {
        panic!("run should be cancelled");
    };
    assert_eq!(summary.clips_written, vec![fixture.output_path("a-0.mp4")]);
    assert!(fixture.output_path("a-0.mp4").exists());
    assert!(!fixture.output_path("b-0.mp4").exists());

    // The completed recording was deleted, the interrupted one was not.
    assert!(!first.exists());
    assert!(second.exists());
    assert_eq!(summary.deleted_sources, vec![first]);
    assert_eq!(fixture.spawner.received_calls().len(), 1);
    Ok(())
}

#[test]
fn cancelling_mid_scan_stops_decoding_and_skips_extraction()
-> Result<(), Box<dyn std::error::Error>> {
    let fixture = Fixture::new();
    let source = fixture.add_video(
        "a.mp4",
        vec![
            Scripted::Marker(1.0),
            Scripted::Blank(2.0),
            Scripted::Blank(3.0),
            Scripted::Blank(4.0),
        ],
    );
    let mut config = fixture.config();
    config.delete_original = true;

    let token = CancellationToken::new();
    let progress = RecordingProgress::cancelling_after_frames(2, &token);
    let outcome = fixture
        .orchestrator()
        .run(&config, &classifier(), &progress, &token)?;

    assert!(outcome.is_cancelled());
    assert!(outcome.summary().clips_written.is_empty());
    assert_eq!(outcome.summary().videos_processed, 0);
    // Third frame was handed over but refused; the fourth never requested.
    assert_eq!(fixture.decoder.frames_delivered(), 3);
    assert!(fixture.spawner.received_calls().is_empty());
    assert!(source.exists());
    Ok(())
}

#[test]
fn already_cancelled_run_does_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = Fixture::new();
    fixture.add_video("a.mp4", vec![Scripted::Marker(1.0)]);
    let token = CancellationToken::new();
    token.request_cancel();

    let outcome = fixture
        .orchestrator()
        .run(&fixture.config(), &classifier(), &NullProgress, &token)?;

    assert!(outcome.is_cancelled());
    assert!(fixture.decoder.decoded().is_empty());
    Ok(())
}

#[test]
fn bad_frames_and_unreadable_videos_are_skipped() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = Fixture::new();
    fixture.add_video(
        "a.mp4",
        vec![
            Scripted::Broken,
            Scripted::Tiny(0.5),
            Scripted::Marker(2.0),
        ],
    );
    fixture.add_video("b.mp4", vec![Scripted::Marker(1.0)]);
    fixture.prober.make_unreadable("b.mp4");

    let outcome = fixture.orchestrator().run(
        &fixture.config(),
        &classifier(),
        &NullProgress,
        &CancellationToken::new(),
    )?;

    let summary = outcome.summary();
    assert!(!outcome.is_cancelled());
    assert_eq!(summary.clips_written, vec![fixture.output_path("a-0.mp4")]);
    assert_eq!(summary.skipped_videos.len(), 1);
    assert!(summary.skipped_videos[0].ends_with("b.mp4"));
    assert_eq!(fixture.decoder.decoded(), vec!["a.mp4".to_string()]);
    Ok(())
}

#[test]
fn invalid_config_fails_before_scanning() {
    let fixture = Fixture::new();
    fixture.add_video("a.mp4", vec![Scripted::Marker(1.0)]);
    let mut config = fixture.config();
    config.sample_rate = 0;
    config.output_dir = config.input_dir.clone();

    match fixture.orchestrator().run(
        &config,
        &classifier(),
        &NullProgress,
        &CancellationToken::new(),
    ) {
        Err(CoreError::InvalidConfig(problems)) => assert_eq!(problems.len(), 2),
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
    assert!(fixture.decoder.decoded().is_empty());
}
