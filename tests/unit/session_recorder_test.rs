//! Unit tests for session recording and summary statistics.

use gripdash::recording::{
    Hand, RecorderConfig, RecorderError, RecordingStatus, SessionParams, SessionRecorder,
    TrainingMode,
};
use gripdash::sensors::{ForceSample, ForceUnit};

fn params(mode: TrainingMode, target_force: f64) -> SessionParams {
    SessionParams {
        mode,
        hand: Hand::Left,
        units: ForceUnit::Kg,
        target_force,
    }
}

fn sample(force: f64, timestamp_ms: i64) -> ForceSample {
    ForceSample::new(force, ForceUnit::Kg, timestamp_ms)
}

fn record(recorder: &mut SessionRecorder, forces: &[(f64, i64)]) {
    for &(force, ts) in forces {
        recorder.record_sample(sample(force, ts)).unwrap();
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn test_start_twice_is_rejected() {
    let mut recorder = SessionRecorder::with_defaults();
    recorder.start_at(params(TrainingMode::Max, 0.0), 0).unwrap();

    assert_eq!(
        recorder.start_at(params(TrainingMode::Free, 0.0), 10),
        Err(RecorderError::AlreadyRecording)
    );
    assert_eq!(recorder.params().unwrap().mode, TrainingMode::Max);
}

#[test]
fn test_idle_recorder_rejects_samples_and_stop() {
    let mut recorder = SessionRecorder::with_defaults();

    assert_eq!(recorder.status(), RecordingStatus::Idle);
    assert_eq!(
        recorder.record_sample(sample(1.0, 0)),
        Err(RecorderError::NotRecording)
    );
    assert_eq!(recorder.stop(), Err(RecorderError::NotRecording));
}

#[test]
fn test_stop_without_samples_returns_none() {
    let mut recorder = SessionRecorder::with_defaults();
    recorder.start_at(params(TrainingMode::Max, 0.0), 0).unwrap();

    assert_eq!(recorder.stop(), Ok(None));
    assert!(!recorder.is_recording());
}

#[test]
fn test_discard_drops_session() {
    let mut recorder = SessionRecorder::with_defaults();
    recorder.start_at(params(TrainingMode::Max, 0.0), 0).unwrap();
    record(&mut recorder, &[(5.0, 0)]);

    recorder.discard();

    assert!(!recorder.is_recording());
    assert_eq!(recorder.samples().count(), 0);
}

// =============================================================================
// Statistics
// =============================================================================

#[test]
fn test_summary_statistics() {
    let mut recorder = SessionRecorder::with_defaults();
    recorder.start_at(params(TrainingMode::Max, 0.0), 1_000).unwrap();
    record(&mut recorder, &[(10.0, 1_050), (30.0, 1_200), (20.0, 1_350)]);

    let summary = recorder.stop().unwrap().unwrap();

    assert_eq!(summary.mode, TrainingMode::Max);
    assert_eq!(summary.hand, Hand::Left);
    assert_eq!(summary.started_at, 1_000);
    assert_eq!(summary.duration_ms, 300);
    assert_eq!(summary.max_force, 30.0);
    assert_eq!(summary.avg_force, 20.0);
    assert_eq!(summary.longest_hold_ms, 0);
    assert_eq!(summary.units, ForceUnit::Kg);
}

/// Statistics cover every sample, not just the display window.
#[test]
fn test_statistics_exceed_buffer() {
    let mut recorder = SessionRecorder::new(RecorderConfig { buffer_capacity: 4 });
    recorder.start_at(params(TrainingMode::Free, 0.0), 0).unwrap();

    for i in 0..100 {
        recorder.record_sample(sample(i as f64, i * 10)).unwrap();
    }

    assert_eq!(recorder.samples().count(), 4);
    assert_eq!(recorder.samples().next().unwrap().force, 96.0);

    let live = recorder.live_summary();
    assert_eq!(live.sample_count, 100);

    let summary = recorder.stop().unwrap().unwrap();
    assert_eq!(summary.max_force, 99.0);
    assert_eq!(summary.avg_force, 49.5);
    assert_eq!(summary.duration_ms, 990);
}

#[test]
fn test_samples_converted_to_session_units() {
    let mut recorder = SessionRecorder::with_defaults();
    let mut lbf = params(TrainingMode::Max, 0.0);
    lbf.units = ForceUnit::Lbf;
    recorder.start_at(lbf, 0).unwrap();

    recorder.record_sample(sample(10.0, 0)).unwrap();
    recorder
        .record_sample(ForceSample::new(11.0, ForceUnit::Lbf, 100))
        .unwrap();

    let summary = recorder.stop().unwrap().unwrap();
    assert_eq!(summary.units, ForceUnit::Lbf);
    assert!((summary.max_force - 22.0462).abs() < 1e-9);
}

// =============================================================================
// Endurance holds
// =============================================================================

#[test]
fn test_hold_scenario() {
    let mut recorder = SessionRecorder::with_defaults();
    recorder.start_at(params(TrainingMode::Endurance, 15.0), 0).unwrap();
    record(
        &mut recorder,
        &[(10.0, 0), (20.0, 100), (12.0, 200), (25.0, 300)],
    );

    let summary = recorder.stop().unwrap().unwrap();
    assert_eq!(summary.longest_hold_ms, 100);
}

#[test]
fn test_hold_accumulates_over_run() {
    let mut recorder = SessionRecorder::with_defaults();
    recorder.start_at(params(TrainingMode::Endurance, 15.0), 0).unwrap();
    record(
        &mut recorder,
        &[(20.0, 0), (21.0, 150), (22.0, 300), (5.0, 450), (30.0, 600), (30.0, 700)],
    );

    assert_eq!(recorder.live_summary().current_hold_ms, 250);
    assert_eq!(recorder.stop().unwrap().unwrap().longest_hold_ms, 300);
}

/// The longest hold only ever grows while recording.
#[test]
fn test_longest_hold_never_decreases() {
    let mut recorder = SessionRecorder::with_defaults();
    recorder.start_at(params(TrainingMode::Endurance, 15.0), 0).unwrap();

    let forces = [16.0, 18.0, 3.0, 20.0, 2.0, 1.0, 17.0, 17.0, 17.0, 0.0];
    let mut previous = 0;
    for (i, force) in forces.iter().enumerate() {
        recorder.record_sample(sample(*force, i as i64 * 100)).unwrap();
        let longest = recorder.live_summary().longest_hold_ms;
        assert!(longest >= previous, "hold shrank at sample {}", i);
        previous = longest;
    }
    assert_eq!(previous, 300);
}

#[test]
fn test_hold_only_tracked_in_endurance() {
    let mut recorder = SessionRecorder::with_defaults();
    recorder.start_at(params(TrainingMode::Max, 15.0), 0).unwrap();
    record(&mut recorder, &[(20.0, 0), (20.0, 500)]);

    assert_eq!(recorder.stop().unwrap().unwrap().longest_hold_ms, 0);
}
