//! Unit tests for CSV export of session history.

use gripdash::recording::exporter_csv::{
    export_sessions_csv, export_sessions_csv_to_file, generate_csv_filename, CSV_HEADER,
};
use gripdash::recording::{ExportError, Hand, SessionSummary, TrainingMode};
use gripdash::sensors::ForceUnit;
use tempfile::TempDir;
use uuid::Uuid;

fn session(mode: TrainingMode, started_at: i64) -> SessionSummary {
    SessionSummary {
        id: Uuid::nil(),
        mode,
        hand: Hand::Left,
        started_at,
        duration_ms: 12_000,
        max_force: 48.5,
        avg_force: 31.25,
        longest_hold_ms: 7_000,
        units: ForceUnit::Kg,
    }
}

#[test]
fn test_export_rows() {
    let csv = export_sessions_csv(&[
        session(TrainingMode::Endurance, 1_700_000_000_000),
        session(TrainingMode::Max, 1_700_000_000_500),
    ])
    .unwrap();
    let lines: Vec<_> = csv.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(
        lines[1],
        "00000000-0000-0000-0000-000000000000,endurance,Left,2023-11-14T22:13:20.000Z,12000,48.5,31.25,7000,kg"
    );
    assert!(lines[2].contains(",max,"));
    assert!(lines[2].contains("2023-11-14T22:13:20.500Z"));
}

#[test]
fn test_export_empty_is_error() {
    assert!(matches!(export_sessions_csv(&[]), Err(ExportError::NoData)));
}

#[test]
fn test_export_to_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(generate_csv_filename("Lena K."));

    export_sessions_csv_to_file(&[session(TrainingMode::Free, 0)], &path).unwrap();

    assert!(path.ends_with("gripdash_Lena_K__sessions.csv"));
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with(CSV_HEADER));
    assert!(content.contains("1970-01-01T00:00:00.000Z"));
}
