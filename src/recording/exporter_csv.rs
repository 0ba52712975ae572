//! CSV export of session history.

use crate::recording::types::{ExportError, SessionSummary};
use chrono::{DateTime, SecondsFormat};
use std::io::Write;

/// Header row of the session export.
pub const CSV_HEADER: &str =
    "id,mode,hand,startedAt,durationMs,maxForce,avgForce,longestHoldMs,units";

/// Export sessions to CSV, one row per session.
pub fn export_sessions_csv(sessions: &[SessionSummary]) -> Result<String, ExportError> {
    if sessions.is_empty() {
        return Err(ExportError::NoData);
    }

    let mut output = Vec::new();
    writeln!(output, "{}", CSV_HEADER).map_err(|e| ExportError::WriteFailed(e.to_string()))?;

    for session in sessions {
        writeln!(
            output,
            "{},{},{},{},{},{},{},{},{}",
            session.id,
            session.mode,
            session.hand,
            iso_timestamp(session.started_at),
            session.duration_ms,
            session.max_force,
            session.avg_force,
            session.longest_hold_ms,
            session.units,
        )
        .map_err(|e| ExportError::WriteFailed(e.to_string()))?;
    }

    String::from_utf8(output).map_err(|e| ExportError::WriteFailed(e.to_string()))
}

/// Export sessions to CSV and write to a file.
pub fn export_sessions_csv_to_file(
    sessions: &[SessionSummary],
    path: &std::path::Path,
) -> Result<(), ExportError> {
    let content = export_sessions_csv(sessions)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Generate a default filename for a profile's export.
pub fn generate_csv_filename(profile_name: &str) -> String {
    let safe: String = profile_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("gripdash_{}_sessions.csv", safe)
}

fn iso_timestamp(epoch_ms: i64) -> String {
    DateTime::from_timestamp_millis(epoch_ms)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}
