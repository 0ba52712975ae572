//! Recording module for session capture and export.

pub mod exporter_csv;
pub mod recorder;
pub mod types;

pub use recorder::{HoldTracker, SessionParams, SessionRecorder};
pub use types::{
    ExportError, Hand, LiveSessionSummary, RecorderConfig, RecorderError, RecordingStatus,
    SessionSummary, TrainingMode,
};
