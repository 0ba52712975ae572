//! Recording types for training sessions.

use crate::sensors::types::ForceUnit;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Training protocol of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingMode {
    /// Single maximal squeeze
    Max,
    /// Hold above a target force for as long as possible
    Endurance,
    /// Stepped targets up and down
    Pyramid,
    /// Unstructured
    #[default]
    Free,
}

impl TrainingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingMode::Max => "max",
            TrainingMode::Endurance => "endurance",
            TrainingMode::Pyramid => "pyramid",
            TrainingMode::Free => "free",
        }
    }
}

impl std::fmt::Display for TrainingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hand used for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Hand {
    #[default]
    Right,
    Left,
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Hand::Right => write!(f, "Right"),
            Hand::Left => write!(f, "Left"),
        }
    }
}

/// Status of the session recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingStatus {
    /// Not recording
    #[default]
    Idle,
    /// Actively recording
    Recording,
}

/// Finalized statistics of one training session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: Uuid,
    pub mode: TrainingMode,
    pub hand: Hand,
    /// Session start, epoch milliseconds
    pub started_at: i64,
    /// Span from first to last sample
    pub duration_ms: i64,
    pub max_force: f64,
    pub avg_force: f64,
    /// Longest continuous hold at or above the endurance target
    pub longest_hold_ms: i64,
    pub units: ForceUnit,
}

/// Running statistics while a session records.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LiveSessionSummary {
    pub sample_count: u64,
    pub current_force: Option<f64>,
    pub max_force: Option<f64>,
    pub avg_force: Option<f64>,
    pub elapsed_ms: i64,
    /// Hold in progress
    pub current_hold_ms: i64,
    pub longest_hold_ms: i64,
}

/// Configuration for the session recorder.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Number of samples kept for the live chart
    pub buffer_capacity: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 800,
        }
    }
}

/// Errors that can occur while recording.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecorderError {
    #[error("A session is already being recorded")]
    AlreadyRecording,

    #[error("No session is being recorded")]
    NotRecording,
}

/// Errors that can occur during export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No sessions to export")]
    NoData,

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
