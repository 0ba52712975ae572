//! Session recorder for capturing force samples.
//!
//! Statistics are accumulated incrementally as samples arrive; the bounded
//! sample buffer only feeds the live chart and never the summary.

use crate::recording::types::{
    Hand, LiveSessionSummary, RecorderConfig, RecorderError, RecordingStatus, SessionSummary,
    TrainingMode,
};
use crate::sensors::types::{ForceSample, ForceUnit};
use std::collections::VecDeque;
use uuid::Uuid;

/// Parameters fixed for the length of a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionParams {
    pub mode: TrainingMode,
    pub hand: Hand,
    /// Unit samples are converted to before accumulation
    pub units: ForceUnit,
    /// Endurance hold threshold, in `units`
    pub target_force: f64,
}

/// Longest-hold tracking for endurance sessions.
///
/// A sample at or above target extends the running hold by the time since
/// the previous sample; a sample below target ends it. `longest_ms` is a
/// high-water mark and never decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HoldTracker {
    current_ms: i64,
    longest_ms: i64,
    last_timestamp_ms: Option<i64>,
}

impl HoldTracker {
    pub fn update(&mut self, force: f64, timestamp_ms: i64, target: f64) {
        let elapsed = self
            .last_timestamp_ms
            .map_or(0, |last| (timestamp_ms - last).max(0));
        self.last_timestamp_ms = Some(timestamp_ms);

        if force >= target {
            self.current_ms += elapsed;
            self.longest_ms = self.longest_ms.max(self.current_ms);
        } else {
            self.current_ms = 0;
        }
    }

    pub fn current_ms(&self) -> i64 {
        self.current_ms
    }

    /// Longest hold including any still in progress.
    pub fn longest_ms(&self) -> i64 {
        self.longest_ms.max(self.current_ms)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    count: u64,
    sum: f64,
    max: Option<f64>,
    first_timestamp_ms: Option<i64>,
    last_timestamp_ms: Option<i64>,
    last_force: Option<f64>,
    hold: HoldTracker,
}

impl Accumulator {
    fn push(&mut self, sample: &ForceSample, hold_target: Option<f64>) {
        self.count += 1;
        self.sum += sample.force;
        self.max = Some(self.max.map_or(sample.force, |max| max.max(sample.force)));
        self.first_timestamp_ms.get_or_insert(sample.timestamp_ms);
        self.last_timestamp_ms = Some(sample.timestamp_ms);
        self.last_force = Some(sample.force);
        if let Some(target) = hold_target {
            self.hold.update(sample.force, sample.timestamp_ms, target);
        }
    }

    fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    fn span_ms(&self) -> i64 {
        match (self.first_timestamp_ms, self.last_timestamp_ms) {
            (Some(first), Some(last)) => last - first,
            _ => 0,
        }
    }
}

struct ActiveSession {
    params: SessionParams,
    started_at: i64,
    stats: Accumulator,
}

impl ActiveSession {
    fn hold_target(&self) -> Option<f64> {
        (self.params.mode == TrainingMode::Endurance).then_some(self.params.target_force)
    }
}

/// Records force samples into session summaries.
pub struct SessionRecorder {
    config: RecorderConfig,
    session: Option<ActiveSession>,
    buffer: VecDeque<ForceSample>,
}

impl SessionRecorder {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            buffer: VecDeque::with_capacity(config.buffer_capacity),
            config,
            session: None,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(RecorderConfig::default())
    }

    /// Start a session now.
    pub fn start(&mut self, params: SessionParams) -> Result<(), RecorderError> {
        self.start_at(params, chrono::Utc::now().timestamp_millis())
    }

    /// Start a session with an explicit origin timestamp (epoch ms).
    pub fn start_at(&mut self, params: SessionParams, started_at: i64) -> Result<(), RecorderError> {
        if self.session.is_some() {
            return Err(RecorderError::AlreadyRecording);
        }

        self.buffer.clear();
        self.session = Some(ActiveSession {
            params,
            started_at,
            stats: Accumulator::default(),
        });

        tracing::info!(
            "Started {} session ({} hand, {})",
            params.mode,
            params.hand,
            params.units
        );
        Ok(())
    }

    /// Record a sample, converting it to the session's units.
    pub fn record_sample(&mut self, sample: ForceSample) -> Result<(), RecorderError> {
        let session = self.session.as_mut().ok_or(RecorderError::NotRecording)?;
        let sample = sample.converted_to(session.params.units);

        let target = session.hold_target();
        session.stats.push(&sample, target);

        if self.config.buffer_capacity > 0 {
            if self.buffer.len() == self.config.buffer_capacity {
                self.buffer.pop_front();
            }
            self.buffer.push_back(sample);
        }
        Ok(())
    }

    /// Finish the session.
    ///
    /// Returns `Ok(None)` when no samples were recorded.
    pub fn stop(&mut self) -> Result<Option<SessionSummary>, RecorderError> {
        let session = self.session.take().ok_or(RecorderError::NotRecording)?;
        let stats = session.stats;

        let (Some(avg_force), Some(max_force)) = (stats.average(), stats.max) else {
            tracing::info!("Stopped session without samples, nothing recorded");
            return Ok(None);
        };

        let summary = SessionSummary {
            id: Uuid::new_v4(),
            mode: session.params.mode,
            hand: session.params.hand,
            started_at: session.started_at,
            duration_ms: stats.span_ms(),
            max_force,
            avg_force,
            longest_hold_ms: stats.hold.longest_ms(),
            units: session.params.units,
        };

        tracing::info!(
            "Finished session with {} samples: max {:.2} {}, avg {:.2} {}",
            stats.count,
            summary.max_force,
            summary.units,
            summary.avg_force,
            summary.units
        );
        Ok(Some(summary))
    }

    /// Abandon the current session without a summary.
    pub fn discard(&mut self) {
        if self.session.take().is_some() {
            tracing::info!("Discarded session");
        }
        self.buffer.clear();
    }

    pub fn status(&self) -> RecordingStatus {
        if self.session.is_some() {
            RecordingStatus::Recording
        } else {
            RecordingStatus::Idle
        }
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    /// Parameters of the session in progress.
    pub fn params(&self) -> Option<SessionParams> {
        self.session.as_ref().map(|s| s.params)
    }

    /// Recent samples for display, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = &ForceSample> {
        self.buffer.iter()
    }

    pub fn live_summary(&self) -> LiveSessionSummary {
        let Some(session) = &self.session else {
            return LiveSessionSummary::default();
        };
        let stats = &session.stats;
        LiveSessionSummary {
            sample_count: stats.count,
            current_force: stats.last_force,
            max_force: stats.max,
            avg_force: stats.average(),
            elapsed_ms: stats.span_ms(),
            current_hold_ms: stats.hold.current_ms(),
            longest_hold_ms: stats.hold.longest_ms(),
        }
    }
}
