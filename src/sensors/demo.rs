//! Offline demo transport producing a synthetic squeeze curve.

use crate::sensors::transport::{now_ms, ConnectionHandle, EventSink, Transport};
use crate::sensors::types::{ConnectionStatus, ForceSample, ForceUnit, SensorError};
use std::time::Duration;

/// Interval between synthetic samples (~6 Hz).
pub const DEMO_INTERVAL: Duration = Duration::from_millis(160);

/// Synthetic device for trying the dashboard without hardware.
#[derive(Debug, Clone)]
pub struct DemoTransport {
    /// Peak of the squeeze curve in kg
    pub peak_kg: f64,
    /// Length of one squeeze/release cycle
    pub period: Duration,
    /// Interval between samples
    pub interval: Duration,
}

impl Default for DemoTransport {
    fn default() -> Self {
        Self {
            peak_kg: 40.0,
            period: Duration::from_secs(6),
            interval: DEMO_INTERVAL,
        }
    }
}

impl DemoTransport {
    /// Force at `elapsed` into the demo: a rectified sine, clamped at zero.
    pub fn force_at(&self, elapsed: Duration) -> f64 {
        let phase = elapsed.as_secs_f64() / self.period.as_secs_f64() * std::f64::consts::TAU;
        (self.peak_kg * phase.sin()).max(0.0)
    }

    async fn run(self, sink: EventSink) {
        let mut ticker = tokio::time::interval(self.interval);
        let started = tokio::time::Instant::now();

        sink.status(ConnectionStatus::Connected);
        loop {
            ticker.tick().await;
            let sample = ForceSample::new(self.force_at(started.elapsed()), ForceUnit::Kg, now_ms());
            if !sink.sample(sample) {
                break;
            }
        }
    }
}

impl Transport for DemoTransport {
    async fn connect(&self, sink: EventSink) -> Result<ConnectionHandle, SensorError> {
        sink.status(ConnectionStatus::Connecting);
        tracing::info!("Starting demo data source");

        let task = tokio::spawn(self.clone().run(sink.clone()));
        Ok(ConnectionHandle::new(&sink).with_task(task))
    }
}
