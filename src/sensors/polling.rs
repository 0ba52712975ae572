//! HTTP polling transport.
//!
//! Requests the latest reading on a fixed interval. Any failed request ends
//! the connection; retrying is left to the orchestrator's mode fallback.

use crate::sensors::http::DeviceApi;
use crate::sensors::transport::{ConnectionHandle, EventSink, Transport};
use crate::sensors::types::{ConnectionStatus, SensorError, TransportConfig};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Message reported when a poll fails.
pub const POLL_FAILED_MESSAGE: &str = "Polling failed: device did not answer /api/force";

pub struct PollingTransport {
    api: DeviceApi,
    interval: Duration,
}

impl PollingTransport {
    pub fn new(config: &TransportConfig) -> Self {
        Self {
            api: DeviceApi::new(
                &config.origin,
                Duration::from_millis(config.request_timeout_ms),
            ),
            interval: Duration::from_millis(config.poll_interval_ms),
        }
    }

    async fn run(api: DeviceApi, interval: Duration, sink: EventSink) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut connected = false;

        loop {
            ticker.tick().await;
            if !sink.is_active() {
                break;
            }

            match api.latest().await {
                Ok(Some(reading)) => {
                    if !connected {
                        connected = true;
                        sink.status(ConnectionStatus::Connected);
                    }
                    sink.sample(reading.sample());
                    if let Some(meta) = reading.meta() {
                        sink.meta(meta);
                    }
                }
                Ok(None) => {
                    tracing::trace!("Dropped malformed polling response");
                }
                Err(e) => {
                    tracing::warn!("Polling {} failed: {}", api.origin(), e);
                    sink.error(POLL_FAILED_MESSAGE);
                    sink.shutdown();
                    break;
                }
            }
        }
    }
}

impl Transport for PollingTransport {
    async fn connect(&self, sink: EventSink) -> Result<ConnectionHandle, SensorError> {
        sink.status(ConnectionStatus::Connecting);
        tracing::info!("Polling {} every {:?}", self.api.origin(), self.interval);

        let task = tokio::spawn(Self::run(self.api.clone(), self.interval, sink.clone()));
        Ok(ConnectionHandle::new(&sink).with_task(task))
    }

    async fn start_session(&self) -> Result<(), SensorError> {
        self.api.start_session().await
    }

    async fn stop_session(&self) -> Result<(), SensorError> {
        self.api.stop_session().await
    }
}
