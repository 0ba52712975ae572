//! Two-step connect strategy: try a primary transport, fall back to another.
//!
//! The primary gets a bounded window to establish itself. A timeout or a
//! connect error hands the same sink to the fallback transport; the caller only
//! observes status transitions plus an informational [`SensorEvent::Fallback`]
//! carrying the primary's failure reason.
//!
//! [`SensorEvent::Fallback`]: crate::sensors::types::SensorEvent::Fallback

use crate::sensors::transport::{ConnectionHandle, EventSink, Transport};
use crate::sensors::types::SensorError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub struct FallbackTransport<P, F> {
    primary: P,
    fallback: F,
    timeout: Duration,
    /// Set while the fallback transport carries the connection
    fell_back: AtomicBool,
}

impl<P: Transport, F: Transport> FallbackTransport<P, F> {
    pub fn new(primary: P, fallback: F, timeout: Duration) -> Self {
        Self {
            primary,
            fallback,
            timeout,
            fell_back: AtomicBool::new(false),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether the last connect ended up on the fallback transport.
    pub fn is_fallen_back(&self) -> bool {
        self.fell_back.load(Ordering::Acquire)
    }
}

impl<P: Transport, F: Transport> Transport for FallbackTransport<P, F> {
    async fn connect(&self, sink: EventSink) -> Result<ConnectionHandle, SensorError> {
        let reason = match tokio::time::timeout(self.timeout, self.primary.connect(sink.clone()))
            .await
        {
            Ok(Ok(handle)) => {
                self.fell_back.store(false, Ordering::Release);
                return Ok(handle);
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => SensorError::ConnectionTimeout.to_string(),
        };

        tracing::warn!("Primary transport failed ({}), falling back", reason);
        sink.fallback(reason);
        self.fell_back.store(true, Ordering::Release);
        self.fallback.connect(sink).await
    }

    async fn start_session(&self) -> Result<(), SensorError> {
        if self.is_fallen_back() {
            self.fallback.start_session().await
        } else {
            self.primary.start_session().await
        }
    }

    async fn stop_session(&self) -> Result<(), SensorError> {
        if self.is_fallen_back() {
            self.fallback.stop_session().await
        } else {
            self.primary.stop_session().await
        }
    }
}
