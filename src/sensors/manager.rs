//! Connection orchestrator.
//!
//! Owns at most one live transport, mirrors its events into observable state,
//! and reports connection failures to the caller together with a suggested
//! fallback mode. The caller decides whether to switch.

use crate::sensors::transport::{Adapter, ConnectionHandle, EventSink, Transport};
use crate::sensors::types::{
    ConnectionStatus, DeviceMeta, ForceSample, SensorError, SensorEvent, TransportConfig,
    TransportMode,
};
use crossbeam::channel::Receiver;

type TransportFactory<T> = Box<dyn Fn(TransportMode) -> T + Send + Sync>;
type FallbackHandler = Box<dyn FnMut(TransportMode, &str) + Send>;

/// Snapshot of the connection for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionState {
    pub status: ConnectionStatus,
    pub last_sample: Option<ForceSample>,
    pub last_error: Option<String>,
    pub meta: DeviceMeta,
    /// Reason the last connect fell back to a secondary strategy
    pub fallback_note: Option<String>,
}

struct ActiveConnection<T> {
    transport: T,
    handle: ConnectionHandle,
    events: Receiver<SensorEvent>,
}

/// Manages the device connection across transport modes.
pub struct ConnectionManager<T: Transport = Adapter> {
    factory: TransportFactory<T>,
    mode: TransportMode,
    state: ConnectionState,
    active: Option<ActiveConnection<T>>,
    /// Samples drained during teardown, handed out by the next `pump`
    pending: Vec<ForceSample>,
    on_fallback: Option<FallbackHandler>,
}

impl ConnectionManager<Adapter> {
    /// Create a manager building the real adapters from `config`.
    pub fn new(config: TransportConfig, mode: TransportMode) -> Self {
        Self::with_factory(mode, move |mode| Adapter::for_mode(mode, &config))
    }
}

impl<T: Transport> ConnectionManager<T> {
    /// Create a manager with a custom transport factory.
    pub fn with_factory(
        mode: TransportMode,
        factory: impl Fn(TransportMode) -> T + Send + Sync + 'static,
    ) -> Self {
        Self {
            factory: Box::new(factory),
            mode,
            state: ConnectionState::default(),
            active: None,
            pending: Vec::new(),
            on_fallback: None,
        }
    }

    /// Register the handler told about failures and the suggested next mode.
    pub fn set_fallback_handler(
        &mut self,
        handler: impl FnMut(TransportMode, &str) + Send + 'static,
    ) {
        self.on_fallback = Some(Box::new(handler));
    }

    pub fn mode(&self) -> TransportMode {
        self.mode
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn status(&self) -> ConnectionStatus {
        self.state.status
    }

    pub fn last_sample(&self) -> Option<ForceSample> {
        self.state.last_sample
    }

    pub fn last_error(&self) -> Option<&str> {
        self.state.last_error.as_deref()
    }

    pub fn battery_v(&self) -> Option<f64> {
        self.state.meta.battery_v
    }

    /// Whether a transport is currently held open.
    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.handle.is_active())
    }

    /// Connect using the selected mode, tearing down any previous connection.
    pub async fn connect(&mut self) -> Result<(), SensorError> {
        self.disconnect();
        self.state.last_error = None;
        self.state.fallback_note = None;

        let transport = (self.factory)(self.mode);
        let (sink, events) = EventSink::channel();

        tracing::info!("Connecting via {}", self.mode);
        match transport.connect(sink).await {
            Ok(handle) => {
                self.active = Some(ActiveConnection {
                    transport,
                    handle,
                    events,
                });
                self.pump_into_pending();
                Ok(())
            }
            Err(e) => {
                for event in events.try_iter() {
                    if let Some(sample) = self.apply(event) {
                        self.pending.push(sample);
                    }
                }
                self.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Close the active connection. Calling it again is a no-op.
    pub fn disconnect(&mut self) {
        let Some(mut active) = self.active.take() else {
            return;
        };

        tracing::info!("Disconnecting {}", self.mode);
        active.handle.close();
        for event in active.events.try_iter() {
            if let Some(sample) = self.apply(event) {
                self.pending.push(sample);
            }
        }
    }

    /// Switch transport mode.
    ///
    /// The previous transport is always disconnected. Demo mode connects on
    /// selection; other modes wait for an explicit [`connect`](Self::connect).
    pub async fn set_mode(&mut self, mode: TransportMode) -> Result<(), SensorError> {
        self.disconnect();
        self.mode = mode;
        if mode == TransportMode::Demo {
            self.connect().await?;
        }
        Ok(())
    }

    /// Drain queued events in arrival order and return the new samples.
    pub fn pump(&mut self) -> Vec<ForceSample> {
        let mut samples = std::mem::take(&mut self.pending);
        let events: Vec<SensorEvent> = match &self.active {
            Some(active) => active.events.try_iter().collect(),
            None => Vec::new(),
        };
        for event in events {
            if let Some(sample) = self.apply(event) {
                samples.push(sample);
            }
        }
        samples
    }

    fn pump_into_pending(&mut self) {
        let samples = self.pump();
        self.pending = samples;
    }

    /// Notify the device that a session started. Failures are ignored.
    pub async fn start_session(&self) {
        if let Some(active) = &self.active {
            if let Err(e) = active.transport.start_session().await {
                tracing::debug!("Session start notification failed: {}", e);
            }
        }
    }

    /// Notify the device that a session stopped. Failures are ignored.
    pub async fn stop_session(&self) {
        if let Some(active) = &self.active {
            if let Err(e) = active.transport.stop_session().await {
                tracing::debug!("Session stop notification failed: {}", e);
            }
        }
    }

    fn apply(&mut self, event: SensorEvent) -> Option<ForceSample> {
        match event {
            SensorEvent::Status(status) => {
                if status != self.state.status {
                    tracing::debug!("Connection status: {}", status);
                }
                self.state.status = status;
                None
            }
            SensorEvent::Sample(sample) => {
                self.state.last_sample = Some(sample);
                Some(sample)
            }
            SensorEvent::Meta(meta) => {
                if meta.battery_v.is_some() {
                    self.state.meta.battery_v = meta.battery_v;
                }
                if meta.device_connected.is_some() {
                    self.state.meta.device_connected = meta.device_connected;
                }
                None
            }
            SensorEvent::Error(message) => {
                self.fail(message);
                None
            }
            SensorEvent::Fallback { reason } => {
                self.state.fallback_note = Some(reason);
                None
            }
        }
    }

    fn fail(&mut self, message: String) {
        tracing::warn!("{} connection failed: {}", self.mode, message);
        self.state.status = ConnectionStatus::Disconnected;
        if let Some(suggested) = self.mode.fallback() {
            if let Some(handler) = self.on_fallback.as_mut() {
                handler(suggested, &message);
            }
        }
        self.state.last_error = Some(message);
    }
}

impl<T: Transport> Drop for ConnectionManager<T> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
