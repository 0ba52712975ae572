//! Uniform transport contract and the per-connection event plumbing.
//!
//! A transport is handed an [`EventSink`] and returns a [`ConnectionHandle`].
//! The sink and the handle share an `active` flag: once the handle is closed
//! (or the transport tears itself down) every further emission is dropped, so
//! late events from a dead connection never reach the orchestrator.

use crate::sensors::ble::BleTransport;
use crate::sensors::demo::DemoTransport;
use crate::sensors::fallback::FallbackTransport;
use crate::sensors::polling::PollingTransport;
use crate::sensors::streaming::WebSocketTransport;
use crate::sensors::types::{
    ConnectionStatus, DeviceMeta, ForceSample, SensorError, SensorEvent, TransportConfig,
    TransportMode,
};
use crossbeam::channel::{Receiver, Sender};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Emitting side of one connection's event channel.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Sender<SensorEvent>,
    active: Arc<AtomicBool>,
}

impl EventSink {
    /// Create a fresh, active sink and the receiver that drains it.
    pub fn channel() -> (Self, Receiver<SensorEvent>) {
        let (tx, rx) = crossbeam::channel::unbounded();
        let sink = Self {
            tx,
            active: Arc::new(AtomicBool::new(true)),
        };
        (sink, rx)
    }

    /// Whether the connection is still live.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    fn emit(&self, event: SensorEvent) -> bool {
        if !self.is_active() {
            return false;
        }
        self.tx.send(event).is_ok()
    }

    pub fn status(&self, status: ConnectionStatus) -> bool {
        self.emit(SensorEvent::Status(status))
    }

    pub fn sample(&self, sample: ForceSample) -> bool {
        self.emit(SensorEvent::Sample(sample))
    }

    pub fn meta(&self, meta: DeviceMeta) -> bool {
        self.emit(SensorEvent::Meta(meta))
    }

    pub fn error(&self, message: impl Into<String>) -> bool {
        self.emit(SensorEvent::Error(message.into()))
    }

    pub fn fallback(&self, reason: impl Into<String>) -> bool {
        self.emit(SensorEvent::Fallback {
            reason: reason.into(),
        })
    }

    /// Deactivate the sink, emitting the final `Disconnected` status.
    ///
    /// Returns `false` if the sink was already shut down.
    pub fn shutdown(&self) -> bool {
        if !self.active.swap(false, Ordering::AcqRel) {
            return false;
        }
        let _ = self
            .tx
            .send(SensorEvent::Status(ConnectionStatus::Disconnected));
        true
    }
}

type CloseHook = Box<dyn FnOnce() + Send>;

/// Owner of a live connection's background work.
///
/// Closing is idempotent; dropping the handle closes it.
pub struct ConnectionHandle {
    sink: EventSink,
    tasks: Vec<JoinHandle<()>>,
    on_close: Option<CloseHook>,
}

impl ConnectionHandle {
    pub fn new(sink: &EventSink) -> Self {
        Self {
            sink: sink.clone(),
            tasks: Vec::new(),
            on_close: None,
        }
    }

    /// Attach a background task aborted on close.
    pub fn with_task(mut self, task: JoinHandle<()>) -> Self {
        self.tasks.push(task);
        self
    }

    /// Attach a hook that releases non-task resources on close.
    pub fn on_close(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(hook));
        self
    }

    /// Whether the connection is still live.
    pub fn is_active(&self) -> bool {
        self.sink.is_active()
    }

    /// Stop all activity and report `Disconnected`.
    pub fn close(&mut self) {
        if self.sink.shutdown() {
            tracing::debug!("Connection closed");
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
        if let Some(hook) = self.on_close.take() {
            hook();
        }
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("active", &self.is_active())
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

/// A strategy for acquiring samples from the device.
pub trait Transport: Send + Sync {
    /// Open the connection, emitting lifecycle and sample events into `sink`.
    fn connect(
        &self,
        sink: EventSink,
    ) -> impl Future<Output = Result<ConnectionHandle, SensorError>> + Send;

    /// Tell the device a session started. Best-effort.
    fn start_session(&self) -> impl Future<Output = Result<(), SensorError>> + Send {
        async { Ok(()) }
    }

    /// Tell the device a session stopped. Best-effort.
    fn stop_session(&self) -> impl Future<Output = Result<(), SensorError>> + Send {
        async { Ok(()) }
    }
}

/// Transport adapters selectable at runtime.
pub enum Adapter {
    Streaming(FallbackTransport<WebSocketTransport, PollingTransport>),
    Polling(PollingTransport),
    Ble(BleTransport),
    Demo(DemoTransport),
}

impl Adapter {
    /// Build the adapter for `mode`.
    pub fn for_mode(mode: TransportMode, config: &TransportConfig) -> Self {
        match mode {
            TransportMode::Streaming => Adapter::Streaming(FallbackTransport::new(
                WebSocketTransport::new(config),
                PollingTransport::new(config),
                Duration::from_millis(config.connect_timeout_ms),
            )),
            TransportMode::Polling => Adapter::Polling(PollingTransport::new(config)),
            TransportMode::Ble => Adapter::Ble(BleTransport::new(config)),
            TransportMode::Demo => Adapter::Demo(DemoTransport::default()),
        }
    }

    pub fn mode(&self) -> TransportMode {
        match self {
            Adapter::Streaming(_) => TransportMode::Streaming,
            Adapter::Polling(_) => TransportMode::Polling,
            Adapter::Ble(_) => TransportMode::Ble,
            Adapter::Demo(_) => TransportMode::Demo,
        }
    }
}

impl Transport for Adapter {
    async fn connect(&self, sink: EventSink) -> Result<ConnectionHandle, SensorError> {
        match self {
            Adapter::Streaming(t) => t.connect(sink).await,
            Adapter::Polling(t) => t.connect(sink).await,
            Adapter::Ble(t) => t.connect(sink).await,
            Adapter::Demo(t) => t.connect(sink).await,
        }
    }

    async fn start_session(&self) -> Result<(), SensorError> {
        match self {
            Adapter::Streaming(t) => t.start_session().await,
            Adapter::Polling(t) => t.start_session().await,
            Adapter::Ble(t) => t.start_session().await,
            Adapter::Demo(t) => t.start_session().await,
        }
    }

    async fn stop_session(&self) -> Result<(), SensorError> {
        match self {
            Adapter::Streaming(t) => t.stop_session().await,
            Adapter::Polling(t) => t.stop_session().await,
            Adapter::Ble(t) => t.stop_session().await,
            Adapter::Demo(t) => t.stop_session().await,
        }
    }
}

/// Current host time in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
