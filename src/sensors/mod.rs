//! Sensor module: transports that stream force readings from the device.

pub mod ble;
pub mod demo;
pub mod fallback;
pub mod http;
pub mod manager;
pub mod payload;
pub mod polling;
pub mod streaming;
pub mod transport;
pub mod types;
pub mod units;

pub use fallback::FallbackTransport;
pub use manager::{ConnectionManager, ConnectionState};
pub use transport::{Adapter, ConnectionHandle, EventSink, Transport};
pub use types::{
    ConnectionStatus, DeviceMeta, ForceSample, ForceUnit, SensorError, SensorEvent,
    TransportConfig, TransportMode,
};
pub use units::convert;
