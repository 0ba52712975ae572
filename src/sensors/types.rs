//! Sensor types and enums for the grip dynamometer.
//!
//! Every transport normalizes its wire payload into a [`ForceSample`] and
//! reports lifecycle changes as [`SensorEvent`]s.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unit a force value is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ForceUnit {
    /// Kilograms-force
    #[default]
    #[serde(rename = "kg")]
    Kg,
    /// Newtons
    #[serde(rename = "N")]
    N,
    /// Pounds-force
    #[serde(rename = "lbf")]
    Lbf,
}

impl ForceUnit {
    /// Wire/display label of the unit.
    pub fn as_str(&self) -> &'static str {
        match self {
            ForceUnit::Kg => "kg",
            ForceUnit::N => "N",
            ForceUnit::Lbf => "lbf",
        }
    }
}

impl std::fmt::Display for ForceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ForceUnit {
    type Err = SensorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "kg" => Ok(ForceUnit::Kg),
            "N" => Ok(ForceUnit::N),
            "lbf" => Ok(ForceUnit::Lbf),
            other => Err(SensorError::InvalidPayload(format!("unknown unit '{}'", other))),
        }
    }
}

/// One timestamped force reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceSample {
    /// Force value
    pub force: f64,
    /// Unit of `force`
    pub units: ForceUnit,
    /// Device or host timestamp in milliseconds
    pub timestamp_ms: i64,
}

impl ForceSample {
    pub fn new(force: f64, units: ForceUnit, timestamp_ms: i64) -> Self {
        Self {
            force,
            units,
            timestamp_ms,
        }
    }

    /// Return this sample expressed in `units`.
    pub fn converted_to(&self, units: ForceUnit) -> Self {
        Self {
            force: crate::sensors::units::convert(self.force, self.units, units),
            units,
            timestamp_ms: self.timestamp_ms,
        }
    }
}

/// Connection state of the active transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// Not connected
    #[default]
    Disconnected,
    /// Connection in progress
    Connecting,
    /// Receiving samples
    Connected,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "Disconnected"),
            ConnectionStatus::Connecting => write!(f, "Connecting..."),
            ConnectionStatus::Connected => write!(f, "Connected"),
        }
    }
}

/// Device diagnostics reported alongside readings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeviceMeta {
    /// Battery voltage
    pub battery_v: Option<f64>,
    /// Whether the device reports its load cell as connected
    pub device_connected: Option<bool>,
}

/// Transport strategy used to reach the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// WebSocket push, falling back to HTTP polling
    #[default]
    Streaming,
    /// HTTP polling of the latest reading
    Polling,
    /// Bluetooth LE notifications
    Ble,
    /// Offline synthetic data
    Demo,
}

impl TransportMode {
    /// Mode suggested to the caller when this one fails.
    pub fn fallback(&self) -> Option<TransportMode> {
        match self {
            TransportMode::Streaming => Some(TransportMode::Polling),
            TransportMode::Polling => Some(TransportMode::Streaming),
            TransportMode::Ble => Some(TransportMode::Streaming),
            TransportMode::Demo => None,
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportMode::Streaming => write!(f, "WebSocket"),
            TransportMode::Polling => write!(f, "HTTP polling"),
            TransportMode::Ble => write!(f, "Bluetooth"),
            TransportMode::Demo => write!(f, "Demo"),
        }
    }
}

/// Events emitted by a transport.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorEvent {
    /// Connection state changed
    Status(ConnectionStatus),
    /// New reading
    Sample(ForceSample),
    /// Device diagnostics
    Meta(DeviceMeta),
    /// Connection-level failure
    Error(String),
    /// A primary strategy failed and a fallback took over
    Fallback { reason: String },
}

/// Configuration shared by the transport adapters.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Origin of the device web server, e.g. `http://192.168.4.1`
    pub origin: String,
    /// Interval between polling requests in milliseconds
    pub poll_interval_ms: u64,
    /// WebSocket connect timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Timeout for a single HTTP request in milliseconds
    pub request_timeout_ms: u64,
    /// BLE advertised device name
    pub ble_device_name: String,
    /// BLE primary service
    pub ble_service_uuid: uuid::Uuid,
    /// BLE force characteristic
    pub ble_characteristic_uuid: uuid::Uuid,
    /// How long to scan for the BLE device in seconds
    pub ble_scan_timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            origin: "http://192.168.4.1".to_string(),
            poll_interval_ms: 150,
            connect_timeout_ms: 1500,
            request_timeout_ms: 1000,
            ble_device_name: crate::sensors::ble::DEVICE_NAME.to_string(),
            ble_service_uuid: crate::sensors::ble::FORCE_SERVICE_UUID,
            ble_characteristic_uuid: crate::sensors::ble::FORCE_CHARACTERISTIC_UUID,
            ble_scan_timeout_secs: 30,
        }
    }
}

/// Errors that can occur in the sensor system.
#[derive(Debug, Error)]
pub enum SensorError {
    /// Platform lacks the capability the transport needs
    #[error("{0} is not supported on this platform")]
    Unsupported(String),

    /// BLE adapter not found or unavailable
    #[error("Bluetooth adapter not found")]
    AdapterNotFound,

    /// Device not found during discovery
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Connection to the device failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection timed out
    #[error("Connection timed out")]
    ConnectionTimeout,

    /// Device endpoint could not be derived
    #[error("Invalid device endpoint: {0}")]
    InvalidEndpoint(String),

    /// HTTP request failed
    #[error("Request failed: {0}")]
    Request(String),

    /// Failed to subscribe to notifications
    #[error("Failed to subscribe to notifications: {0}")]
    SubscriptionFailed(String),

    /// Payload could not be decoded
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Generic BLE error
    #[error("BLE error: {0}")]
    BleError(String),
}
