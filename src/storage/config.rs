//! Application configuration.
//!
//! Loaded from `config.toml` in the platform data directory. Every section
//! has defaults, so a partial or missing file is fine.

use crate::recording::types::RecorderConfig;
use crate::sensors::ble::{DEVICE_NAME, FORCE_CHARACTERISTIC_UUID, FORCE_SERVICE_UUID};
use crate::sensors::types::{TransportConfig, TransportMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Device web server settings
    pub device: DeviceSettings,
    /// Bluetooth settings
    pub ble: BleSettings,
    /// Recording settings
    pub recording: RecordingSettings,
    /// Transport selection
    pub transport: TransportSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            device: DeviceSettings::default(),
            ble: BleSettings::default(),
            recording: RecordingSettings::default(),
            transport: TransportSettings::default(),
        }
    }
}

impl AppConfig {
    /// Settings handed to the transport adapters.
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            origin: self.device.origin.clone(),
            poll_interval_ms: self.device.poll_interval_ms,
            connect_timeout_ms: self.device.connect_timeout_ms,
            request_timeout_ms: self.device.request_timeout_ms,
            ble_device_name: self.ble.device_name.clone(),
            ble_service_uuid: self.ble.service_uuid,
            ble_characteristic_uuid: self.ble.characteristic_uuid,
            ble_scan_timeout_secs: self.ble.scan_timeout_secs,
        }
    }

    pub fn recorder_config(&self) -> RecorderConfig {
        RecorderConfig {
            buffer_capacity: self.recording.buffer_capacity,
        }
    }
}

/// Device web server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// Origin the dashboard talks to, e.g. `http://192.168.4.1`
    pub origin: String,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// WebSocket connect timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Per-request HTTP timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        let transport = TransportConfig::default();
        Self {
            origin: transport.origin,
            poll_interval_ms: transport.poll_interval_ms,
            connect_timeout_ms: transport.connect_timeout_ms,
            request_timeout_ms: transport.request_timeout_ms,
        }
    }
}

/// Bluetooth settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BleSettings {
    pub device_name: String,
    pub service_uuid: Uuid,
    pub characteristic_uuid: Uuid,
    /// Scan timeout in seconds
    pub scan_timeout_secs: u64,
}

impl Default for BleSettings {
    fn default() -> Self {
        Self {
            device_name: DEVICE_NAME.to_string(),
            service_uuid: FORCE_SERVICE_UUID,
            characteristic_uuid: FORCE_CHARACTERISTIC_UUID,
            scan_timeout_secs: 30,
        }
    }
}

/// Recording-related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingSettings {
    /// Samples kept for the live chart
    pub buffer_capacity: usize,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            buffer_capacity: RecorderConfig::default().buffer_capacity,
        }
    }
}

/// Transport selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Mode selected at startup
    pub mode: TransportMode,
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "gripdash", "GripDash")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load application configuration from the default location.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let mut config = load_config_from(&get_config_path())?;
    config.data_dir = get_data_dir();
    Ok(config)
}

/// Load application configuration from `path`; missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
    toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Save application configuration to `path`.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
