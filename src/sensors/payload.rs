//! Wire payload decoding for the device endpoints.
//!
//! Decoders return `None` on anything malformed; callers drop those samples.

use crate::sensors::types::{DeviceMeta, ForceSample, ForceUnit};
use serde::Deserialize;

/// JSON reading served by `/api/force` and pushed over `/ws`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceReading {
    pub force: f64,
    pub units: ForceUnit,
    pub timestamp_ms: i64,
    #[serde(default)]
    pub battery_v: Option<f64>,
    #[serde(default)]
    pub is_connected: Option<bool>,
}

impl DeviceReading {
    pub fn sample(&self) -> ForceSample {
        ForceSample::new(self.force, self.units, self.timestamp_ms)
    }

    /// Diagnostics carried by the reading, if any.
    pub fn meta(&self) -> Option<DeviceMeta> {
        if self.battery_v.is_none() && self.is_connected.is_none() {
            return None;
        }
        Some(DeviceMeta {
            battery_v: self.battery_v,
            device_connected: self.is_connected,
        })
    }
}

/// Parse a JSON device reading.
pub fn parse_reading(text: &str) -> Option<DeviceReading> {
    let reading: DeviceReading = serde_json::from_str(text).ok()?;
    if !reading.force.is_finite() {
        return None;
    }
    Some(reading)
}

/// Decode a BLE characteristic value: an ASCII number, possibly null padded.
///
/// The radio payload carries no unit or timestamp; it is always lbf and is
/// stamped with the host time.
pub fn parse_ble_value(bytes: &[u8], timestamp_ms: i64) -> Option<ForceSample> {
    let text = std::str::from_utf8(bytes).ok()?;
    let force: f64 = text.trim_matches(char::from(0)).trim().parse().ok()?;
    if !force.is_finite() {
        return None;
    }
    Some(ForceSample::new(force, ForceUnit::Lbf, timestamp_ms))
}
