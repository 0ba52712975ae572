//! Bluetooth LE transport for the dynamometer's radio link.
//!
//! The device advertises a single primary service with one read/notify
//! characteristic whose value is an ASCII number in pounds-force.

use crate::sensors::payload::parse_ble_value;
use crate::sensors::transport::{now_ms, ConnectionHandle, EventSink, Transport};
use crate::sensors::types::{ConnectionStatus, SensorError, TransportConfig};
use btleplug::api::{
    Central, CentralEvent, Characteristic, Manager as _, Peripheral as _, ScanFilter,
};
use btleplug::platform::{Adapter as BleAdapter, Manager, Peripheral, PeripheralId};
use futures::stream::StreamExt;
use std::time::Duration;
use uuid::Uuid;

/// Advertised name of the dynamometer.
pub const DEVICE_NAME: &str = "GripForce";

/// Primary force service UUID
pub const FORCE_SERVICE_UUID: Uuid = Uuid::from_u128(0x4fafc201_1fb5_459e_8fcc_c5c9c331914b);

/// Force value characteristic UUID (read + notify)
pub const FORCE_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0xbeb5483e_36e1_4688_b7f5_ea07361b26a8);

pub struct BleTransport {
    device_name: String,
    service_uuid: Uuid,
    characteristic_uuid: Uuid,
    scan_timeout: Duration,
}

impl BleTransport {
    pub fn new(config: &TransportConfig) -> Self {
        Self {
            device_name: config.ble_device_name.clone(),
            service_uuid: config.ble_service_uuid,
            characteristic_uuid: config.ble_characteristic_uuid,
            scan_timeout: Duration::from_secs(config.ble_scan_timeout_secs),
        }
    }

    /// First Bluetooth adapter on the system.
    async fn adapter() -> Result<BleAdapter, SensorError> {
        let manager = Manager::new()
            .await
            .map_err(|e| SensorError::Unsupported(format!("Bluetooth ({})", e)))?;

        let adapters = manager
            .adapters()
            .await
            .map_err(|e| SensorError::Unsupported(format!("Bluetooth ({})", e)))?;

        adapters.into_iter().next().ok_or(SensorError::AdapterNotFound)
    }

    /// Scan until a peripheral matching the configured name or service shows up.
    async fn select_device(&self, adapter: &BleAdapter) -> Result<Peripheral, SensorError> {
        let mut events = adapter
            .events()
            .await
            .map_err(|e| SensorError::BleError(e.to_string()))?;

        adapter
            .start_scan(ScanFilter {
                services: vec![self.service_uuid],
            })
            .await
            .map_err(|e| SensorError::BleError(e.to_string()))?;

        let search = async {
            while let Some(event) = events.next().await {
                let id = match event {
                    CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => id,
                    _ => continue,
                };
                if let Some(peripheral) = self.matching_peripheral(adapter, &id).await {
                    return Some(peripheral);
                }
            }
            None
        };

        let found = tokio::time::timeout(self.scan_timeout, search).await;
        if let Err(e) = adapter.stop_scan().await {
            tracing::debug!("Failed to stop BLE scan: {}", e);
        }

        match found {
            Ok(Some(peripheral)) => Ok(peripheral),
            Ok(None) | Err(_) => Err(SensorError::DeviceNotFound(self.device_name.clone())),
        }
    }

    async fn matching_peripheral(
        &self,
        adapter: &BleAdapter,
        id: &PeripheralId,
    ) -> Option<Peripheral> {
        let peripheral = adapter.peripheral(id).await.ok()?;
        let properties = peripheral.properties().await.ok()??;

        let name_matches = properties.local_name.as_deref() == Some(self.device_name.as_str());
        let service_matches = properties.services.contains(&self.service_uuid);
        (name_matches || service_matches).then_some(peripheral)
    }

    fn force_characteristic(&self, peripheral: &Peripheral) -> Result<Characteristic, SensorError> {
        peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == self.characteristic_uuid && c.service_uuid == self.service_uuid)
            .ok_or_else(|| {
                SensorError::SubscriptionFailed(format!(
                    "characteristic {} not found",
                    self.characteristic_uuid
                ))
            })
    }

    /// Forward notifications until the link drops.
    async fn run(
        adapter: BleAdapter,
        peripheral: Peripheral,
        characteristic_uuid: Uuid,
        sink: EventSink,
    ) {
        let mut notifications = match peripheral.notifications().await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!("Failed to get notification stream: {}", e);
                sink.shutdown();
                return;
            }
        };
        let mut central_events = match adapter.events().await {
            Ok(stream) => Some(stream),
            Err(e) => {
                tracing::debug!("No adapter event stream: {}", e);
                None
            }
        };
        let device_id = peripheral.id();

        loop {
            tokio::select! {
                notification = notifications.next() => {
                    let Some(notification) = notification else { break };
                    if notification.uuid != characteristic_uuid {
                        continue;
                    }
                    match parse_ble_value(&notification.value, now_ms()) {
                        Some(sample) => {
                            sink.sample(sample);
                        }
                        None => tracing::trace!("Dropped unparseable BLE value"),
                    }
                }
                Some(event) = async {
                    match central_events.as_mut() {
                        Some(events) => events.next().await,
                        None => std::future::pending().await,
                    }
                } => {
                    if matches!(event, CentralEvent::DeviceDisconnected(ref id) if *id == device_id) {
                        break;
                    }
                }
            }
        }

        tracing::info!("BLE device disconnected");
        sink.shutdown();
    }
}

impl Transport for BleTransport {
    async fn connect(&self, sink: EventSink) -> Result<ConnectionHandle, SensorError> {
        sink.status(ConnectionStatus::Connecting);

        let adapter = Self::adapter().await?;
        let peripheral = self.select_device(&adapter).await?;

        tracing::info!("Connecting to BLE device {}", self.device_name);
        peripheral
            .connect()
            .await
            .map_err(|e| SensorError::ConnectionFailed(e.to_string()))?;
        peripheral
            .discover_services()
            .await
            .map_err(|e| SensorError::ConnectionFailed(e.to_string()))?;

        let characteristic = match self.force_characteristic(&peripheral) {
            Ok(characteristic) => characteristic,
            Err(e) => {
                let _ = peripheral.disconnect().await;
                return Err(e);
            }
        };

        let initial = match peripheral.read(&characteristic).await {
            Ok(value) => parse_ble_value(&value, now_ms()),
            Err(e) => {
                tracing::debug!("Initial BLE read failed: {}", e);
                None
            }
        };

        if let Err(e) = peripheral.subscribe(&characteristic).await {
            let _ = peripheral.disconnect().await;
            return Err(SensorError::SubscriptionFailed(e.to_string()));
        }

        sink.status(ConnectionStatus::Connected);
        if let Some(sample) = initial {
            sink.sample(sample);
        }

        let task = tokio::spawn(Self::run(
            adapter,
            peripheral.clone(),
            self.characteristic_uuid,
            sink.clone(),
        ));

        Ok(ConnectionHandle::new(&sink)
            .with_task(task)
            .on_close(move || {
                let Ok(runtime) = tokio::runtime::Handle::try_current() else {
                    return;
                };
                runtime.spawn(async move {
                    if let Err(e) = peripheral.disconnect().await {
                        tracing::debug!("BLE disconnect failed: {}", e);
                    }
                });
            }))
    }
}
