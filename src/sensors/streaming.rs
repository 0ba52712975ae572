//! WebSocket streaming transport.
//!
//! The device pushes JSON readings over `/ws`. This transport only opens the
//! socket; the connect timeout and the fallback to polling are applied by
//! [`FallbackTransport`](crate::sensors::fallback::FallbackTransport).

use crate::sensors::http::{websocket_url, DeviceApi};
use crate::sensors::payload::parse_reading;
use crate::sensors::transport::{ConnectionHandle, EventSink, Transport};
use crate::sensors::types::{ConnectionStatus, SensorError, TransportConfig};
use futures::stream::StreamExt;
use std::time::Duration;
use tokio_tungstenite::tungstenite::Message;

pub struct WebSocketTransport {
    origin: String,
    api: DeviceApi,
}

impl WebSocketTransport {
    pub fn new(config: &TransportConfig) -> Self {
        Self {
            origin: config.origin.clone(),
            api: DeviceApi::new(
                &config.origin,
                Duration::from_millis(config.request_timeout_ms),
            ),
        }
    }

    /// Forward pushed readings until the socket closes.
    async fn run<S>(mut stream: S, sink: EventSink)
    where
        S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        let mut connected = false;

        while let Some(message) = stream.next().await {
            let text = match message {
                Ok(Message::Text(text)) => text,
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => text,
                    Err(_) => continue,
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!("WebSocket error: {}", e);
                    break;
                }
            };

            let Some(reading) = parse_reading(&text) else {
                tracing::trace!("Dropped malformed WebSocket message");
                continue;
            };

            if !connected {
                connected = true;
                sink.status(ConnectionStatus::Connected);
            }
            sink.sample(reading.sample());
            if let Some(meta) = reading.meta() {
                sink.meta(meta);
            }
        }

        tracing::info!("WebSocket closed by device");
        sink.shutdown();
    }
}

impl Transport for WebSocketTransport {
    async fn connect(&self, sink: EventSink) -> Result<ConnectionHandle, SensorError> {
        sink.status(ConnectionStatus::Connecting);

        let url = websocket_url(&self.origin)?;
        tracing::info!("Opening WebSocket {}", url);

        let (stream, _response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| SensorError::ConnectionFailed(e.to_string()))?;

        let task = tokio::spawn(Self::run(stream, sink.clone()));
        Ok(ConnectionHandle::new(&sink).with_task(task))
    }

    async fn start_session(&self) -> Result<(), SensorError> {
        self.api.start_session().await
    }

    async fn stop_session(&self) -> Result<(), SensorError> {
        self.api.stop_session().await
    }
}
