//! HTTP client for the device's REST endpoints.

use crate::sensors::payload::{parse_reading, DeviceReading};
use crate::sensors::types::SensorError;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use reqwest::Url;
use std::time::Duration;

/// Latest reading endpoint.
pub const FORCE_PATH: &str = "/api/force";

/// Session start notification endpoint.
pub const SESSION_START_PATH: &str = "/api/session/start";

/// Session stop notification endpoint.
pub const SESSION_STOP_PATH: &str = "/api/session/stop";

/// WebSocket push endpoint.
pub const WS_PATH: &str = "/ws";

/// Thin wrapper around the device web server.
#[derive(Debug, Clone)]
pub struct DeviceApi {
    http: reqwest::Client,
    origin: String,
}

impl DeviceApi {
    pub fn new(origin: &str, request_timeout: Duration) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .default_headers(headers)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self {
            http,
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }

    /// Fetch the latest reading.
    ///
    /// A response body that does not decode is `Ok(None)`; only transport and
    /// HTTP status failures are errors.
    pub async fn latest(&self) -> Result<Option<DeviceReading>, SensorError> {
        let response = self
            .http
            .get(self.url(FORCE_PATH))
            .send()
            .await
            .map_err(|e| SensorError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SensorError::Request(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SensorError::Request(e.to_string()))?;

        Ok(parse_reading(&body))
    }

    async fn post(&self, path: &str) -> Result<(), SensorError> {
        let response = self
            .http
            .post(self.url(path))
            .send()
            .await
            .map_err(|e| SensorError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SensorError::Request(format!("HTTP {}", response.status())));
        }
        Ok(())
    }

    pub async fn start_session(&self) -> Result<(), SensorError> {
        self.post(SESSION_START_PATH).await
    }

    pub async fn stop_session(&self) -> Result<(), SensorError> {
        self.post(SESSION_STOP_PATH).await
    }
}

/// Derive the WebSocket endpoint from the device's HTTP origin.
///
/// `http` upgrades to `ws` and `https` to `wss`; the path is always [`WS_PATH`].
pub fn websocket_url(origin: &str) -> Result<String, SensorError> {
    let mut url =
        Url::parse(origin).map_err(|e| SensorError::InvalidEndpoint(format!("{}: {}", origin, e)))?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(SensorError::InvalidEndpoint(format!(
                "unsupported scheme '{}'",
                other
            )))
        }
    };

    url.set_scheme(scheme)
        .map_err(|_| SensorError::InvalidEndpoint(origin.to_string()))?;
    url.set_path(WS_PATH);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.to_string())
}
