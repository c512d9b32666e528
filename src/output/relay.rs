//! Outbound relay client.
//!
//! # Responsibilities
//! - POST dispatch payloads as JSON to the resolved relay URL
//! - Map contractually meaningful statuses to typed errors
//!
//! # Design Decisions
//! - No retries: a failed call surfaces immediately
//! - 200 bodies are returned verbatim, never parsed

use std::time::Duration;

use reqwest::{Client, StatusCode};
use url::Url;

use crate::config::RelayConfig;
use crate::error::{DemoError, DemoResult};
use crate::observability::metrics;
use crate::output::payload::DispatchPayload;
use crate::output::target::resolve_target_url;

/// HTTP client bound to one relay endpoint.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    target: Url,
}

impl RelayClient {
    pub fn new(client: Client, target: Url) -> Self {
        Self { client, target }
    }

    /// Build a client for the configured relay server.
    pub fn from_config(config: &RelayConfig) -> DemoResult<Self> {
        let target = resolve_target_url(&config.server_base, &config.injection_path)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DemoError::Requester(format!("Failed to build HTTP client: {}", e)))?;

        tracing::info!(target = %target, "Relay target resolved");
        Ok(Self::new(client, target))
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    /// Send `payload` and return the relay's body on 200.
    pub async fn post(&self, payload: &DispatchPayload) -> DemoResult<String> {
        let response = self
            .client
            .post(self.target.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                metrics::record_relay("transport_error");
                DemoError::Requester(format!("Relay request to {} failed: {}", self.target, e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            metrics::record_relay("transport_error");
            DemoError::Requester(format!("Failed to read relay response: {}", e))
        })?;

        tracing::debug!(
            target = %self.target,
            socket_id = %payload.socket_id,
            status = %status,
            "Relay responded"
        );
        map_status(status, body)
    }
}

fn map_status(status: StatusCode, body: String) -> DemoResult<String> {
    match status {
        StatusCode::OK => {
            metrics::record_relay("ok");
            Ok(body)
        }
        StatusCode::BAD_REQUEST => {
            metrics::record_relay("bad_request");
            Err(DemoError::BadRequest(format!("Relay rejected payload: {}", body)))
        }
        StatusCode::NOT_FOUND => {
            metrics::record_relay("not_found");
            Err(DemoError::NotFound(format!("Relay target not found: {}", body)))
        }
        StatusCode::INTERNAL_SERVER_ERROR => {
            metrics::record_relay("internal_error");
            Err(DemoError::InternalServerError(format!("Relay failed: {}", body)))
        }
        other => {
            metrics::record_relay("unexpected_status");
            Err(DemoError::Requester(format!("Relay returned status {}", other)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(map_status(StatusCode::OK, "body".into()).unwrap(), "body");
        assert!(matches!(
            map_status(StatusCode::BAD_REQUEST, String::new()),
            Err(DemoError::BadRequest(_))
        ));
        assert!(matches!(
            map_status(StatusCode::NOT_FOUND, String::new()),
            Err(DemoError::NotFound(_))
        ));
        assert!(matches!(
            map_status(StatusCode::INTERNAL_SERVER_ERROR, String::new()),
            Err(DemoError::InternalServerError(_))
        ));
        for other in [StatusCode::CREATED, StatusCode::BAD_GATEWAY, StatusCode::IM_A_TEAPOT] {
            assert!(matches!(
                map_status(other, String::new()),
                Err(DemoError::Requester(_))
            ));
        }
    }

    #[test]
    fn test_from_config_resolves_target() {
        let relay = RelayClient::from_config(&RelayConfig::default()).unwrap();
        assert_eq!(relay.target().as_str(), "http://localhost:8000/event");
    }
}
