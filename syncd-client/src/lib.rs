//! # syncd-client
//!
//! Typed HTTP caller for the sync daemon control-plane API: one method per
//! route, environment-driven TLS configuration, and a no-backoff
//! `wait_for_api` poll used by callers that need to block until the daemon
//! is reachable.

pub mod config;
pub mod error;
pub mod wire;

use std::time::{Duration, Instant};

use reqwest::{Certificate, Identity, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use syncd_shared::TaskConfig;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};

/// Typed client for the control-plane API.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Build a client from an explicit configuration.
    ///
    /// # Errors
    /// Returns `ClientError::ConfigError` if the configured CA/client cert
    /// material can't be read or parsed, or the underlying HTTP client
    /// fails to build.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let mut builder = reqwest::Client::builder().use_rustls_tls();

        if !config.ssl_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ca_cert) = &config.ca_cert {
            let pem = std::fs::read(ca_cert)
                .map_err(|e| ClientError::config_error(format!("failed to read {ca_cert}: {e}")))?;
            let cert = Certificate::from_pem(&pem)
                .map_err(|e| ClientError::config_error(format!("invalid CA certificate: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }

        if let Some(ca_path) = &config.ca_path {
            for entry in std::fs::read_dir(ca_path).map_err(|e| {
                ClientError::config_error(format!("failed to read CA directory {ca_path}: {e}"))
            })? {
                let entry = entry.map_err(|e| {
                    ClientError::config_error(format!("failed to read CA directory entry: {e}"))
                })?;
                let pem = std::fs::read(entry.path()).map_err(|e| {
                    ClientError::config_error(format!("failed to read {:?}: {e}", entry.path()))
                })?;
                if let Ok(cert) = Certificate::from_pem(&pem) {
                    builder = builder.add_root_certificate(cert);
                }
            }
        }

        if let (Some(cert), Some(key)) = (&config.client_cert, &config.client_key) {
            let mut pem = std::fs::read(cert)
                .map_err(|e| ClientError::config_error(format!("failed to read {cert}: {e}")))?;
            let mut key_bytes = std::fs::read(key)
                .map_err(|e| ClientError::config_error(format!("failed to read {key}: {e}")))?;
            pem.append(&mut key_bytes);
            let identity = Identity::from_pem(&pem)
                .map_err(|e| ClientError::config_error(format!("invalid client identity: {e}")))?;
            builder = builder.identity(identity);
        }

        let http = builder
            .build()
            .map_err(|e| ClientError::config_error(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.address.trim_end_matches('/').to_string(),
        })
    }

    /// Build a client from the `CTS_*` environment variables.
    ///
    /// # Errors
    /// See [`ClientConfig::from_env`] and [`Client::new`].
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            return serde_json::from_slice(&bytes).map_err(ClientError::from);
        }

        let (message, request_id) = match serde_json::from_slice::<wire::ErrorEnvelope>(&bytes) {
            Ok(envelope) => (envelope.error.message, envelope.request_id.to_string()),
            Err(_) => (
                String::from_utf8_lossy(&bytes).to_string(),
                Uuid::nil().to_string(),
            ),
        };
        Err(ClientError::api_error(status.as_u16(), message, request_id))
    }

    #[instrument(skip(self))]
    pub async fn task(&self, name: &str) -> ClientResult<TaskConfig> {
        let response = self.http.get(self.url(&format!("/v1/tasks/{name}"))).send().await?;
        let envelope: wire::TaskResponseEnvelope = Self::decode(response).await?;
        envelope
            .task
            .ok_or_else(|| ClientError::InvalidInput(format!("response for task {name} had no task body")))
    }

    #[instrument(skip(self))]
    pub async fn tasks(&self) -> ClientResult<Vec<TaskConfig>> {
        let response = self.http.get(self.url("/v1/tasks")).send().await?;
        let envelope: wire::TasksListEnvelope = Self::decode(response).await?;
        Ok(envelope.tasks)
    }

    /// `run` is one of `None`, `Some("now")`, `Some("inspect")`.
    #[instrument(skip(self, task))]
    pub async fn create_task(
        &self,
        task: TaskConfig,
        run: Option<&str>,
    ) -> ClientResult<wire::TaskResponseEnvelope> {
        let mut url = self.url("/v1/tasks");
        if let Some(run) = run {
            url = format!("{url}?run={run}");
        }
        let response = self
            .http
            .post(url)
            .json(&wire::CreateTaskRequest { task })
            .send()
            .await?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    pub async fn update_task(
        &self,
        name: &str,
        enabled: bool,
        run: Option<&str>,
    ) -> ClientResult<wire::TaskResponseEnvelope> {
        let mut url = self.url(&format!("/v1/tasks/{name}"));
        if let Some(run) = run {
            url = format!("{url}?run={run}");
        }
        let response = self
            .http
            .patch(url)
            .json(&wire::UpdateTaskRequest { enabled })
            .send()
            .await?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    pub async fn delete_task(&self, name: &str) -> ClientResult<()> {
        let response = self
            .http
            .delete(self.url(&format!("/v1/tasks/{name}")))
            .send()
            .await?;
        let _: wire::TaskResponseEnvelope = Self::decode(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn status(&self) -> ClientResult<wire::OverallStatusEnvelope> {
        let response = self.http.get(self.url("/v1/status")).send().await?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    pub async fn all_task_status(&self, status_filter: Option<&str>) -> ClientResult<wire::TaskStatusMap> {
        let mut url = self.url("/v1/status/tasks");
        if let Some(filter) = status_filter {
            url = format!("{url}?status={filter}");
        }
        let response = self.http.get(url).send().await?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    pub async fn task_status(&self, name: &str, include_events: bool) -> ClientResult<wire::TaskStatusMap> {
        let mut url = self.url(&format!("/v1/status/tasks/{name}"));
        if include_events {
            url = format!("{url}?include=events");
        }
        let response = self.http.get(url).send().await?;
        Self::decode(response).await
    }

    /// Poll `GET /v1/status` with no backoff until it returns a non-error
    /// response or `timeout` elapses.
    ///
    /// # Errors
    /// Returns `ClientError::Timeout` if the deadline passes without a
    /// successful response.
    pub async fn wait_for_api(&self, timeout: Duration) -> ClientResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.http.get(self.url("/v1/status")).send().await {
                Ok(response) if response.status() != StatusCode::SERVICE_UNAVAILABLE => {
                    debug!("API became reachable");
                    return Ok(());
                }
                Ok(response) => {
                    warn!(status = %response.status(), "API not yet ready");
                }
                Err(e) => {
                    warn!(error = %e, "API unreachable, retrying");
                }
            }

            if Instant::now() >= deadline {
                return Err(ClientError::Timeout {
                    operation: "wait_for_api".to_string(),
                });
            }

            // Fixed interval, not exponential: no backoff, only a deadline.
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_with_no_tls_material() {
        let cfg = ClientConfig::new("https://localhost:8558", None, None, None, None, true).unwrap();
        assert!(Client::new(cfg).is_ok());
    }

    #[test]
    fn client_rejects_unreadable_ca_cert() {
        let cfg = ClientConfig::new(
            "https://localhost:8558",
            Some("/nonexistent/ca.pem".to_string()),
            None,
            None,
            None,
            true,
        )
        .unwrap();
        assert!(Client::new(cfg).is_err());
    }
}
