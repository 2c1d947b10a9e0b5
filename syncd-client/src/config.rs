//! # Client Configuration
//!
//! Environment-variable configuration for [`crate::Client`], using the
//! `CTS_*` variable names exactly (kept as literal constants rather than
//! the `SYNCD_`-prefixed convention the server side uses, since this is the
//! wire contract callers already depend on).

use crate::error::{ClientError, ClientResult};

pub const ENV_ADDRESS: &str = "CTS_ADDRESS";
pub const ENV_CACERT: &str = "CTS_CACERT";
pub const ENV_CAPATH: &str = "CTS_CAPATH";
pub const ENV_CLIENT_CERT: &str = "CTS_CLIENT_CERT";
pub const ENV_CLIENT_KEY: &str = "CTS_CLIENT_KEY";
pub const ENV_SSL_VERIFY: &str = "CTS_SSL_VERIFY";

/// Client TLS and addressing configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub address: String,
    pub ca_cert: Option<String>,
    pub ca_path: Option<String>,
    pub client_cert: Option<String>,
    pub client_key: Option<String>,
    /// Defaults to `true` — TLS verification is on unless explicitly
    /// disabled.
    pub ssl_verify: bool,
}

impl ClientConfig {
    /// Build a configuration from the process environment.
    ///
    /// # Errors
    /// Returns `ClientError::ConfigError` if `CTS_ADDRESS` is unset, or if
    /// exactly one of `CTS_CLIENT_CERT`/`CTS_CLIENT_KEY` is set.
    pub fn from_env() -> ClientResult<Self> {
        let address = std::env::var(ENV_ADDRESS)
            .map_err(|_| ClientError::config_error(format!("{ENV_ADDRESS} is not set")))?;

        let ca_cert = std::env::var(ENV_CACERT).ok();
        let ca_path = std::env::var(ENV_CAPATH).ok();
        let client_cert = std::env::var(ENV_CLIENT_CERT).ok();
        let client_key = std::env::var(ENV_CLIENT_KEY).ok();
        let ssl_verify = std::env::var(ENV_SSL_VERIFY)
            .ok()
            .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);

        Self::new(address, ca_cert, ca_path, client_cert, client_key, ssl_verify)
    }

    /// Construct directly, enforcing the cert/key pairing invariant.
    ///
    /// # Errors
    /// Returns `ClientError::ConfigError` if exactly one of `client_cert`/
    /// `client_key` is supplied.
    pub fn new(
        address: impl Into<String>,
        ca_cert: Option<String>,
        ca_path: Option<String>,
        client_cert: Option<String>,
        client_key: Option<String>,
        ssl_verify: bool,
    ) -> ClientResult<Self> {
        if client_cert.is_some() != client_key.is_some() {
            return Err(ClientError::config_error(format!(
                "{ENV_CLIENT_CERT} and {ENV_CLIENT_KEY} must both be set or both be unset"
            )));
        }

        Ok(Self {
            address: address.into(),
            ca_cert,
            ca_path,
            client_cert,
            client_key,
            ssl_verify,
        })
    }

    #[must_use]
    pub fn mutual_tls_requested(&self) -> bool {
        self.client_cert.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cert_without_key_is_a_config_error() {
        let err = ClientConfig::new(
            "https://localhost:8558",
            None,
            None,
            Some("cert.pem".to_string()),
            None,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::ConfigError(_)));
    }

    #[test]
    fn key_without_cert_is_a_config_error() {
        let err = ClientConfig::new(
            "https://localhost:8558",
            None,
            None,
            None,
            Some("key.pem".to_string()),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::ConfigError(_)));
    }

    #[test]
    fn cert_and_key_together_is_fine() {
        let cfg = ClientConfig::new(
            "https://localhost:8558",
            None,
            None,
            Some("cert.pem".to_string()),
            Some("key.pem".to_string()),
            true,
        )
        .unwrap();
        assert!(cfg.mutual_tls_requested());
    }

    #[test]
    fn neither_cert_nor_key_is_fine() {
        let cfg = ClientConfig::new("https://localhost:8558", None, None, None, None, true).unwrap();
        assert!(!cfg.mutual_tls_requested());
    }

    #[test]
    fn ssl_verify_defaults_to_true() {
        let cfg = ClientConfig::new("https://localhost:8558", None, None, None, None, true).unwrap();
        assert!(cfg.ssl_verify);
    }
}
