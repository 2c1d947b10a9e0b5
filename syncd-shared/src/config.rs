//! # Server Configuration
//!
//! Listener configuration for the control-plane API: bind port, optional
//! TLS, and optional mutual-TLS client verification. Loaded from a TOML
//! file via the `config` crate with environment-variable overrides under
//! the `SYNCD_` prefix, following the layered file-then-env convention the
//! rest of the workspace uses for its own configuration.

use serde::{Deserialize, Serialize};

/// Client-certificate verification source for mutual TLS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CaSource {
    File { ca_file: String },
    Path { ca_path: String },
}

/// TLS settings for the listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TlsConfig {
    pub cert_file: String,
    pub key_file: String,
    #[serde(default)]
    pub verify_incoming: Option<CaSource>,
}

/// Top-level listener configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub tls: Option<TlsConfig>,
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    #[serde(default = "default_write_timeout_secs")]
    pub write_timeout_secs: u64,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_shutdown_drain_secs")]
    pub shutdown_drain_secs: u64,
}

fn default_port() -> u16 {
    8558
}
fn default_read_timeout_secs() -> u64 {
    15
}
fn default_write_timeout_secs() -> u64 {
    15
}
fn default_idle_timeout_secs() -> u64 {
    60
}
fn default_shutdown_drain_secs() -> u64 {
    5
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            tls: None,
            read_timeout_secs: default_read_timeout_secs(),
            write_timeout_secs: default_write_timeout_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
            shutdown_drain_secs: default_shutdown_drain_secs(),
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn mutual_tls_enabled(&self) -> bool {
        self.tls
            .as_ref()
            .is_some_and(|tls| tls.verify_incoming.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_specification_timeouts() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.read_timeout_secs, 15);
        assert_eq!(cfg.write_timeout_secs, 15);
        assert_eq!(cfg.idle_timeout_secs, 60);
        assert_eq!(cfg.shutdown_drain_secs, 5);
        assert!(cfg.tls.is_none());
    }

    #[test]
    fn mutual_tls_requires_verify_incoming() {
        let mut cfg = ServerConfig::default();
        assert!(!cfg.mutual_tls_enabled());

        cfg.tls = Some(TlsConfig {
            cert_file: "cert.pem".to_string(),
            key_file: "key.pem".to_string(),
            verify_incoming: None,
        });
        assert!(!cfg.mutual_tls_enabled());

        cfg.tls = Some(TlsConfig {
            cert_file: "cert.pem".to_string(),
            key_file: "key.pem".to_string(),
            verify_incoming: Some(CaSource::File {
                ca_file: "ca.pem".to_string(),
            }),
        });
        assert!(cfg.mutual_tls_enabled());
    }
}
