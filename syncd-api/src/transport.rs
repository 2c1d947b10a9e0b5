//! # Transport
//!
//! TLS (and optional mutual TLS) listener setup plus the graceful-shutdown
//! sequence: stop accepting new connections, drain in-flight requests for
//! up to `shutdown_drain_secs`, then exit.

use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use rustls_pemfile::{certs, pkcs8_private_keys};
use tokio::net::TcpListener;
use tracing::{info, warn};

use syncd_shared::config::{CaSource, ServerConfig};
use syncd_shared::{SyncError, SyncResult};

/// Load a `rustls::ServerConfig` from the configured cert/key, wiring in
/// client-certificate verification when `verify_incoming` is set (the
/// mutual-TLS option).
pub fn load_tls_config(cfg: &ServerConfig) -> SyncResult<Option<rustls::ServerConfig>> {
    let Some(tls) = &cfg.tls else {
        return Ok(None);
    };

    let cert_file = File::open(&tls.cert_file)
        .map_err(|e| SyncError::internal(format!("failed to open {}: {e}", tls.cert_file)))?;
    let certs = certs(&mut BufReader::new(cert_file))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| SyncError::internal(format!("failed to parse {}: {e}", tls.cert_file)))?;

    let key_file = File::open(&tls.key_file)
        .map_err(|e| SyncError::internal(format!("failed to open {}: {e}", tls.key_file)))?;
    let mut keys = pkcs8_private_keys(&mut BufReader::new(key_file))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| SyncError::internal(format!("failed to parse {}: {e}", tls.key_file)))?;
    let key = keys
        .pop()
        .ok_or_else(|| SyncError::internal(format!("no private key found in {}", tls.key_file)))?;

    let builder = rustls::ServerConfig::builder();

    let server_config = if let Some(ca_source) = &tls.verify_incoming {
        let ca_path = match ca_source {
            CaSource::File { ca_file } => ca_file.clone(),
            CaSource::Path { ca_path } => ca_path.clone(),
        };
        let ca_file = File::open(&ca_path)
            .map_err(|e| SyncError::internal(format!("failed to open {ca_path}: {e}")))?;
        let ca_certs = certs(&mut BufReader::new(ca_file))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SyncError::internal(format!("failed to parse {ca_path}: {e}")))?;

        let mut roots = rustls::RootCertStore::empty();
        for cert in ca_certs {
            roots
                .add(cert)
                .map_err(|e| SyncError::internal(format!("invalid CA certificate: {e}")))?;
        }
        let verifier = rustls::server::WebPkiClientVerifier::builder(Arc::new(roots))
            .build()
            .map_err(|e| SyncError::internal(format!("failed to build client verifier: {e}")))?;

        builder
            .with_client_cert_verifier(verifier)
            .with_single_cert(certs, rustls::pki_types::PrivateKeyDer::Pkcs8(key))
            .map_err(|e| SyncError::internal(format!("invalid server certificate/key: {e}")))?
    } else {
        builder
            .with_no_client_auth()
            .with_single_cert(certs, rustls::pki_types::PrivateKeyDer::Pkcs8(key))
            .map_err(|e| SyncError::internal(format!("invalid server certificate/key: {e}")))?
    };

    Ok(Some(server_config))
}

/// Run the server to completion: bind, serve (with TLS if configured), and
/// return once `shutdown_signal` resolves and the drain window elapses.
///
/// # Errors
/// Returns `SyncError::Internal` on bind or TLS setup failure.
pub async fn serve(
    cfg: ServerConfig,
    router: Router,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> SyncResult<()> {
    let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    let drain = Duration::from_secs(cfg.shutdown_drain_secs);

    match load_tls_config(&cfg)? {
        Some(tls_config) => {
            info!(%addr, "starting TLS listener");
            let rustls_config = axum_server::tls_rustls::RustlsConfig::from_config(Arc::new(tls_config));
            let handle = axum_server::Handle::new();
            let shutdown_handle = handle.clone();
            tokio::spawn(async move {
                shutdown_signal.await;
                shutdown_handle.graceful_shutdown(Some(drain));
            });
            axum_server::bind_rustls(addr, rustls_config)
                .handle(handle)
                .serve(router.into_make_service())
                .await
                .map_err(|e| SyncError::internal(format!("server error: {e}")))
        }
        None => {
            info!(%addr, "starting plaintext listener");
            let listener = TcpListener::bind(addr)
                .await
                .map_err(|e| SyncError::internal(format!("failed to bind {addr}: {e}")))?;

            // `axum::serve`'s own graceful shutdown has no built-in deadline:
            // it waits for every in-flight connection to finish, however
            // long that takes. A hard 5s drain window is required, after
            // which the listener is torn down regardless, so a second
            // future races the drain-then-force-exit path against the
            // server future.
            let (notify, _) = tokio::sync::broadcast::channel::<()>(1);
            let mut accept_rx = notify.subscribe();
            let mut drain_rx = notify.subscribe();
            tokio::spawn(async move {
                shutdown_signal.await;
                let _ = notify.send(());
            });

            let server = axum::serve(listener, router.into_make_service()).with_graceful_shutdown(
                async move {
                    let _ = accept_rx.recv().await;
                },
            );
            tokio::pin!(server);

            tokio::select! {
                res = &mut server => res.map_err(|e| SyncError::internal(format!("server error: {e}"))),
                () = async move {
                    let _ = drain_rx.recv().await;
                    tokio::time::sleep(drain).await;
                } => {
                    warn!(drain_secs = drain.as_secs(), "drain window elapsed, forcing shutdown");
                    Ok(())
                }
            }
        }
    }
}
