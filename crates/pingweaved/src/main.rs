//! pingweaved — pingweave control-plane server.
//!
//! Serves the pinglist and the RDMA address store to probing agents.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use pingweave_core::config::{PingweaveConfig, DEFAULT_INTERVAL_SECS};
use pingweave_core::SystemClock;
use pingweave_services::{refresh_loop, AddressRegistry, FileSource, PinglistStore};

mod iface;

use iface::ControlIpState;

/// Wait between control-IP checks while the interface is missing or down.
const CONTROL_IP_RETRY: Duration = Duration::from_secs(60);

/// Wait before retrying a failed bind.
const BIND_RETRY: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = PingweaveConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = load_config();

    // Shared state
    let pinglist = PinglistStore::new();
    let addresses = AddressRegistry::new();

    // ── Shutdown channel ─────────────────────────────────────────────────────
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    // ── Pinglist refresh ─────────────────────────────────────────────────────
    let source = FileSource::new(&config.paths.pinglist);
    tracing::info!(path = %source.path().display(), "pinglist source");
    let refresh_task = tokio::spawn(refresh_loop(
        pinglist.clone(),
        source,
        config.param.read_interval(),
        shutdown_tx.subscribe(),
    ));

    // ── API server ───────────────────────────────────────────────────────────
    let state = pingweave_api::ApiState {
        pinglist,
        addresses,
        clock: Arc::new(SystemClock),
    };

    let mut shutdown_rx = shutdown_tx.subscribe();
    let mut config = config;
    loop {
        let listener = tokio::select! {
            l = bind_when_ready(&mut config) => l,
            _ = shutdown_rx.recv() => break,
        };

        let mut server_shutdown = shutdown_tx.subscribe();
        let result = pingweave_api::serve(listener, state.clone(), async move {
            let _ = server_shutdown.recv().await;
        })
        .await;

        match result {
            Ok(()) => break,
            Err(e) => {
                tracing::error!(error = %e, "API server failed, restarting");
                tokio::select! {
                    _ = tokio::time::sleep(BIND_RETRY) => {}
                    _ = shutdown_rx.recv() => break,
                }
            }
        }
    }

    let _ = shutdown_tx.send(());
    if let Err(e) = refresh_task.await {
        tracing::error!(error = %e, "pinglist refresh task failed");
    }

    tracing::info!("pingweaved stopped");
    Ok(())
}

/// Load config, falling back to defaults on any error.
fn load_config() -> PingweaveConfig {
    PingweaveConfig::load().unwrap_or_else(|e| {
        tracing::error!(error = %e, "error reading configuration");
        tracing::error!(
            interval_sync_pinglist_sec = DEFAULT_INTERVAL_SECS,
            interval_read_pinglist_sec = DEFAULT_INTERVAL_SECS,
            "using default parameters"
        );
        PingweaveConfig::default()
    })
}

/// Block until the control IP is up on a local interface and the listener
/// is bound. Config is re-read before every retry.
async fn bind_when_ready(config: &mut PingweaveConfig) -> TcpListener {
    loop {
        let host = config.controller.host.clone();
        match host.parse::<IpAddr>() {
            Ok(ip) => match iface::control_ip_state(ip) {
                Ok(ControlIpState::Up(interface)) => {
                    tracing::debug!(%ip, interface, "control IP is up");
                    let addr = config.controller.addr();
                    match TcpListener::bind(&addr).await {
                        Ok(listener) => return listener,
                        Err(e) => {
                            tracing::error!(error = %e, addr, "cannot start the pingweave server");
                            tokio::time::sleep(BIND_RETRY).await;
                            *config = load_config();
                            continue;
                        }
                    }
                }
                Ok(ControlIpState::Down(interface)) => {
                    tracing::error!(%ip, interface, "interface with control IP is down");
                }
                Ok(ControlIpState::Absent) => {
                    tracing::error!(%ip, "no active interface with control IP");
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to check control IP");
                }
            },
            Err(e) => {
                tracing::error!(host, error = %e, "control host is not an IP address");
            }
        }

        tracing::info!(retry_secs = CONTROL_IP_RETRY.as_secs(), "waiting for control IP");
        tokio::time::sleep(CONTROL_IP_RETRY).await;
        *config = load_config();
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for SIGTERM");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
    }
}
