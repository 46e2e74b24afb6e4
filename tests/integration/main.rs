//! pingweave integration test harness.
//!
//! Each test starts a real API server on an ephemeral loopback port, backed
//! by fresh stores and a manual clock, and talks to it over HTTP.
//!
//!   cargo test --test integration

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use pingweave_api::ApiState;
use pingweave_core::ManualClock;
use pingweave_services::{AddressRegistry, PinglistStore};

mod address;
mod pinglist;
mod shutdown;

// ── Harness ───────────────────────────────────────────────────────────────────

/// A running server plus handles to everything behind it.
pub struct TestServer {
    pub base: String,
    pub clock: ManualClock,
    pub pinglist: PinglistStore,
    pub addresses: AddressRegistry,
    pub client: reqwest::Client,
    pub shutdown: broadcast::Sender<()>,
    pub task: JoinHandle<Result<()>>,
}

impl TestServer {
    pub async fn start(now: u64) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind ephemeral port")?;
        let base = format!("http://{}", listener.local_addr()?);

        let clock = ManualClock::new(now);
        let pinglist = PinglistStore::new();
        let addresses = AddressRegistry::new();
        let state = ApiState {
            pinglist: pinglist.clone(),
            addresses: addresses.clone(),
            clock: Arc::new(clock.clone()),
        };

        let (shutdown, _) = broadcast::channel::<()>(1);
        let mut rx = shutdown.subscribe();
        let task = tokio::spawn(pingweave_api::serve(listener, state, async move {
            let _ = rx.recv().await;
        }));

        Ok(Self {
            base,
            clock,
            pinglist,
            addresses,
            client: reqwest::Client::new(),
            shutdown,
            task,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn get_json(&self, path: &str) -> Result<(u16, Value)> {
        let resp = self.client.get(self.url(path)).send().await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json().await?))
    }

    pub async fn post_raw(&self, path: &str, body: impl Into<reqwest::Body>) -> Result<(u16, String)> {
        let resp = self
            .client
            .post(self.url(path))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await?;
        let status = resp.status().as_u16();
        Ok((status, resp.text().await?))
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Result<(u16, String)> {
        self.post_raw(path, body.to_string()).await
    }

    pub async fn stop(self) -> Result<()> {
        let _ = self.shutdown.send(());
        self.task.await??;
        Ok(())
    }
}
