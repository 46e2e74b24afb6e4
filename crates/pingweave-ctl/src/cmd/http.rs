//! Shared HTTP request helpers for CLI commands.

use anyhow::{Context, Result};
use serde_json::Value;

use pingweave_core::AddressRegistration;

/// Where the control plane lives.
#[derive(Debug, Clone)]
pub struct Controller {
    pub host: String,
    pub port: u16,
}

impl Controller {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}:{}/{}", self.host, self.port, path)
    }
}

pub async fn get_json(client: &reqwest::Client, url: &str) -> Result<Value> {
    client
        .get(url)
        .send()
        .await
        .with_context(|| format!("failed to connect to pingweave server at {url}"))?
        .error_for_status()
        .with_context(|| format!("server rejected GET {url}"))?
        .json::<Value>()
        .await
        .context("failed to parse response")
}

/// POST a registration. Returns the server's status and plain-text reply.
pub async fn post_address(
    client: &reqwest::Client,
    url: &str,
    registration: &AddressRegistration,
) -> Result<(reqwest::StatusCode, String)> {
    let resp = client
        .post(url)
        .json(registration)
        .send()
        .await
        .with_context(|| format!("failed to connect to pingweave server at {url}"))?;
    let status = resp.status();
    let text = resp.text().await.context("failed to read response")?;
    Ok((status, text))
}
