//! Agent sync loop.
//!
//! Each round:
//!   1. POST every endpoint file in the upload dir to /address.
//!   2. GET /pinglist and /address_store and write them as YAML into the
//!      download dir. A failed fetch writes an empty mapping so that the
//!      prober never acts on a stale file.
//!
//! Endpoint files are named after the IPv4 address they describe and hold
//! exactly four lines: gid, lid, qpn, declared time.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;

use pingweave_core::AddressRegistration;
use pingweave_core::config::PingweaveConfig;

use super::http::{Controller, get_json, post_address};

/// Lists mirrored into the download dir.
const MIRRORED: [&str; 2] = ["pinglist", "address_store"];

pub async fn cmd_sync(controller: &Controller, config: &PingweaveConfig, once: bool) -> Result<()> {
    let client = reqwest::Client::new();
    let upload_dir = &config.paths.upload_dir;
    let download_dir = &config.paths.download_dir;

    std::fs::create_dir_all(download_dir)
        .with_context(|| format!("failed to create {}", download_dir.display()))?;

    tracing::info!(
        server = %controller.url(""),
        upload = %upload_dir.display(),
        download = %download_dir.display(),
        "agent sync starting"
    );

    loop {
        send_endpoint_files(&client, controller, upload_dir).await;
        for name in MIRRORED {
            fetch_to_yaml(&client, controller, name, download_dir).await;
        }

        if once {
            return Ok(());
        }
        tokio::time::sleep(config.param.sync_interval() + Duration::from_millis(10)).await;
    }
}

/// Register every well-formed endpoint file. Failures are logged per file.
async fn send_endpoint_files(client: &reqwest::Client, controller: &Controller, dir: &Path) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!(dir = %dir.display(), error = %e, "cannot read upload dir");
            return;
        }
    };

    let url = controller.url("address");
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        let Some(registration) = parse_endpoint_file(name, &content) else {
            continue;
        };

        match post_address(client, &url, &registration).await {
            Ok((status, _)) if status.is_success() => {
                tracing::debug!(ip = name, "sent POST address to the server");
            }
            Ok((status, text)) => {
                tracing::error!(ip = name, %status, reply = text, "server rejected address");
            }
            Err(e) => {
                tracing::error!(ip = name, error = %e, "failed to send POST address");
            }
        }
    }
}

/// Build a registration from an upload file, or `None` if it is not one.
pub fn parse_endpoint_file(file_name: &str, content: &str) -> Option<AddressRegistration> {
    if file_name.matches('.').count() != 3 {
        return None;
    }
    let lines: Vec<&str> = content.lines().collect();
    let [gid, lid, qpn, dtime] = lines.as_slice() else {
        return None;
    };
    Some(AddressRegistration {
        ip_address: Some(file_name.to_string()),
        gid: Some(gid.to_string()),
        lid: Some(lid.to_string()),
        qpn: Some(qpn.to_string()),
        dtime: Some(dtime.to_string()),
    })
}

async fn fetch_to_yaml(client: &reqwest::Client, controller: &Controller, name: &str, dir: &Path) {
    let path: PathBuf = dir.join(format!("{name}.yaml"));

    let yaml = match get_json(client, &controller.url(name)).await {
        Ok(value) => serde_yaml::to_string(&value).map_err(anyhow::Error::from),
        Err(e) => Err(e),
    };
    let yaml = yaml.unwrap_or_else(|e| {
        tracing::error!(list = name, error = %e, "fetch failed, writing empty YAML");
        empty_yaml()
    });

    if let Err(e) = std::fs::write(&path, yaml) {
        tracing::error!(path = %path.display(), error = %e, "failed to write YAML");
    } else {
        tracing::debug!(list = name, path = %path.display(), "saved");
    }
}

fn empty_yaml() -> String {
    serde_yaml::to_string(&Value::Object(Default::default())).unwrap_or_else(|_| "{}\n".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_line_ip_file_parses() {
        let reg = parse_endpoint_file(
            "10.0.0.1",
            "fe80::b8ce:f6ff:fe01:0203\n3\n4711\n2024-05-01 12:00:00\n",
        )
        .unwrap();
        assert_eq!(reg.ip_address.as_deref(), Some("10.0.0.1"));
        assert_eq!(reg.gid.as_deref(), Some("fe80::b8ce:f6ff:fe01:0203"));
        assert_eq!(reg.lid.as_deref(), Some("3"));
        assert_eq!(reg.qpn.as_deref(), Some("4711"));
        assert_eq!(reg.dtime.as_deref(), Some("2024-05-01 12:00:00"));
    }

    #[test]
    fn non_ip_file_name_is_skipped() {
        assert!(parse_endpoint_file("README", "a\nb\nc\nd\n").is_none());
        assert!(parse_endpoint_file("10.0.0.1.bak", "a\nb\nc\nd\n").is_none());
    }

    #[test]
    fn wrong_line_count_is_skipped() {
        assert!(parse_endpoint_file("10.0.0.1", "a\nb\nc\n").is_none());
        assert!(parse_endpoint_file("10.0.0.1", "a\nb\nc\nd\ne\n").is_none());
    }

    #[test]
    fn empty_yaml_is_an_empty_mapping() {
        assert_eq!(empty_yaml(), "{}\n");
    }
}
