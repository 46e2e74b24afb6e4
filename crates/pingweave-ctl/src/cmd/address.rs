//! Address store commands.

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};

use pingweave_core::{AddressRecord, AddressRegistration};

use super::http::{Controller, get_json, post_address};

pub async fn cmd_address_store(controller: &Controller) -> Result<()> {
    let client = reqwest::Client::new();
    let value = get_json(&client, &controller.url("address_store")).await?;
    let records: BTreeMap<String, AddressRecord> =
        serde_json::from_value(value).context("unexpected address_store shape")?;

    if records.is_empty() {
        println!("No registered addresses.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Address Store ({})", records.len());
    println!("═══════════════════════════════════════");

    for r in records.values() {
        println!("  ┌─ {}", r.ip_address);
        println!("  │  gid      : {}", r.gid);
        println!("  │  lid      : {}", r.lid);
        println!("  │  qpn      : {}", r.qpn);
        println!("  │  declared : {}", r.declared_time);
        println!("  └─ updated  : {}", r.updated_time);
    }

    Ok(())
}

pub async fn cmd_register(controller: &Controller, fields: [&str; 5]) -> Result<()> {
    let [ip, gid, lid, qpn, dtime] = fields;
    let registration = AddressRegistration {
        ip_address: Some(ip.to_string()),
        gid: Some(gid.to_string()),
        lid: Some(lid.to_string()),
        qpn: Some(qpn.to_string()),
        dtime: Some(dtime.to_string()),
    };

    let client = reqwest::Client::new();
    let (status, text) = post_address(&client, &controller.url("address"), &registration).await?;
    if !status.is_success() {
        bail!("registration rejected ({status}): {text}");
    }

    println!("✓ {ip}: {text}");
    Ok(())
}
