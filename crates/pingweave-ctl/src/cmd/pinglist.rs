//! Pinglist command.

use anyhow::{Context, Result};

use super::http::{Controller, get_json};

pub async fn cmd_pinglist(controller: &Controller) -> Result<()> {
    let client = reqwest::Client::new();
    let list = get_json(&client, &controller.url("pinglist")).await?;

    if list.as_object().is_some_and(|m| m.is_empty()) {
        println!("Pinglist is empty.");
        return Ok(());
    }

    let yaml = serde_yaml::to_string(&list).context("failed to render pinglist")?;
    print!("{yaml}");
    Ok(())
}
