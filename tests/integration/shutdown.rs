use std::time::Duration;

use pingweave_services::{FileSource, refresh_loop};

use crate::*;

#[tokio::test]
async fn test_server_and_refresh_stop_on_shutdown() -> Result<()> {
    let server = TestServer::start(0).await?;
    let path = std::env::temp_dir().join(format!("pingweave-it-{}-shutdown.yaml", std::process::id()));
    std::fs::write(&path, "udp:\n  host-b: [10.0.1.1]\n")?;

    let refresh = tokio::spawn(refresh_loop(
        server.pinglist.clone(),
        FileSource::new(&path),
        Duration::from_secs(60),
        server.shutdown.subscribe(),
    ));

    // First reload happens right away.
    let mut loaded = false;
    for _ in 0..50 {
        let (_, list) = server.get_json("/pinglist").await?;
        if list.get("udp").is_some() {
            loaded = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(loaded, "pinglist was never loaded");

    let base = server.base.clone();
    tokio::time::timeout(Duration::from_secs(5), server.stop())
        .await
        .context("server did not stop")??;
    tokio::time::timeout(Duration::from_secs(5), refresh)
        .await
        .context("refresh loop did not stop")??;

    // Nothing is listening any more.
    assert!(reqwest::get(format!("{base}/pinglist")).await.is_err());

    let _ = std::fs::remove_file(&path);
    Ok(())
}
