use serde_json::json;

use pingweave_services::FileSource;

use crate::*;

fn temp_yaml(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("pingweave-it-{}-{}.yaml", std::process::id(), name))
}

#[tokio::test]
async fn test_pinglist_empty_before_first_load() -> Result<()> {
    let server = TestServer::start(0).await?;

    let (status, list) = server.get_json("/pinglist").await?;
    assert_eq!(status, 200);
    assert_eq!(list, json!({}));

    server.stop().await
}

#[tokio::test]
async fn test_pinglist_follows_source_file() -> Result<()> {
    let server = TestServer::start(0).await?;
    let path = temp_yaml("follows");
    let source = FileSource::new(&path);

    std::fs::write(&path, "rdma:\n  host-a:\n    - 10.0.0.1\n    - 10.0.0.2\n")?;
    server.pinglist.reload(&source).await?;
    let (_, list) = server.get_json("/pinglist").await?;
    assert_eq!(list, json!({ "rdma": { "host-a": ["10.0.0.1", "10.0.0.2"] } }));

    // A missing source empties the list instead of serving the old one.
    std::fs::remove_file(&path)?;
    assert!(server.pinglist.reload(&source).await.is_err());
    let (status, list) = server.get_json("/pinglist").await?;
    assert_eq!(status, 200);
    assert_eq!(list, json!({}));

    server.stop().await
}
