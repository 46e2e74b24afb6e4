use serde_json::json;

use crate::*;

fn registration(ip: &str, lid: &str) -> Value {
    json!({ "ip_address": ip, "gid": "g1", "lid": lid, "qpn": "100", "dtime": "T1" })
}

/// Register, re-register, then let the record expire, all over HTTP.
#[tokio::test]
async fn test_address_lifecycle() -> Result<()> {
    let server = TestServer::start(1000).await?;

    let (status, text) = server.post_json("/address", &registration("10.0.0.1", "1")).await?;
    assert_eq!((status, text.as_str()), (200, "Address updated"));

    let (status, store) = server.get_json("/address_store").await?;
    assert_eq!(status, 200);
    assert_eq!(store, json!({ "10.0.0.1": ["10.0.0.1", "g1", 1, 100, "T1", 1000] }));

    server.clock.set(1005);
    let (status, _) = server.post_json("/address", &registration("10.0.0.1", "2")).await?;
    assert_eq!(status, 200);

    let (_, store) = server.get_json("/address_store").await?;
    assert_eq!(store, json!({ "10.0.0.1": ["10.0.0.1", "g1", 2, 100, "T1", 1005] }));

    server.clock.set(1400);
    let (status, store) = server.get_json("/address_store").await?;
    assert_eq!(status, 200);
    assert_eq!(store, json!({}));

    server.stop().await
}

#[tokio::test]
async fn test_missing_field_rejected_without_side_effect() -> Result<()> {
    let server = TestServer::start(1000).await?;

    let body = json!({ "ip_address": "10.0.0.1", "gid": "g1", "qpn": "100", "dtime": "T1" });
    let (status, text) = server.post_json("/address", &body).await?;
    assert_eq!((status, text.as_str()), (400, "Invalid data"));

    let (_, store) = server.get_json("/address_store").await?;
    assert_eq!(store, json!({}));
    assert!(server.addresses.is_empty().await);

    server.stop().await
}

#[tokio::test]
async fn test_malformed_body_is_server_error() -> Result<()> {
    let server = TestServer::start(1000).await?;

    let (status, text) = server.post_raw("/address", "ip_address=10.0.0.1").await?;
    assert_eq!((status, text.as_str()), (500, "Internal server error"));

    // The listener keeps serving afterwards.
    let (status, _) = server.post_json("/address", &registration("10.0.0.2", "3")).await?;
    assert_eq!(status, 200);

    server.stop().await
}

#[tokio::test]
async fn test_many_agents_register_concurrently() -> Result<()> {
    let server = TestServer::start(2000).await?;

    let mut tasks = Vec::new();
    for i in 0..64u32 {
        let client = server.client.clone();
        let url = server.url("/address");
        let body = json!({
            "ip_address": format!("10.1.0.{i}"),
            "gid": format!("gid-{i}"),
            "lid": i,
            "qpn": 1000 + i,
            "dtime": "2024-05-01 12:00:00"
        });
        tasks.push(tokio::spawn(async move {
            client.post(url).json(&body).send().await.map(|r| r.status().as_u16())
        }));
    }
    for t in tasks {
        assert_eq!(t.await??, 200);
    }

    let (_, store) = server.get_json("/address_store").await?;
    let store = store.as_object().context("address_store is an object")?;
    assert_eq!(store.len(), 64);
    assert_eq!(store["10.1.0.7"], json!(["10.1.0.7", "gid-7", 7, 1007, "2024-05-01 12:00:00", 2000]));

    server.stop().await
}
