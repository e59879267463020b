use crate::*;

#[tokio::test]
async fn test_status_reports_player_state() {
    let h = Harness::start(Profile::Gallery, gallery_player()).await.unwrap();
    let base = serve_api(&h).await.unwrap();
    h.eventually(|s| s.state.title.as_deref() == Some("Movie A")).await;

    let status: serde_json::Value = reqwest::get(format!("{base}/api/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(status["profile"], "gallery");
    assert_eq!(status["online"], true);
    assert_eq!(status["version"], "23.10");
    assert_eq!(status["state"]["file_id"], 7);
    assert_eq!(status["state"]["playlist"][1], "Movie B");
    assert_eq!(status["trusted"], 1);
}

#[tokio::test]
async fn test_accept_over_http() {
    let h = Harness::start(Profile::Full, gallery_player()).await.unwrap();
    let base = serve_api(&h).await.unwrap();
    let mut widget = h.connect(WIDGET);
    h.eventually(|s| !s.pending.is_empty()).await;

    let peers: serde_json::Value = reqwest::get(format!("{base}/api/peers"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(peers["pending"][0], WIDGET);
    assert_eq!(peers["local_origin"], h.config.peers.local_origin.as_str());

    let client = reqwest::Client::new();
    let answer: serde_json::Value = client
        .post(format!("{base}/api/acl/accept"))
        .json(&serde_json::json!({"origin": WIDGET}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(answer["applied"], true);
    assert_eq!(
        widget.recv().await,
        Outbound::Version {
            version: "23.10".into()
        }
    );

    let again: serde_json::Value = client
        .post(format!("{base}/api/acl/reject"))
        .json(&serde_json::json!({"origin": "https://nobody.example"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(again["applied"], false);
}

#[tokio::test]
async fn test_websocket_requires_origin() {
    let h = Harness::start(Profile::Full, gallery_player()).await.unwrap();
    let base = serve_api(&h).await.unwrap();

    let response = reqwest::Client::new()
        .get(format!("{base}/ws"))
        .header("connection", "upgrade")
        .header("upgrade", "websocket")
        .header("sec-websocket-version", "13")
        .header("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ==")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}
