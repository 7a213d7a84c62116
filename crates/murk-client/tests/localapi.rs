//! LocalApiClient tests against an in-process fake daemon.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use murk_client::{ClientError, LocalApiClient, MeshApi};
use murk_model::{ApplyRequest, NodeKey, SyncTimeout};

const TOKEN: &str = "test-token";

#[derive(Default)]
struct DaemonState {
    down_calls: AtomicUsize,
    up_calls: AtomicUsize,
}

fn authed(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

async fn awg_sync_peers(headers: HeaderMap) -> impl IntoResponse {
    if !authed(&headers) {
        return (StatusCode::UNAUTHORIZED, "invalid bearer token").into_response();
    }
    Json(serde_json::json!([
        {"nodeKey": "nodekey:aa…", "hostname": "alpha", "config": {"JC": 4, "H1": 123}},
        {"nodeKey": "nodekey:bb…", "hostname": "bravo", "config": null},
        {"nodeKey": "nodekey:cc…", "hostname": "carol", "config": {"JC": 1}, "error": "probe timed out"}
    ]))
    .into_response()
}

async fn prefs(headers: HeaderMap) -> impl IntoResponse {
    if !authed(&headers) {
        return (StatusCode::UNAUTHORIZED, "invalid bearer token").into_response();
    }
    Json(serde_json::json!({"AmneziaWG": {"JC": 2, "JMin": 10}})).into_response()
}

async fn awg_sync_apply(headers: HeaderMap, Json(req): Json<ApplyRequest>) -> impl IntoResponse {
    if !authed(&headers) {
        return (StatusCode::UNAUTHORIZED, "invalid bearer token").into_response();
    }
    if req.node_key.as_str() == "nodekey:no-config" {
        return (StatusCode::CONFLICT, "peer has no Amnezia-WG config").into_response();
    }
    Json(serde_json::json!({"success": true, "message": "applied"})).into_response()
}

async fn netmap(headers: HeaderMap) -> impl IntoResponse {
    if !authed(&headers) {
        return (StatusCode::UNAUTHORIZED, "invalid bearer token").into_response();
    }
    Json(serde_json::json!({
        "SelfNode": {"Key": "nodekey:me", "Name": "me.example.ts.net", "ComputedName": "me"},
        "Peers": [{"Key": "nodekey:full-alpha", "Name": "alpha.example.ts.net", "ComputedName": "alpha"}]
    }))
    .into_response()
}

async fn tunnel_down(State(state): State<Arc<DaemonState>>, headers: HeaderMap) -> impl IntoResponse {
    if !authed(&headers) {
        return (StatusCode::UNAUTHORIZED, "invalid bearer token").into_response();
    }
    state.down_calls.fetch_add(1, Ordering::SeqCst);
    StatusCode::OK.into_response()
}

async fn tunnel_up(State(state): State<Arc<DaemonState>>, headers: HeaderMap) -> impl IntoResponse {
    if !authed(&headers) {
        return (StatusCode::UNAUTHORIZED, "invalid bearer token").into_response();
    }
    state.up_calls.fetch_add(1, Ordering::SeqCst);
    StatusCode::OK.into_response()
}

async fn spawn_daemon(state: Arc<DaemonState>) -> String {
    let router = Router::new()
        .route("/localapi/v0/awg-sync-peers", post(awg_sync_peers))
        .route("/localapi/v0/prefs", get(prefs))
        .route("/localapi/v0/awg-sync-apply", post(awg_sync_apply))
        .route("/localapi/v0/netmap", get(netmap))
        .route("/localapi/v0/tunnel/down", post(tunnel_down))
        .route("/localapi/v0/tunnel/up", post(tunnel_up))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_probe_decodes_peer_list() {
    let base = spawn_daemon(Arc::new(DaemonState::default())).await;
    let client = LocalApiClient::new(base, TOKEN);

    let peers = client.probe_awg_peers().await.unwrap();
    assert_eq!(peers.len(), 3);
    assert!(peers[0].has_config());
    assert!(!peers[1].has_config());
    // Errored probe: config present but the error wins.
    assert!(!peers[2].has_config());
}

#[tokio::test]
async fn test_bearer_token_is_enforced() {
    let base = spawn_daemon(Arc::new(DaemonState::default())).await;
    let client = LocalApiClient::new(base, "wrong-token");

    let err = client.probe_awg_peers().await.unwrap_err();
    match err {
        ClientError::Status { status, .. } => assert_eq!(status, 401),
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_local_prefs_decode() {
    let base = spawn_daemon(Arc::new(DaemonState::default())).await;
    let client = LocalApiClient::new(base, TOKEN);

    let prefs = client.local_prefs().await.unwrap();
    assert!(prefs.obfuscation.unwrap().has_non_default_values());
}

#[tokio::test]
async fn test_apply_success() {
    let base = spawn_daemon(Arc::new(DaemonState::default())).await;
    let client = LocalApiClient::new(base, TOKEN);

    let resp = client
        .apply_awg_config(&ApplyRequest {
            node_key: NodeKey::new("nodekey:full-alpha"),
            timeout: SyncTimeout::default(),
        })
        .await
        .unwrap();
    assert!(resp.success);
}

#[tokio::test]
async fn test_apply_error_keeps_status_and_body() {
    let base = spawn_daemon(Arc::new(DaemonState::default())).await;
    let client = LocalApiClient::new(base, TOKEN);

    let err = client
        .apply_awg_config(&ApplyRequest {
            node_key: NodeKey::new("nodekey:no-config"),
            timeout: SyncTimeout::default(),
        })
        .await
        .unwrap_err();

    // The classifier matches on both the code and the daemon phrase, so
    // Display must carry both.
    assert_eq!(err.to_string(), "HTTP 409 peer has no Amnezia-WG config");
}

#[tokio::test]
async fn test_netmap_decode() {
    let base = spawn_daemon(Arc::new(DaemonState::default())).await;
    let client = LocalApiClient::new(base, TOKEN);

    let map = client.network_map().await.unwrap();
    assert_eq!(map.self_node.computed_name.as_deref(), Some("me"));
    assert_eq!(map.peers.len(), 1);
}

#[tokio::test]
async fn test_tunnel_lifecycle_endpoints() {
    let state = Arc::new(DaemonState::default());
    let base = spawn_daemon(state.clone()).await;
    let client = LocalApiClient::new(base, TOKEN);

    client.stop_tunnel().await.unwrap();
    client.start_tunnel().await.unwrap();

    assert_eq!(state.down_calls.load(Ordering::SeqCst), 1);
    assert_eq!(state.up_calls.load(Ordering::SeqCst), 1);
}
