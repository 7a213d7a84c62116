//! End-to-end sync flow: fake daemon, real client, real orchestrator.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use murk_client::LocalApiClient;
use murk_model::ApplyRequest;
use murk_sync::{FailureCategory, RejectReason, SyncOrchestrator, SyncOutcome};

const TOKEN: &str = "test-token";

/// Records daemon-side events so tests can assert call ordering.
#[derive(Default)]
struct Daemon {
    events: Mutex<Vec<&'static str>>,
}

impl Daemon {
    fn record(&self, event: &'static str) {
        self.events.lock().unwrap().push(event);
    }

    fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }
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
        {"nodeKey": "nodekey:bb…", "hostname": "bravo", "config": {"JC": 2}},
        {"nodeKey": "nodekey:dd…", "hostname": "delta", "config": null}
    ]))
    .into_response()
}

async fn awg_sync_apply(
    State(daemon): State<Arc<Daemon>>,
    headers: HeaderMap,
    Json(req): Json<ApplyRequest>,
) -> impl IntoResponse {
    if !authed(&headers) {
        return (StatusCode::UNAUTHORIZED, "invalid bearer token").into_response();
    }
    daemon.record("apply");
    // bravo dropped its profile between probe and apply.
    if req.node_key.as_str() == "nodekey:full-bravo" {
        return (StatusCode::CONFLICT, "peer has no Amnezia-WG config").into_response();
    }
    Json(serde_json::json!({"success": true})).into_response()
}

async fn netmap(headers: HeaderMap) -> impl IntoResponse {
    if !authed(&headers) {
        return (StatusCode::UNAUTHORIZED, "invalid bearer token").into_response();
    }
    Json(serde_json::json!({
        "SelfNode": {"Key": "nodekey:me", "Name": "me.example.ts.net", "ComputedName": "me"},
        "Peers": [
            {"Key": "nodekey:full-alpha", "Name": "alpha.example.ts.net", "ComputedName": "alpha"},
            {"Key": "nodekey:full-bravo", "Name": "bravo.example.ts.net", "ComputedName": "bravo"}
        ]
    }))
    .into_response()
}

async fn tunnel_down(State(daemon): State<Arc<Daemon>>) -> impl IntoResponse {
    daemon.record("down");
    StatusCode::OK
}

async fn tunnel_up(State(daemon): State<Arc<Daemon>>) -> impl IntoResponse {
    daemon.record("up");
    StatusCode::OK
}

async fn prefs(headers: HeaderMap) -> impl IntoResponse {
    if !authed(&headers) {
        return (StatusCode::UNAUTHORIZED, "invalid bearer token").into_response();
    }
    Json(serde_json::json!({})).into_response()
}

async fn spawn_daemon(daemon: Arc<Daemon>) -> String {
    let router = Router::new()
        .route("/localapi/v0/awg-sync-peers", post(awg_sync_peers))
        .route("/localapi/v0/awg-sync-apply", post(awg_sync_apply))
        .route("/localapi/v0/prefs", get(prefs))
        .route("/localapi/v0/netmap", get(netmap))
        .route("/localapi/v0/tunnel/down", post(tunnel_down))
        .route("/localapi/v0/tunnel/up", post(tunnel_up))
        .with_state(daemon);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{addr}")
}

async fn orchestrator(daemon: Arc<Daemon>) -> SyncOrchestrator<LocalApiClient> {
    let base = spawn_daemon(daemon).await;
    let client = LocalApiClient::new(base, TOKEN);
    SyncOrchestrator::with_settle(client, Duration::ZERO)
}

#[tokio::test]
async fn test_full_sync_success_bounces_tunnel() {
    let daemon = Arc::new(Daemon::default());
    let orch = orchestrator(daemon.clone()).await;

    let message = orch.refresh_peers().await;
    assert_eq!(message, "Found 2/3 peers with AWG config");

    let outcome = orch.sync_from_peer("alpha", None).await;
    assert!(outcome.applied());
    assert_eq!(
        outcome.message(),
        "AWG config from alpha applied successfully"
    );
    assert_eq!(daemon.events(), vec!["apply", "down", "up"]);
    assert_eq!(orch.in_progress().await, None);
}

#[tokio::test]
async fn test_daemon_conflict_reaches_classifier() {
    let daemon = Arc::new(Daemon::default());
    let orch = orchestrator(daemon.clone()).await;
    orch.refresh_peers().await;

    let outcome = orch.sync_from_peer("bravo", None).await;
    match &outcome {
        SyncOutcome::Failed { failure } => {
            assert_eq!(failure.category, FailureCategory::PeerMissingProfile);
            assert_eq!(failure.message, "Target peer bravo has no AWG config");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    // Apply was attempted, the tunnel was never touched.
    assert_eq!(daemon.events(), vec!["apply"]);
}

#[tokio::test]
async fn test_peer_without_profile_never_reaches_daemon() {
    let daemon = Arc::new(Daemon::default());
    let orch = orchestrator(daemon.clone()).await;
    orch.refresh_peers().await;

    let outcome = orch.sync_from_peer("delta", None).await;
    assert!(matches!(
        outcome,
        SyncOutcome::NotAttempted {
            reason: RejectReason::MissingProfile,
            ..
        }
    ));
    assert!(daemon.events().is_empty());
}

#[tokio::test]
async fn test_bad_token_degrades_discovery() {
    let daemon = Arc::new(Daemon::default());
    let base = spawn_daemon(daemon).await;
    let client = LocalApiClient::new(base, "wrong-token");
    let orch = SyncOrchestrator::with_settle(client, Duration::ZERO);

    let message = orch.refresh_peers().await;
    assert!(message.starts_with("Failed to get AWG config info:"));
    assert!(message.contains("401"));
    assert!(orch.status_index().await.is_empty());
}
