//! Murk Client -- the local daemon RPC boundary.
//!
//! [`MeshApi`] is the full collaborator surface the sync layer consumes:
//! the profile probe, local preferences, the apply call, the network map,
//! and the tunnel lifecycle primitives. [`LocalApiClient`] implements it
//! over HTTP against the daemon's local API with bearer-token auth.

pub mod localapi;

pub use localapi::LocalApiClient;

use async_trait::async_trait;
use murk_model::{ApplyRequest, ApplyResponse, LocalPrefs, NetworkMap, ProbeResult};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Non-2xx daemon response. Display keeps the status code and the body
    /// text together because downstream classification matches on both.
    #[error("HTTP {status} {body}")]
    Status { status: u16, body: String },
    #[error("local API transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The mesh daemon's local API, as consumed by the sync layer.
#[async_trait]
pub trait MeshApi: Send + Sync {
    /// Query all reachable peers for their obfuscation profile. May fail
    /// wholesale (daemon unreachable) rather than per-peer.
    async fn probe_awg_peers(&self) -> Result<Vec<ProbeResult>, ClientError>;

    /// Read the local node's own preferences.
    async fn local_prefs(&self) -> Result<LocalPrefs, ClientError>;

    /// Instruct the daemon to fetch and apply the source peer's profile.
    async fn apply_awg_config(&self, req: &ApplyRequest) -> Result<ApplyResponse, ClientError>;

    /// The daemon's current network map.
    async fn network_map(&self) -> Result<NetworkMap, ClientError>;

    /// Bring the tunnel down.
    async fn stop_tunnel(&self) -> Result<(), ClientError>;

    /// Bring the tunnel up.
    async fn start_tunnel(&self) -> Result<(), ClientError>;
}
