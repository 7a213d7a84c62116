//! HTTP implementation of [`MeshApi`] against the daemon's local API.
//!
//! Reads are GET, actions are POST. Every request carries
//! `Authorization: Bearer <token>`; non-2xx responses surface as
//! [`ClientError::Status`] with the body text preserved.

use async_trait::async_trait;
use murk_model::{ApplyRequest, ApplyResponse, LocalPrefs, NetworkMap, ProbeResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{ClientError, MeshApi};

const AWG_SYNC_PEERS: &str = "/localapi/v0/awg-sync-peers";
const AWG_SYNC_APPLY: &str = "/localapi/v0/awg-sync-apply";
const PREFS: &str = "/localapi/v0/prefs";
const NETMAP: &str = "/localapi/v0/netmap";
const TUNNEL_DOWN: &str = "/localapi/v0/tunnel/down";
const TUNNEL_UP: &str = "/localapi/v0/tunnel/up";

/// Client for the daemon's local API.
#[derive(Clone)]
pub struct LocalApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl LocalApiClient {
    /// `base_url` is scheme + authority, e.g. `http://127.0.0.1:9480`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        tracing::debug!(path, "localapi: GET");
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(Self::checked(resp).await?.json::<T>().await?)
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        tracing::debug!(path, "localapi: POST");
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Ok(Self::checked(resp).await?.json::<T>().await?)
    }

    async fn post_unit(&self, path: &str) -> Result<(), ClientError> {
        tracing::debug!(path, "localapi: POST");
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::checked(resp).await?;
        Ok(())
    }

    async fn checked(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), body, "localapi: request failed");
        Err(ClientError::Status {
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }
}

#[async_trait]
impl MeshApi for LocalApiClient {
    async fn probe_awg_peers(&self) -> Result<Vec<ProbeResult>, ClientError> {
        self.post_json(AWG_SYNC_PEERS, &serde_json::json!({})).await
    }

    async fn local_prefs(&self) -> Result<LocalPrefs, ClientError> {
        self.get_json(PREFS).await
    }

    async fn apply_awg_config(&self, req: &ApplyRequest) -> Result<ApplyResponse, ClientError> {
        self.post_json(AWG_SYNC_APPLY, req).await
    }

    async fn network_map(&self) -> Result<NetworkMap, ClientError> {
        self.get_json(NETMAP).await
    }

    async fn stop_tunnel(&self) -> Result<(), ClientError> {
        self.post_unit(TUNNEL_DOWN).await
    }

    async fn start_tunnel(&self) -> Result<(), ClientError> {
        self.post_unit(TUNNEL_UP).await
    }
}
