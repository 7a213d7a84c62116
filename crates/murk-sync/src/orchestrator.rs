//! Apply orchestration -- the sync-from-peer state machine.
//!
//! `Idle → Resolving → Requesting → Succeeded | Failed`, then back to
//! `Idle`. The orchestrator owns the per-host status index, the in-progress
//! marker (the phase itself), the cached local-profile flag, and the single
//! most-recent status message. All shared state is replaced wholesale,
//! never mutated in place.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use murk_client::MeshApi;
use murk_model::{ApplyRequest, SyncTimeout};
use tokio::sync::RwLock;

use crate::classify::{classify_apply_failure, ClassifiedFailure};
use crate::discovery::PeerStatusIndex;
use crate::resolve::resolve_node_key;

/// The explicit state of a sync attempt. Carrying the hostname in every
/// non-idle variant keeps "in progress with no target" unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncPhase {
    #[default]
    Idle,
    Resolving {
        hostname: String,
    },
    Requesting {
        hostname: String,
    },
    Succeeded {
        hostname: String,
    },
    Failed {
        hostname: String,
    },
}

impl SyncPhase {
    /// The hostname currently being synced, while an attempt is in flight.
    pub fn in_progress(&self) -> Option<&str> {
        match self {
            SyncPhase::Resolving { hostname } | SyncPhase::Requesting { hostname } => {
                Some(hostname)
            }
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SyncPhase::Idle => "idle",
            SyncPhase::Resolving { .. } => "resolving",
            SyncPhase::Requesting { .. } => "requesting",
            SyncPhase::Succeeded { .. } => "succeeded",
            SyncPhase::Failed { .. } => "failed",
        }
    }
}

/// Why a sync attempt ended before any request was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Hostname absent from the probe-status cache.
    UnknownPeer,
    /// Cached probe result carries no profile.
    MissingProfile,
    /// The network map is unavailable or has no node for the hostname.
    IdentityUnresolved,
}

/// Terminal outcome of one sync attempt. Exactly one human-readable
/// message per outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Profile applied and the tunnel bounced.
    Applied { message: String },
    /// Profile applied but the bounce sequence failed afterwards.
    AppliedReconnectFailed { message: String },
    /// Rejected locally; no request reached the remote peer.
    NotAttempted {
        reason: RejectReason,
        message: String,
    },
    /// The apply request failed; routed through the classifier.
    Failed { failure: ClassifiedFailure },
}

impl SyncOutcome {
    /// Whether the profile was applied (even if the reconnect failed).
    pub fn applied(&self) -> bool {
        matches!(
            self,
            SyncOutcome::Applied { .. } | SyncOutcome::AppliedReconnectFailed { .. }
        )
    }

    pub fn message(&self) -> &str {
        match self {
            SyncOutcome::Applied { message }
            | SyncOutcome::AppliedReconnectFailed { message }
            | SyncOutcome::NotAttempted { message, .. } => message,
            SyncOutcome::Failed { failure } => &failure.message,
        }
    }
}

/// Drives discovery and sync-from-peer against the daemon's local API.
pub struct SyncOrchestrator<A: MeshApi> {
    api: A,
    /// Pause between tunnel stop and start in the bounce sequence.
    settle: Duration,
    phase: RwLock<SyncPhase>,
    index: RwLock<PeerStatusIndex>,
    status_message: RwLock<Option<String>>,
    local_has_profile: AtomicBool,
}

impl<A: MeshApi> SyncOrchestrator<A> {
    pub const DEFAULT_SETTLE: Duration = Duration::from_secs(2);

    pub fn new(api: A) -> Self {
        Self::with_settle(api, Self::DEFAULT_SETTLE)
    }

    pub fn with_settle(api: A, settle: Duration) -> Self {
        Self {
            api,
            settle,
            phase: RwLock::new(SyncPhase::Idle),
            index: RwLock::new(PeerStatusIndex::default()),
            status_message: RwLock::new(None),
            local_has_profile: AtomicBool::new(false),
        }
    }

    // ------------------------------------------------------------------
    // Discovery
    // ------------------------------------------------------------------

    /// Run one discovery pass, replacing both indices wholesale. Never
    /// fails past this point: a wholesale probe error degrades the index to
    /// empty and is folded into the returned message.
    pub async fn refresh_peers(&self) -> String {
        match self.api.probe_awg_peers().await {
            Ok(probe) => {
                let index = PeerStatusIndex::build(probe);
                let summary = index.summary();
                tracing::info!(
                    queried = summary.queried,
                    with_profile = summary.with_profile,
                    "discovery: index rebuilt"
                );
                *self.index.write().await = index;
                let message = summary.to_string();
                self.set_message(message.clone()).await;
                message
            }
            Err(e) => {
                tracing::warn!(error = %e, "discovery: probe failed");
                *self.index.write().await = PeerStatusIndex::default();
                let message = format!("Failed to get AWG config info: {e}");
                self.set_message(message.clone()).await;
                message
            }
        }
    }

    /// Refresh the cached local-profile flag from the daemon's prefs.
    /// Degrades to `false` when the prefs are unreadable.
    pub async fn refresh_local_status(&self) -> bool {
        let has = match self.api.local_prefs().await {
            Ok(prefs) => prefs
                .obfuscation
                .is_some_and(|p| p.has_non_default_values()),
            Err(e) => {
                tracing::warn!(error = %e, "sync: local prefs unavailable");
                false
            }
        };
        self.local_has_profile.store(has, Ordering::Relaxed);
        has
    }

    // ------------------------------------------------------------------
    // Exposed surface
    // ------------------------------------------------------------------

    pub fn local_has_profile(&self) -> bool {
        self.local_has_profile.load(Ordering::Relaxed)
    }

    pub async fn peer_has_profile(&self, hostname: &str) -> Option<bool> {
        self.index.read().await.has_profile(hostname)
    }

    pub async fn peer_result(&self, hostname: &str) -> Option<murk_model::ProbeResult> {
        self.index.read().await.result(hostname).cloned()
    }

    /// Snapshot of the current pass's indices.
    pub async fn status_index(&self) -> PeerStatusIndex {
        self.index.read().await.clone()
    }

    /// Hostname of the in-flight sync attempt, if any.
    pub async fn in_progress(&self) -> Option<String> {
        self.phase.read().await.in_progress().map(str::to_string)
    }

    pub async fn status_message(&self) -> Option<String> {
        self.status_message.read().await.clone()
    }

    pub async fn clear_status_message(&self) {
        *self.status_message.write().await = None;
    }

    // ------------------------------------------------------------------
    // Sync-from-peer
    // ------------------------------------------------------------------

    /// Run the full state machine for one hostname. Always terminates in
    /// `Idle` with the marker cleared, whatever happens in between;
    /// re-invoking for the same hostname afterwards is always permitted.
    pub async fn sync_from_peer(
        &self,
        hostname: &str,
        timeout: Option<SyncTimeout>,
    ) -> SyncOutcome {
        let timeout = timeout.unwrap_or_default();
        let outcome = self.drive(hostname, timeout).await;

        let terminal = if outcome.applied() {
            SyncPhase::Succeeded {
                hostname: hostname.to_string(),
            }
        } else {
            SyncPhase::Failed {
                hostname: hostname.to_string(),
            }
        };
        self.set_phase(terminal).await;
        self.set_message(outcome.message().to_string()).await;
        self.set_phase(SyncPhase::Idle).await;

        outcome
    }

    async fn drive(&self, hostname: &str, timeout: SyncTimeout) -> SyncOutcome {
        self.set_phase(SyncPhase::Resolving {
            hostname: hostname.to_string(),
        })
        .await;

        // Consult the probe cache before anything touches the network.
        let cached = self.index.read().await.result(hostname).cloned();
        let Some(peer) = cached else {
            return SyncOutcome::NotAttempted {
                reason: RejectReason::UnknownPeer,
                message: format!("Peer {hostname} AWG config info not found"),
            };
        };
        if !peer.has_config() {
            return SyncOutcome::NotAttempted {
                reason: RejectReason::MissingProfile,
                message: format!("Peer {hostname} has no AWG config"),
            };
        }

        // The probe's key may be truncated; only the network map's key
        // crosses the trust boundary.
        let node_key = match self.api.network_map().await {
            Ok(map) => resolve_node_key(&map, hostname).cloned(),
            Err(e) => {
                tracing::warn!(hostname, error = %e, "sync: network map unavailable");
                None
            }
        };
        let Some(node_key) = node_key else {
            return SyncOutcome::NotAttempted {
                reason: RejectReason::IdentityUnresolved,
                message: format!("Cannot find full node key for peer {hostname}"),
            };
        };
        tracing::debug!(
            hostname,
            probe_key = peer.node_key,
            canonical = %node_key,
            "sync: identity resolved"
        );

        self.set_phase(SyncPhase::Requesting {
            hostname: hostname.to_string(),
        })
        .await;

        let request = ApplyRequest { node_key, timeout };
        let raw_failure = match tokio::time::timeout(
            timeout.duration(),
            self.api.apply_awg_config(&request),
        )
        .await
        {
            Ok(Ok(resp)) if resp.success => {
                tracing::info!(hostname, "sync: profile applied, bouncing tunnel");
                return self.bounce_tunnel(hostname).await;
            }
            Ok(Ok(resp)) => resp
                .message
                .unwrap_or_else(|| "apply rejected by daemon".into()),
            Ok(Err(e)) => e.to_string(),
            Err(_) => "timeout waiting for apply response".into(),
        };

        let failure = classify_apply_failure(&raw_failure, hostname);
        tracing::warn!(
            hostname,
            category = ?failure.category,
            raw = raw_failure,
            "sync: apply failed"
        );
        SyncOutcome::Failed { failure }
    }

    /// Stop the tunnel, wait the settle interval, start it again. The
    /// order is fixed; the request timeout does not apply here.
    async fn bounce_tunnel(&self, hostname: &str) -> SyncOutcome {
        if let Err(e) = self.api.stop_tunnel().await {
            tracing::error!(error = %e, "sync: tunnel stop failed after apply");
            return SyncOutcome::AppliedReconnectFailed {
                message: format!("AWG config applied but reconnect failed: {e}"),
            };
        }
        tokio::time::sleep(self.settle).await;
        if let Err(e) = self.api.start_tunnel().await {
            tracing::error!(error = %e, "sync: tunnel start failed after apply");
            return SyncOutcome::AppliedReconnectFailed {
                message: format!("AWG config applied but reconnect failed: {e}"),
            };
        }
        tracing::info!(hostname, "sync: tunnel bounced");
        SyncOutcome::Applied {
            message: format!("AWG config from {hostname} applied successfully"),
        }
    }

    async fn set_phase(&self, next: SyncPhase) {
        let mut phase = self.phase.write().await;
        tracing::debug!(from = phase.name(), to = next.name(), "sync: phase");
        *phase = next;
    }

    async fn set_message(&self, message: String) {
        *self.status_message.write().await = Some(message);
    }
}
