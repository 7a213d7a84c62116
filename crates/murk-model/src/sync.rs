//! Probe and apply wire types for the AWG sync operations.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::netmap::NodeKey;
use crate::profile::ObfuscationProfile;

/// One peer's profile-probe outcome from `awg-sync-peers`.
///
/// `node_key` is a display hint only -- the daemon may truncate it. Mutating
/// calls must re-resolve the hostname against the network map to obtain the
/// canonical [`NodeKey`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    #[serde(rename = "nodeKey")]
    pub node_key: String,
    pub hostname: String,
    #[serde(default)]
    pub config: Option<ObfuscationProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeResult {
    /// True iff the probe returned a profile and no per-peer error.
    pub fn has_config(&self) -> bool {
        self.config.is_some() && self.error.is_none()
    }
}

/// Timeout bound for an apply attempt, in seconds. Valid range 1-60,
/// default 10. Out-of-range values are rejected where the number enters the
/// system (CLI flag, config file), never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct SyncTimeout(u64);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("timeout must be within {min}-{max} seconds, got {got}", min = SyncTimeout::MIN_SECS, max = SyncTimeout::MAX_SECS)]
pub struct TimeoutOutOfRange {
    pub got: u64,
}

impl SyncTimeout {
    pub const MIN_SECS: u64 = 1;
    pub const MAX_SECS: u64 = 60;
    pub const DEFAULT_SECS: u64 = 10;

    pub fn new(secs: u64) -> Result<Self, TimeoutOutOfRange> {
        if (Self::MIN_SECS..=Self::MAX_SECS).contains(&secs) {
            Ok(Self(secs))
        } else {
            Err(TimeoutOutOfRange { got: secs })
        }
    }

    pub fn secs(&self) -> u64 {
        self.0
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for SyncTimeout {
    fn default() -> Self {
        Self(Self::DEFAULT_SECS)
    }
}

impl TryFrom<u64> for SyncTimeout {
    type Error = TimeoutOutOfRange;

    fn try_from(secs: u64) -> Result<Self, Self::Error> {
        Self::new(secs)
    }
}

impl From<SyncTimeout> for u64 {
    fn from(t: SyncTimeout) -> u64 {
        t.0
    }
}

impl std::str::FromStr for SyncTimeout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let secs: u64 = s.parse().map_err(|_| format!("not a number: {s}"))?;
        Self::new(secs).map_err(|e| e.to_string())
    }
}

/// Request body for `awg-sync-apply`: fetch the source peer's profile and
/// apply it locally. Only a canonical key from the network map may be used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyRequest {
    #[serde(rename = "nodeKey")]
    pub node_key: NodeKey,
    pub timeout: SyncTimeout,
}

/// Daemon response to an apply request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResponse {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn default_true() -> bool {
    true
}

/// The slice of the local node's preferences this subsystem reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalPrefs {
    #[serde(rename = "AmneziaWG", default, skip_serializing_if = "Option::is_none")]
    pub obfuscation: Option<ObfuscationProfile>,
}
