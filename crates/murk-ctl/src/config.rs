//! Configuration for murk-ctl.
//! Parsed from ~/.murk/config.toml.

use murk_model::SyncTimeout;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CtlConfig {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub sync: SyncSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    /// Address of the daemon's local API.
    #[serde(default = "default_api_addr")]
    pub addr: String,
    /// Path to the daemon's bearer token file.
    #[serde(default = "default_token_file")]
    pub token_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSection {
    /// Apply timeout in seconds (1-60).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Pause between tunnel stop and start when bouncing.
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            addr: default_api_addr(),
            token_file: default_token_file(),
        }
    }
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            settle_secs: default_settle_secs(),
        }
    }
}

// Default value functions
fn default_api_addr() -> String {
    "127.0.0.1:9480".into()
}
fn default_token_file() -> String {
    "~/.murk/api-token".into()
}
fn default_timeout_secs() -> u64 {
    SyncTimeout::DEFAULT_SECS
}
fn default_settle_secs() -> u64 {
    2
}

impl CtlConfig {
    /// Load config from file, or create default if missing. A timeout
    /// outside 1-60 is rejected here, not clamped.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str::<CtlConfig>(&content)?
        } else {
            Self::default()
        };
        config.sync_timeout()?;
        Ok(config)
    }

    pub fn sync_timeout(&self) -> Result<SyncTimeout, murk_model::TimeoutOutOfRange> {
        SyncTimeout::new(self.sync.timeout_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.sync.settle_secs)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.api.addr)
    }
}
