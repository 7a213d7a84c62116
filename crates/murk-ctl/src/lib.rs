//! Murk Ctl -- library crate for the `murk` binary.
//!
//! Holds config parsing and the small filesystem helpers so the
//! integration tests can drive the same wiring as `main`.

pub mod config;

use std::path::{Path, PathBuf};

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Read the daemon's bearer token. A missing file is not an error: the
/// daemon may be running without auth, and it will reject us if not.
pub fn load_token(path: &Path) -> anyhow::Result<String> {
    if path.exists() {
        Ok(std::fs::read_to_string(path)?.trim().to_string())
    } else {
        tracing::warn!(path = %path.display(), "token file missing, sending empty token");
        Ok(String::new())
    }
}
