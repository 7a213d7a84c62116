//! Discovery aggregation -- per-host indices built from one probe pass.
//!
//! Each pass replaces the previous one wholesale; nothing is merged.

use murk_model::ProbeResult;
use std::collections::HashMap;

/// Counts for one discovery pass, taken over the raw probe list (before
/// duplicate hostnames collapse into the index).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoverySummary {
    pub queried: usize,
    pub with_profile: usize,
}

impl std::fmt::Display for DiscoverySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.queried == 0 {
            write!(f, "No peers found")
        } else if self.with_profile > 0 {
            write!(
                f,
                "Found {}/{} peers with AWG config",
                self.with_profile, self.queried
            )
        } else {
            write!(f, "Checked {} peers, no AWG config found", self.queried)
        }
    }
}

/// The two derived mappings of a discovery pass: hostname to has-profile
/// and hostname to the full probe result.
#[derive(Debug, Clone, Default)]
pub struct PeerStatusIndex {
    status: HashMap<String, bool>,
    results: HashMap<String, ProbeResult>,
    summary: DiscoverySummary,
}

impl PeerStatusIndex {
    /// Build both indices in a single pass. A hostname appearing more than
    /// once is an overwrite: the last occurrence wins.
    pub fn build(probe: Vec<ProbeResult>) -> Self {
        let summary = DiscoverySummary {
            queried: probe.len(),
            with_profile: probe.iter().filter(|r| r.has_config()).count(),
        };

        let mut status = HashMap::with_capacity(probe.len());
        let mut results = HashMap::with_capacity(probe.len());
        for result in probe {
            status.insert(result.hostname.clone(), result.has_config());
            results.insert(result.hostname.clone(), result);
        }

        Self {
            status,
            results,
            summary,
        }
    }

    /// Has-profile flag for a host, `None` when the host was not probed.
    pub fn has_profile(&self, hostname: &str) -> Option<bool> {
        self.status.get(hostname).copied()
    }

    /// Full probe result for a host.
    pub fn result(&self, hostname: &str) -> Option<&ProbeResult> {
        self.results.get(hostname)
    }

    /// Hostname → has-profile mapping for display layers.
    pub fn statuses(&self) -> &HashMap<String, bool> {
        &self.status
    }

    /// Hostname → full probe result mapping.
    pub fn results(&self) -> &HashMap<String, ProbeResult> {
        &self.results
    }

    pub fn summary(&self) -> DiscoverySummary {
        self.summary
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
