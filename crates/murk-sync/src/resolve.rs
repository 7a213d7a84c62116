//! Identity resolution -- hostname to canonical node key.
//!
//! Probe results carry a possibly-truncated key, so every mutating call
//! re-resolves the hostname against the network map first.

use murk_model::{NetworkMap, NodeKey};

/// Find the canonical key for a hostname in the network map.
///
/// Searches the local node first, then peers in map order, matching on
/// display name or computed name. When more than one node answers to the
/// same hostname the first match wins; this is a documented convention,
/// not an error.
pub fn resolve_node_key<'a>(map: &'a NetworkMap, hostname: &str) -> Option<&'a NodeKey> {
    let node = map.nodes().find(|n| n.matches_hostname(hostname));
    match node {
        Some(node) => {
            tracing::debug!(hostname, key = %node.key, "resolve: canonical key found");
            Some(&node.key)
        }
        None => {
            tracing::debug!(hostname, "resolve: no node matches hostname");
            None
        }
    }
}
