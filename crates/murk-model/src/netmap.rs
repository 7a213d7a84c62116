//! Network-map types -- the canonical peer identities the daemon knows.

use serde::{Deserialize, Serialize};

/// The full, stable node key from the network map.
///
/// Distinct from the possibly-truncated key string in a probe result: only
/// values of this type cross the trust boundary in an apply request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(String);

impl NodeKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One node in the mesh as reported by the daemon's network map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshNode {
    #[serde(rename = "Key")]
    pub key: NodeKey,
    #[serde(rename = "Name")]
    pub name: String,
    /// Short name derived by the mesh from the DNS name; absent on some
    /// daemon versions.
    #[serde(rename = "ComputedName", default, skip_serializing_if = "Option::is_none")]
    pub computed_name: Option<String>,
}

impl MeshNode {
    /// Whether this node answers to the given hostname (display name or
    /// computed name).
    pub fn matches_hostname(&self, hostname: &str) -> bool {
        self.computed_name.as_deref() == Some(hostname) || self.name == hostname
    }
}

/// The daemon's current network map: the local node plus all known peers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkMap {
    #[serde(rename = "SelfNode")]
    pub self_node: MeshNode,
    #[serde(rename = "Peers", default)]
    pub peers: Vec<MeshNode>,
}

impl NetworkMap {
    /// All nodes in resolution order: the local node first, then peers in
    /// the order the daemon reported them.
    pub fn nodes(&self) -> impl Iterator<Item = &MeshNode> {
        std::iter::once(&self.self_node).chain(self.peers.iter())
    }
}
