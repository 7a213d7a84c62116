//! Murk Model -- obfuscation profile and local-API wire types.
//!
//! Pure data: serde mappings onto the daemon's JSON field names plus the
//! derived predicates the sync layer relies on. No I/O lives here.

pub mod netmap;
pub mod profile;
pub mod sync;

pub use netmap::{MeshNode, NetworkMap, NodeKey};
pub use profile::{MagicHeader, ObfuscationProfile};
pub use sync::{ApplyRequest, ApplyResponse, LocalPrefs, ProbeResult, SyncTimeout, TimeoutOutOfRange};
