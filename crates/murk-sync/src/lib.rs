//! Murk Sync -- AWG profile discovery and apply orchestration.
//!
//! Four pieces:
//!   1. Discovery -- one probe pass becomes a per-host status index
//!   2. Resolution -- hostname to canonical node key via the network map
//!   3. Classification -- raw apply failures onto a closed message set
//!   4. Orchestration -- the resolve/request/bounce state machine

pub mod classify;
pub mod discovery;
pub mod orchestrator;
pub mod resolve;

pub use classify::{classify, classify_apply_failure, ClassifiedFailure, FailureCategory};
pub use discovery::{DiscoverySummary, PeerStatusIndex};
pub use orchestrator::{RejectReason, SyncOrchestrator, SyncOutcome, SyncPhase};
pub use resolve::resolve_node_key;
