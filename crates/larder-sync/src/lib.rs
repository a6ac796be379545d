//! Larder Sync - Reconciliation between the local store and the remote service
//!
//! ## Key Components
//!
//! - [`SyncEngine`] - Push/pull reconciliation of one sync pass
//! - [`SyncTrigger`] - Mutual exclusion and scheduling of passes
//! - [`SyncSummary`] - What a completed pass did
//!
//! The engine drives the two driven ports of `larder-core`: it pushes
//! pending local mutations to the remote service, then pulls the
//! server's state and merges it back into the local store. The trigger
//! guarantees that at most one pass runs at a time and that a request
//! arriving mid-pass coalesces into exactly one follow-up pass.

pub mod engine;
pub mod trigger;

pub use engine::{SyncEngine, SyncError, SyncSummary};
pub use trigger::{SyncEvent, SyncTrigger};
