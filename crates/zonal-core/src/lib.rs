//! # Zonal Core - shared types for personal-zone synchronization
//!
//! Identifier newtypes, the replication timestamp, and the content-hash
//! fingerprint used by the reconciliation protocol. Everything here is
//! plain data; the protocols live in `zonal-replicate` and
//! `zonal-reconcile`.

pub mod hash;
pub mod identifiers;
pub mod time;

pub use hash::{content_hash, hash_value, ContentHash};
pub use identifiers::{ActionId, PeerId};
pub use time::Timestamp;
