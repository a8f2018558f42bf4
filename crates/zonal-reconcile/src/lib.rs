//! # Zonal Reconcile - hash-diff reconciliation
//!
//! Stateless pure functions that bring two copies of a JSON-shaped value
//! into agreement without transferring the full object:
//!
//! 1. one side computes a per-field [`digest`],
//! 2. the other side [`diff`]s its own copy against that digest,
//! 3. [`resolve`] turns the diff into the content to transmit,
//! 4. [`merge`] applies the payload with a deterministic remote-wins
//!    conflict policy.
//!
//! The pipeline is used for bulk configuration objects (certificate sets,
//! revocation blobs, profile and preference fields, policy documents) but
//! is type-agnostic: it operates on any `serde_json::Value`. Digest maps
//! and diff sets are ephemeral, computed per call and never persisted.
//!
//! This is deliberately not a CRDT: merges are last-writer-wins per field
//! and not commutative for scalar conflicts, but they are idempotent.

mod diff;
mod digest;
mod merge;

pub use diff::{diff, resolve, DiffSet};
pub use digest::{digest, DigestMap};
pub use merge::{merge, MergePolicy};
