//! Replication errors.

use crate::channel::ChannelError;
use zonal_store::StoreError;

/// Failures surfaced by the action replicator.
///
/// Transient conditions (unreachable peer, failing processor, stray
/// acknowledgement) are logged and handled locally; what propagates here
/// is essentially store trouble.
#[derive(Debug, thiserror::Error)]
pub enum ReplicateError {
    /// The actions or tracking store failed to load or save.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The message channel rejected a send.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// A registered processor failed while handling an ingested action.
    #[error("processor failure: {0}")]
    Processor(String),
}
