//! Action processor capability.

use crate::action::Action;
use crate::error::ReplicateError;
use async_trait::async_trait;

/// Handler invoked for every ingested action of a registered type.
///
/// Processors receive a read reference and must not touch the delivery
/// bookkeeping (`id`, `originator`); only the replicator advances
/// replication state. A returned error leaves the action unacknowledged
/// so the sender redelivers it later; redelivery re-invokes the
/// processor, which must therefore be idempotent.
#[async_trait]
pub trait ActionProcessor: Send + Sync {
    /// Apply one ingested action.
    async fn handle(&self, action: &Action) -> Result<(), ReplicateError>;
}
