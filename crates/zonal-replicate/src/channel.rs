//! Message channel capability.
//!
//! Transport, framing and session security live outside this crate; the
//! replicator only needs to hand an envelope to a peer and ask whether a
//! peer is currently reachable.

use crate::wire::Envelope;
use async_trait::async_trait;
use zonal_core::PeerId;

/// Failures reported by the message channel collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The destination peer is not currently reachable.
    #[error("peer {0} is unreachable")]
    Unreachable(PeerId),
    /// The underlying transport failed while sending.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Outbound message channel between zone peers.
///
/// A send that cannot reach its peer must fail fast; the replicator
/// catches the failure, logs it, and leaves the affected actions pending
/// for the next sweep.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Deliver one envelope to `to`.
    async fn send_message(&self, envelope: Envelope, to: &PeerId) -> Result<(), ChannelError>;

    /// Whether `peer` is currently connected.
    async fn is_connected(&self, peer: &PeerId) -> bool;
}
