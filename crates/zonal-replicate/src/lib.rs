//! # Zonal Replicate - action replication between zone peers
//!
//! Replicates discrete events ("actions") from the peer that created them
//! to every other known peer of the zone, at-least-once, surviving
//! restarts and transient disconnects:
//!
//! - [`ActionReplicator::add_action`] records a local event and schedules
//!   a debounced broadcast sweep,
//! - [`ActionReplicator::receive_pending_actions`] applies a delivered
//!   batch and acknowledges what applied,
//! - [`ActionReplicator::actions_acknowledged`] prunes the sender's
//!   pending sets,
//! - unacknowledged actions simply stay pending until a later sweep, which
//!   is the whole retry story.
//!
//! Higher-level features react to replicated actions through the
//! [`ActionProcessor`] capability; the replicator knows action types only
//! as routing keys. Transport is behind the [`MessageChannel`] trait.

mod action;
mod channel;
mod config;
mod error;
mod processor;
mod replicator;
mod wire;

pub use action::{Action, ActionsDocument, TrackingDocument, TrackingEntry};
pub use channel::{ChannelError, MessageChannel};
pub use config::ReplicatorConfig;
pub use error::ReplicateError;
pub use processor::ActionProcessor;
pub use replicator::ActionReplicator;
pub use wire::{Envelope, PropPayload, PROP_MESSAGE_TYPE};
