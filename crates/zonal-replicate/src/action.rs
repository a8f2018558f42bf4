//! The replicated action record and its persisted documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use zonal_core::{ActionId, PeerId, Timestamp};

/// An atomic, replicated event record.
///
/// Actions are immutable once acknowledged; `originator` is fixed at
/// creation, while `owner` is re-stamped to whichever peer currently
/// holds a durable copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Globally unique, time-ordered identifier.
    pub id: ActionId,
    /// Category used for processor dispatch (e.g. `"notification"`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Verb within the category (e.g. `"add"`, `"delete"`).
    pub action: String,
    /// Peer currently responsible for delivering this action.
    pub owner: PeerId,
    /// Peer that first created the action. Never overwritten.
    pub originator: PeerId,
    /// Opaque, type-specific data. Interpreted only by registered
    /// processors, never by the replicator.
    pub payload: Value,
    /// Creation time; used only for delivery ordering.
    pub timestamp: Timestamp,
}

impl Action {
    /// Create a fresh local action owned and originated by `creator`.
    pub fn new(
        kind: impl Into<String>,
        action: impl Into<String>,
        creator: PeerId,
        payload: Value,
    ) -> Self {
        Self {
            id: ActionId::new(),
            kind: kind.into(),
            action: action.into(),
            owner: creator.clone(),
            originator: creator,
            payload,
            timestamp: Timestamp::now(),
        }
    }
}

/// Persisted document holding every known action, keyed by id.
///
/// On-disk shape: `{ "actions": { "<id>": Action, ... } }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionsDocument {
    /// All known actions by id.
    pub actions: BTreeMap<ActionId, Action>,
}

/// Per-peer replication cursor: the set of action ids believed
/// undelivered to that peer.
///
/// An entry is created on first contact with a previously-unknown peer,
/// at which point every existing action is marked pending (full resync).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackingEntry {
    /// Action ids not yet acknowledged by this peer.
    pub pending: BTreeMap<ActionId, bool>,
}

/// Persisted replication bookkeeping.
///
/// On-disk shape:
/// `{ "entities": { "<peerId>": { "pending": { "<actionId>": true } } },
///    "acks": { "<actionId>": { "<peerId>": true } } }`.
///
/// Ack sets are seeded with the originator pre-acknowledged and are never
/// pruned, even once every known peer has acknowledged; retention is left
/// to the surrounding system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackingDocument {
    /// Per-peer pending sets.
    pub entities: BTreeMap<PeerId, TrackingEntry>,
    /// Per-action acknowledgement sets.
    pub acks: BTreeMap<ActionId, BTreeMap<PeerId, bool>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_action_is_owned_and_originated_by_its_creator() {
        let creator = PeerId::new("hub");
        let action = Action::new("notification", "add", creator.clone(), json!({"msg": "hi"}));
        assert_eq!(action.owner, creator);
        assert_eq!(action.originator, creator);
    }

    #[test]
    fn action_serializes_with_the_wire_field_names() {
        let action = Action::new("notification", "add", PeerId::new("hub"), json!({}));
        let encoded = serde_json::to_value(&action).unwrap();
        assert_eq!(encoded["type"], "notification");
        assert_eq!(encoded["action"], "add");
        assert_eq!(encoded["owner"], "hub");
        assert_eq!(encoded["originator"], "hub");
    }

    #[test]
    fn tracking_document_matches_the_persisted_layout() {
        let mut doc = TrackingDocument::default();
        let peer = PeerId::new("proxy");
        let id = ActionId::new();
        doc.entities
            .entry(peer.clone())
            .or_default()
            .pending
            .insert(id, true);
        doc.acks.entry(id).or_default().insert(peer, true);

        let encoded = serde_json::to_value(&doc).unwrap();
        assert_eq!(encoded["entities"]["proxy"]["pending"][id.to_string()], true);
        assert_eq!(encoded["acks"][id.to_string()]["proxy"], true);
    }
}
