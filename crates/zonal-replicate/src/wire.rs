//! Replication wire envelope.
//!
//! What this layer hands to (and accepts from) the message channel
//! collaborator. The framing and transport underneath are external.

use crate::action::Action;
use serde::{Deserialize, Serialize};
use zonal_core::{ActionId, PeerId};

/// Envelope `type` marker for replication property messages.
pub const PROP_MESSAGE_TYPE: &str = "prop";

/// Payload of a replication envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message")]
pub enum PropPayload {
    /// A batch of pending actions, in ascending timestamp order.
    #[serde(rename = "actionsReceivePending")]
    ActionsReceivePending(Vec<Action>),
    /// Acknowledgement of applied action ids.
    #[serde(rename = "actionAck")]
    ActionAck(Vec<ActionId>),
}

/// One replication message between two zone peers.
///
/// Wire shape:
/// `{ "type": "prop", "from": .., "to": ..,
///    "payload": { "status": .., "message": .. } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Always [`PROP_MESSAGE_TYPE`].
    #[serde(rename = "type")]
    pub kind: String,
    /// Sending peer.
    pub from: PeerId,
    /// Destination peer.
    pub to: PeerId,
    /// The replication payload.
    pub payload: PropPayload,
}

impl Envelope {
    /// Build a pending-actions batch envelope.
    pub fn pending_actions(from: PeerId, to: PeerId, actions: Vec<Action>) -> Self {
        Self {
            kind: PROP_MESSAGE_TYPE.to_owned(),
            from,
            to,
            payload: PropPayload::ActionsReceivePending(actions),
        }
    }

    /// Build an acknowledgement envelope.
    pub fn acks(from: PeerId, to: PeerId, ack_ids: Vec<ActionId>) -> Self {
        Self {
            kind: PROP_MESSAGE_TYPE.to_owned(),
            from,
            to,
            payload: PropPayload::ActionAck(ack_ids),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pending_actions_envelope_carries_the_prop_status() {
        let envelope = Envelope::pending_actions(PeerId::new("hub"), PeerId::new("proxy"), vec![]);
        let encoded = serde_json::to_value(&envelope).unwrap();
        assert_eq!(encoded["type"], "prop");
        assert_eq!(encoded["payload"]["status"], "actionsReceivePending");
        assert_eq!(encoded["payload"]["message"], json!([]));
    }

    #[test]
    fn ack_envelope_round_trips() {
        let id = ActionId::new();
        let envelope = Envelope::acks(PeerId::new("proxy"), PeerId::new("hub"), vec![id]);
        let encoded = serde_json::to_string(&envelope).unwrap();
        let decoded: Envelope = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, envelope);
        assert_eq!(decoded.payload, PropPayload::ActionAck(vec![id]));
    }
}
