//! Notification records and their persisted document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;
use zonal_core::Timestamp;

/// Unique identifier of a notification record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NotificationId(pub Uuid);

impl NotificationId {
    /// Mint a new time-ordered notification id.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category of a zone notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    /// Plain user-visible notification.
    Notification,
    /// A pending permission prompt.
    PermissionRequest,
    /// Answer to a permission prompt.
    PermissionResponse,
    /// A device asking to join the zone.
    ConnectionRequest,
    /// Synchronization status events.
    Sync,
}

/// One notification, as stored and as replicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique record id.
    pub id: NotificationId,
    /// Creation time.
    pub timestamp: Timestamp,
    /// Notification category.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Category-specific content.
    pub data: Value,
}

impl Notification {
    /// Create a fresh notification.
    pub fn new(kind: NotificationKind, data: Value) -> Self {
        Self {
            id: NotificationId::new(),
            timestamp: Timestamp::now(),
            kind,
            data,
        }
    }
}

/// Persisted notification list.
///
/// On-disk shape: `{ "notifications": { "<id>": Notification, ... },
/// "config": { ... } }`, with `config` holding per-handler delivery
/// settings owned by the surrounding system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationsDocument {
    /// All notifications by id.
    pub notifications: BTreeMap<NotificationId, Notification>,
    /// Handler configuration, opaque at this layer.
    #[serde(default)]
    pub config: Map<String, Value>,
}
