//! The notification manager.

use crate::notification::{Notification, NotificationKind, NotificationsDocument};
use crate::processor::NotificationProcessor;
use crate::NotificationId;
use async_lock::Mutex;
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use zonal_replicate::{ActionReplicator, ReplicateError};
use zonal_store::{PersistentStore, StoreError};

/// Action type under which notification changes replicate.
pub const NOTIFICATION_ACTION_TYPE: &str = "notification";

/// Failures surfaced by the notification manager.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The notification store failed to load or save.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Fanning the change out through the replicator failed.
    #[error(transparent)]
    Replicate(#[from] ReplicateError),
    /// A notification record could not be encoded for replication.
    #[error("failed to encode notification: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Owns the local notification list and replicates changes to the zone.
///
/// Local adds and deletes are persisted and then fanned out as
/// `("notification", "add" | "delete")` actions; remote changes arrive
/// through the [`NotificationProcessor`] registered on the replicator.
#[derive(Clone)]
pub struct NotificationManager {
    store: Arc<Mutex<PersistentStore<NotificationsDocument>>>,
    replicator: ActionReplicator,
}

impl NotificationManager {
    /// Create a manager persisting its list at `store_path` and fanning
    /// changes out through `replicator`.
    pub fn new(store_path: impl Into<PathBuf>, replicator: ActionReplicator) -> Self {
        Self {
            store: Arc::new(Mutex::new(PersistentStore::new(store_path))),
            replicator,
        }
    }

    /// Register this manager's processor so remote notification actions
    /// are applied to the local list.
    pub async fn register(&self) {
        self.replicator
            .register_action_processor(NOTIFICATION_ACTION_TYPE, Arc::new(self.processor()))
            .await;
    }

    /// Processor applying remote notification actions to the same list.
    pub fn processor(&self) -> NotificationProcessor {
        NotificationProcessor::new(self.store.clone())
    }

    /// Add a local notification and replicate it to the zone.
    pub async fn add_notification(
        &self,
        kind: NotificationKind,
        data: Value,
    ) -> Result<Notification, NotifyError> {
        let notification = Notification::new(kind, data);
        tracing::debug!(id = %notification.id, kind = ?kind, "adding notification");

        {
            let mut store = self.store.lock().await;
            let document = store.load()?;
            document
                .notifications
                .insert(notification.id, notification.clone());
            store.save()?;
        }

        let payload = serde_json::to_value(&notification)?;
        self.replicator
            .add_action(NOTIFICATION_ACTION_TYPE, "add", payload)
            .await?;
        Ok(notification)
    }

    /// Delete a notification locally and replicate the deletion.
    ///
    /// Returns whether the record existed. The action record referencing
    /// the notification stays in the actions store; deletion itself is
    /// just another replicated action.
    pub async fn delete_notification(&self, id: NotificationId) -> Result<bool, NotifyError> {
        let removed = {
            let mut store = self.store.lock().await;
            let document = store.load()?;
            let removed = document.notifications.remove(&id).is_some();
            if removed {
                store.save()?;
            }
            removed
        };

        if removed {
            self.replicator
                .add_action(NOTIFICATION_ACTION_TYPE, "delete", json!({ "id": id }))
                .await?;
        }
        Ok(removed)
    }

    /// Look up one notification.
    pub async fn get_notification(
        &self,
        id: NotificationId,
    ) -> Result<Option<Notification>, NotifyError> {
        let mut store = self.store.lock().await;
        Ok(store.load()?.notifications.get(&id).cloned())
    }

    /// All notifications, optionally restricted to one kind.
    pub async fn get_notifications(
        &self,
        kind: Option<NotificationKind>,
    ) -> Result<Vec<Notification>, NotifyError> {
        let mut store = self.store.lock().await;
        Ok(store
            .load()?
            .notifications
            .values()
            .filter(|notification| kind.map_or(true, |k| notification.kind == k))
            .cloned()
            .collect())
    }

    /// Handler configuration block of the list document.
    pub async fn config(&self) -> Result<Map<String, Value>, NotifyError> {
        let mut store = self.store.lock().await;
        Ok(store.load()?.config.clone())
    }
}
