//! Processor applying replicated notification actions.

use crate::notification::{Notification, NotificationsDocument};
use crate::NotificationId;
use async_lock::Mutex;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use zonal_replicate::{Action, ActionProcessor, ReplicateError};
use zonal_store::PersistentStore;

/// Applies `("notification", "add" | "delete")` actions to the local
/// notification list.
///
/// Both verbs are idempotent (insert-if-absent, remove-if-present):
/// redelivered actions re-invoke the processor, which must not duplicate
/// or fail on already-applied state.
pub struct NotificationProcessor {
    store: Arc<Mutex<PersistentStore<NotificationsDocument>>>,
}

impl NotificationProcessor {
    pub(crate) fn new(store: Arc<Mutex<PersistentStore<NotificationsDocument>>>) -> Self {
        Self { store }
    }

    async fn apply_add(&self, action: &Action) -> Result<(), ReplicateError> {
        let notification: Notification = serde_json::from_value(action.payload.clone())
            .map_err(|error| ReplicateError::Processor(format!("malformed notification: {error}")))?;

        let mut store = self.store.lock().await;
        let document = store.load()?;
        if document.notifications.contains_key(&notification.id) {
            tracing::debug!(id = %notification.id, "notification already present, skipping");
            return Ok(());
        }
        tracing::info!(id = %notification.id, "sync adding notification");
        document.notifications.insert(notification.id, notification);
        store.save()?;
        Ok(())
    }

    async fn apply_delete(&self, action: &Action) -> Result<(), ReplicateError> {
        #[derive(Deserialize)]
        struct DeletePayload {
            id: NotificationId,
        }
        let payload: DeletePayload = serde_json::from_value(action.payload.clone())
            .map_err(|error| ReplicateError::Processor(format!("malformed delete: {error}")))?;

        let mut store = self.store.lock().await;
        let document = store.load()?;
        if document.notifications.remove(&payload.id).is_some() {
            tracing::info!(id = %payload.id, "sync removing notification");
            store.save()?;
        }
        Ok(())
    }
}

#[async_trait]
impl ActionProcessor for NotificationProcessor {
    async fn handle(&self, action: &Action) -> Result<(), ReplicateError> {
        match action.action.as_str() {
            "add" => self.apply_add(action).await,
            "delete" => self.apply_delete(action).await,
            other => {
                tracing::warn!(verb = %other, "unknown notification action verb, ignoring");
                Ok(())
            }
        }
    }
}
