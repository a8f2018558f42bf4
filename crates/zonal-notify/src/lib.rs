//! # Zonal Notify - replicated zone notification list
//!
//! Keeps one notification list consistent across the zone by riding on
//! the action replicator: local adds and deletes are persisted to the
//! list document and fanned out as `"notification"` actions, and a
//! registered [`NotificationProcessor`] applies the same actions arriving
//! from remote peers. Rendering notifications (tray, prompt, email,
//! dashboards) is a separate concern outside this crate.

mod manager;
mod notification;
mod processor;

pub use manager::{NotificationManager, NotifyError, NOTIFICATION_ACTION_TYPE};
pub use notification::{Notification, NotificationId, NotificationKind, NotificationsDocument};
pub use processor::NotificationProcessor;

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use zonal_core::PeerId;
    use zonal_replicate::{
        Action, ActionProcessor, ActionReplicator, ChannelError, Envelope, MessageChannel,
        ReplicatorConfig,
    };

    /// Channel double that accepts everything and records nothing.
    struct NullChannel;

    #[async_trait]
    impl MessageChannel for NullChannel {
        async fn send_message(&self, _envelope: Envelope, _to: &PeerId) -> Result<(), ChannelError> {
            Ok(())
        }

        async fn is_connected(&self, _peer: &PeerId) -> bool {
            false
        }
    }

    fn manager(dir: &tempfile::TempDir) -> (NotificationManager, ActionReplicator) {
        let replicator = ActionReplicator::new(
            PeerId::new("hub"),
            &ReplicatorConfig::new(dir.path()),
            Arc::new(NullChannel),
        );
        let manager =
            NotificationManager::new(dir.path().join("notifications.json"), replicator.clone());
        (manager, replicator)
    }

    #[tokio::test]
    async fn add_notification_persists_and_replicates() {
        let dir = tempfile::tempdir().unwrap();
        let (manager, replicator) = manager(&dir);
        let proxy = PeerId::new("proxy");
        replicator.send_pending_actions(&proxy).await.unwrap();

        let notification = manager
            .add_notification(NotificationKind::Notification, json!({"msg": "hi"}))
            .await
            .unwrap();

        assert_eq!(
            manager.get_notification(notification.id).await.unwrap(),
            Some(notification.clone())
        );
        // The change went into the replication pipeline for the known peer.
        let pending = replicator.pending_actions(&proxy).await.unwrap();
        assert_eq!(pending.len(), 1);
        let action = replicator.action(&pending[0]).await.unwrap().unwrap();
        assert_eq!(action.kind, NOTIFICATION_ACTION_TYPE);
        assert_eq!(action.action, "add");
    }

    #[tokio::test]
    async fn processor_applies_remote_add_idempotently() {
        let dir = tempfile::tempdir().unwrap();
        let (manager, _replicator) = manager(&dir);
        let processor = manager.processor();

        let notification = Notification::new(NotificationKind::Sync, json!({"state": "done"}));
        let action = Action::new(
            NOTIFICATION_ACTION_TYPE,
            "add",
            PeerId::new("proxy"),
            serde_json::to_value(&notification).unwrap(),
        );

        processor.handle(&action).await.unwrap();
        processor.handle(&action).await.unwrap();

        let all = manager.get_notifications(None).await.unwrap();
        assert_eq!(all, vec![notification]);
    }

    #[tokio::test]
    async fn processor_applies_remote_delete() {
        let dir = tempfile::tempdir().unwrap();
        let (manager, _replicator) = manager(&dir);
        let processor = manager.processor();

        let notification = manager
            .add_notification(NotificationKind::PermissionRequest, json!({"feature": "geo"}))
            .await
            .unwrap();

        let action = Action::new(
            NOTIFICATION_ACTION_TYPE,
            "delete",
            PeerId::new("proxy"),
            json!({"id": notification.id}),
        );
        processor.handle(&action).await.unwrap();

        assert!(manager
            .get_notification(notification.id)
            .await
            .unwrap()
            .is_none());
        // Deleting again is a no-op, not an error.
        processor.handle(&action).await.unwrap();
    }

    #[tokio::test]
    async fn notifications_filter_by_kind() {
        let dir = tempfile::tempdir().unwrap();
        let (manager, _replicator) = manager(&dir);

        manager
            .add_notification(NotificationKind::Notification, json!({"n": 1}))
            .await
            .unwrap();
        manager
            .add_notification(NotificationKind::Sync, json!({"n": 2}))
            .await
            .unwrap();

        let sync_only = manager
            .get_notifications(Some(NotificationKind::Sync))
            .await
            .unwrap();
        assert_eq!(sync_only.len(), 1);
        assert_eq!(sync_only[0].kind, NotificationKind::Sync);

        assert_eq!(manager.get_notifications(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_verbs_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let (manager, _replicator) = manager(&dir);
        let processor = manager.processor();

        let action = Action::new(
            NOTIFICATION_ACTION_TYPE,
            "escalate",
            PeerId::new("proxy"),
            json!({}),
        );
        processor.handle(&action).await.unwrap();
        assert!(manager.get_notifications(None).await.unwrap().is_empty());
    }
}
