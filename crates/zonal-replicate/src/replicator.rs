//! At-least-once action replication.

use crate::action::{Action, ActionsDocument, TrackingDocument};
use crate::channel::MessageChannel;
use crate::config::ReplicatorConfig;
use crate::error::ReplicateError;
use crate::processor::ActionProcessor;
use crate::wire::{Envelope, PropPayload};
use async_lock::{Mutex, RwLock};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use zonal_core::{ActionId, PeerId};
use zonal_store::PersistentStore;

/// Replicates actions to every known peer of the zone.
///
/// Owns the actions and action-tracking stores exclusively; nothing else
/// mutates them. Cheap to clone; clones share the same stores, processor
/// registry and sweep guard.
#[derive(Clone)]
pub struct ActionReplicator {
    local_id: PeerId,
    actions: Arc<Mutex<PersistentStore<ActionsDocument>>>,
    tracking: Arc<Mutex<PersistentStore<TrackingDocument>>>,
    processors: Arc<RwLock<BTreeMap<String, Vec<Arc<dyn ActionProcessor>>>>>,
    channel: Arc<dyn MessageChannel>,
    sweep_scheduled: Arc<AtomicBool>,
}

impl ActionReplicator {
    /// Create a replicator identified as `local_id`, persisting under the
    /// configured data directory and delivering through `channel`.
    pub fn new(
        local_id: PeerId,
        config: &ReplicatorConfig,
        channel: Arc<dyn MessageChannel>,
    ) -> Self {
        Self {
            local_id,
            actions: Arc::new(Mutex::new(PersistentStore::new(config.actions_path()))),
            tracking: Arc::new(Mutex::new(PersistentStore::new(config.tracking_path()))),
            processors: Arc::new(RwLock::new(BTreeMap::new())),
            channel,
            sweep_scheduled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Identity of this replicator.
    pub fn local_id(&self) -> &PeerId {
        &self.local_id
    }

    /// Register an additional processor for every ingested action of
    /// `kind`. Multiple processors per kind are permitted; all run.
    pub async fn register_action_processor(
        &self,
        kind: impl Into<String>,
        processor: Arc<dyn ActionProcessor>,
    ) {
        let mut processors = self.processors.write().await;
        processors.entry(kind.into()).or_default().push(processor);
    }

    /// Record a local event for replication.
    ///
    /// The action is persisted, marked pending for every known peer other
    /// than its originator, its ack set is seeded with the originator
    /// pre-acknowledged, and a broadcast sweep is scheduled. No network
    /// i/o happens synchronously.
    pub async fn add_action(
        &self,
        kind: impl Into<String>,
        verb: impl Into<String>,
        payload: Value,
    ) -> Result<Action, ReplicateError> {
        let action = Action::new(kind, verb, self.local_id.clone(), payload);
        tracing::debug!(action = %action.id, kind = %action.kind, "recording local action");
        let stored = self.ingest(action).await?;
        Ok(stored)
    }

    /// Ingest a batch of actions delivered by `from`.
    ///
    /// Actions apply in array order. Each one is re-stamped to local
    /// ownership (originator untouched), persisted, marked pending for
    /// the other known peers, and handed to the registered processors for
    /// its type. An action whose apply fails is logged and left out of
    /// the acknowledgement batch, so the sender redelivers it on a later
    /// sweep. One ack envelope goes back for everything that applied.
    pub async fn receive_pending_actions(
        &self,
        from: &PeerId,
        actions: Vec<Action>,
    ) -> Result<(), ReplicateError> {
        let mut acks = Vec::new();
        for action in actions {
            let id = action.id;
            match self.apply_remote_action(action).await {
                Ok(()) => acks.push(id),
                Err(error) => {
                    tracing::error!(
                        action = %id,
                        from = %from,
                        error = %error,
                        "failed to apply replicated action, leaving it unacknowledged"
                    );
                }
            }
        }

        if !acks.is_empty() {
            let envelope = Envelope::acks(self.local_id.clone(), from.clone(), acks);
            self.send_envelope(envelope, from).await;
        }
        Ok(())
    }

    /// Send every action still pending for `to` as one batch, ascending
    /// by timestamp.
    ///
    /// An unknown peer is treated as brand new: its pending set is seeded
    /// with every action currently in the store (full resync) before the
    /// batch is collected.
    pub async fn send_pending_actions(&self, to: &PeerId) -> Result<(), ReplicateError> {
        let batch = {
            let mut actions_store = self.actions.lock().await;
            let mut tracking_store = self.tracking.lock().await;

            if !tracking_store.load()?.entities.contains_key(to) {
                tracing::info!(peer = %to, "update request from unknown peer, seeding full resync");
                let ids: Vec<ActionId> = actions_store.load()?.actions.keys().copied().collect();
                let entry = tracking_store
                    .load()?
                    .entities
                    .entry(to.clone())
                    .or_default();
                for id in ids {
                    entry.pending.insert(id, true);
                }
                tracking_store.save()?;
            }

            let actions_doc = actions_store.load()?;
            let mut batch: Vec<Action> = tracking_store
                .load()?
                .entities
                .get(to)
                .map(|entry| {
                    entry
                        .pending
                        .keys()
                        .filter_map(|id| actions_doc.actions.get(id).cloned())
                        .collect()
                })
                .unwrap_or_default();
            batch.sort_by_key(|action| action.timestamp);
            batch
        };

        if !batch.is_empty() {
            tracing::debug!(peer = %to, count = batch.len(), "sending pending actions");
            let envelope = Envelope::pending_actions(self.local_id.clone(), to.clone(), batch);
            self.send_envelope(envelope, to).await;
        }
        Ok(())
    }

    /// Process an acknowledgement batch from `from`.
    ///
    /// Each acknowledged id is cleared from the peer's pending set and
    /// recorded in the action's ack set. An ack from an unknown peer, or
    /// for an action this store does not hold, is logged and otherwise
    /// ignored.
    pub async fn actions_acknowledged(
        &self,
        from: &PeerId,
        ack_ids: &[ActionId],
    ) -> Result<(), ReplicateError> {
        let mut actions_store = self.actions.lock().await;
        let mut tracking_store = self.tracking.lock().await;
        let actions_doc = actions_store.load()?;
        let TrackingDocument { entities, acks } = tracking_store.load()?;

        let Some(entry) = entities.get_mut(from) else {
            tracing::error!(peer = %from, "acknowledgement from unknown peer");
            return Ok(());
        };

        for id in ack_ids {
            entry.pending.remove(id);
            if actions_doc.actions.contains_key(id) {
                acks.entry(*id).or_default().insert(from.clone(), true);
            } else {
                tracing::error!(action = %id, peer = %from, "acknowledgement for unknown action");
            }
        }

        tracking_store.save()?;
        Ok(())
    }

    /// Sweep: push pending actions to every currently-reachable peer.
    ///
    /// A peer that cannot be reached keeps its pending set untouched and
    /// is retried on the next sweep; there is no backoff and no eviction.
    pub async fn broadcast_actions(&self) -> Result<(), ReplicateError> {
        let peers: Vec<PeerId> = {
            let mut tracking_store = self.tracking.lock().await;
            tracking_store.load()?.entities.keys().cloned().collect()
        };

        for peer in peers {
            if !self.channel.is_connected(&peer).await {
                tracing::trace!(peer = %peer, "peer not connected, skipping");
                continue;
            }
            if let Err(error) = self.send_pending_actions(&peer).await {
                tracing::warn!(
                    peer = %peer,
                    error = %error,
                    "sending pending actions failed, leaving them pending"
                );
            }
        }
        Ok(())
    }

    /// Dispatch one received envelope to the matching operation.
    pub async fn handle_envelope(&self, envelope: Envelope) -> Result<(), ReplicateError> {
        match envelope.payload {
            PropPayload::ActionsReceivePending(actions) => {
                self.receive_pending_actions(&envelope.from, actions).await
            }
            PropPayload::ActionAck(ack_ids) => {
                self.actions_acknowledged(&envelope.from, &ack_ids).await
            }
        }
    }

    /// Peers currently known to the tracking store.
    pub async fn known_peers(&self) -> Result<Vec<PeerId>, ReplicateError> {
        let mut tracking_store = self.tracking.lock().await;
        Ok(tracking_store.load()?.entities.keys().cloned().collect())
    }

    /// Action ids still pending for `peer` (empty for unknown peers).
    pub async fn pending_actions(&self, peer: &PeerId) -> Result<Vec<ActionId>, ReplicateError> {
        let mut tracking_store = self.tracking.lock().await;
        Ok(tracking_store
            .load()?
            .entities
            .get(peer)
            .map(|entry| entry.pending.keys().copied().collect())
            .unwrap_or_default())
    }

    /// Look up a stored action by id.
    pub async fn action(&self, id: &ActionId) -> Result<Option<Action>, ReplicateError> {
        let mut actions_store = self.actions.lock().await;
        Ok(actions_store.load()?.actions.get(id).cloned())
    }

    async fn apply_remote_action(&self, action: Action) -> Result<(), ReplicateError> {
        let stored = self.ingest(action).await?;
        self.dispatch(&stored).await
    }

    /// Shared ingestion path for local and remote actions: persist under
    /// local ownership, flag the other peers, seed the ack set, and ask
    /// for a sweep.
    async fn ingest(&self, mut action: Action) -> Result<Action, ReplicateError> {
        action.owner = self.local_id.clone();

        {
            let mut actions_store = self.actions.lock().await;
            let actions_doc = actions_store.load()?;
            actions_doc.actions.insert(action.id, action.clone());
            actions_store.save()?;
        }

        {
            let mut tracking_store = self.tracking.lock().await;
            let tracking_doc = tracking_store.load()?;
            for (peer, entry) in tracking_doc.entities.iter_mut() {
                if *peer != action.originator {
                    entry.pending.insert(action.id, true);
                }
            }
            tracking_doc.acks.insert(
                action.id,
                BTreeMap::from([(action.originator.clone(), true)]),
            );
            tracking_store.save()?;
        }

        self.request_broadcast();
        Ok(action)
    }

    async fn dispatch(&self, action: &Action) -> Result<(), ReplicateError> {
        let handlers: Vec<Arc<dyn ActionProcessor>> = {
            let processors = self.processors.read().await;
            processors.get(&action.kind).cloned().unwrap_or_default()
        };

        if handlers.is_empty() {
            tracing::info!(kind = %action.kind, "no processors registered for action type");
            return Ok(());
        }
        for handler in handlers {
            handler.handle(action).await?;
        }
        Ok(())
    }

    /// Request a broadcast sweep. Requests arriving before the sweep task
    /// starts coalesce into it; the sweep runs off the calling task so
    /// callers never block on delivery.
    ///
    /// The guard is released as soon as the sweep task begins, so a
    /// request arriving while a sweep is mid-flight schedules a fresh one
    /// rather than being dropped. Overlapping sweeps are harmless: they
    /// only read the stores and send.
    fn request_broadcast(&self) {
        if self
            .sweep_scheduled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        let replicator = self.clone();
        tokio::spawn(async move {
            replicator.sweep_scheduled.store(false, Ordering::SeqCst);
            if let Err(error) = replicator.broadcast_actions().await {
                tracing::warn!(error = %error, "broadcast sweep failed");
            }
        });
    }

    async fn send_envelope(&self, envelope: Envelope, to: &PeerId) {
        if let Err(error) = self.channel.send_message(envelope, to).await {
            tracing::warn!(peer = %to, error = %error, "message send failed");
        }
    }
}
