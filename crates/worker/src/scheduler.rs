//! Enqueue side of the scheduling protocol.

use std::sync::Arc;

use taskgrid_core::{KvStore, Result, TaskInstance, TaskerConfig};

/// Places instances in the ready queue or the waiting hash.
///
/// This is the only enqueue path: an instance with no outstanding
/// dependencies goes to the head of the ready list, anything else is parked
/// in the waiting hash under its UUID. The same routing re-applies during the
/// release protocol, which is what eventually promotes waiting instances.
pub struct Scheduler {
    config: Arc<TaskerConfig>,
    store: Arc<dyn KvStore>,
}

impl Scheduler {
    /// Create a new scheduler over the given KV backend.
    pub fn new(config: Arc<TaskerConfig>, store: Arc<dyn KvStore>) -> Self {
        Self { config, store }
    }

    /// Enqueue one instance according to its outstanding-dependency count.
    pub async fn schedule(&self, instance: &TaskInstance) -> Result<()> {
        let payload = instance.to_payload()?;

        if instance.is_ready() {
            tracing::debug!(
                task = %instance.task_id,
                uuid = %instance.uuid,
                "Enqueueing ready instance"
            );
            self.store
                .push_front(&self.config.ready_queue_key(), &payload)
                .await
        } else {
            tracing::debug!(
                task = %instance.task_id,
                uuid = %instance.uuid,
                pending = instance.dependency_count,
                "Parking instance in waiting hash"
            );
            self.store
                .hash_set(&self.config.waiting_hash_key(), &instance.uuid, &payload)
                .await
        }
    }
}
