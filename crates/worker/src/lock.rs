//! Per-dependent locks for the release protocol.

use std::sync::Arc;
use std::time::Duration;

use taskgrid_core::{KvStore, Result, TaskerConfig};

/// How long a lock survives a crashed holder.
const LOCK_TTL: Duration = Duration::from_secs(3);

/// Backoff between failed acquisition attempts.
const BACKOFF_BASE: Duration = Duration::from_millis(10);
const BACKOFF_CAP: Duration = Duration::from_millis(320);

/// Advisory per-UUID mutual exclusion built on `set_if_absent` with a TTL.
///
/// At most one worker may decrement-and-promote a given dependent at a time;
/// the lock is held only for the handful of KV round-trips that make up one
/// release step, so contenders poll with bounded backoff rather than queueing.
pub struct LockManager {
    config: Arc<TaskerConfig>,
    store: Arc<dyn KvStore>,
}

impl LockManager {
    /// Create a new lock manager over the given KV backend.
    pub fn new(config: Arc<TaskerConfig>, store: Arc<dyn KvStore>) -> Self {
        Self { config, store }
    }

    /// Block until the lock for `uuid` is acquired.
    ///
    /// KV errors abort the attempt; contention does not. The TTL reclaims
    /// locks whose holders crashed mid-release.
    pub async fn acquire(&self, uuid: &str) -> Result<()> {
        let key = self.config.lock_key(uuid);
        let mut backoff = BACKOFF_BASE;

        loop {
            if self.store.set_if_absent(&key, "1", LOCK_TTL).await? {
                return Ok(());
            }

            tracing::trace!(
                uuid = %uuid,
                backoff_ms = backoff.as_millis() as u64,
                "Dependent lock contended, backing off"
            );
            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(BACKOFF_CAP);
        }
    }

    /// Release the lock for `uuid`.
    pub async fn release(&self, uuid: &str) -> Result<()> {
        self.store.delete(&self.config.lock_key(uuid)).await
    }
}
