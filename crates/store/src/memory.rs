//! In-memory implementation of the KvStore trait.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

use taskgrid_core::{KvStore, Result};

#[derive(Default)]
struct KvState {
    lists: HashMap<String, VecDeque<String>>,
    hashes: HashMap<String, HashMap<String, String>>,
    values: HashMap<String, (String, Option<Instant>)>,
}

/// In-process KV store with the same contract as the Redis backend.
///
/// Useful for tests and single-process deployments; every structure lives
/// behind one async mutex, and blocked pops are woken through a `Notify`.
/// TTLs on `set_if_absent` keys are checked lazily at the next acquisition
/// attempt.
pub struct InMemoryKvStore {
    state: Mutex<KvState>,
    pushed: Notify,
}

impl InMemoryKvStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(KvState::default()),
            pushed: Notify::new(),
        }
    }

    /// Number of elements in a list key.
    pub async fn list_len(&self, key: &str) -> usize {
        let state = self.state.lock().await;
        state.lists.get(key).map(VecDeque::len).unwrap_or(0)
    }

    /// Number of fields in a hash key.
    pub async fn hash_len(&self, key: &str) -> usize {
        let state = self.state.lock().await;
        state.hashes.get(key).map(HashMap::len).unwrap_or(0)
    }
}

impl Default for InMemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn push_front(&self, key: &str, value: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        let list = state.lists.entry(key.to_string()).or_default();
        list.push_front(value.to_string());

        tracing::trace!(key = %key, len = list.len(), "Pushed onto in-memory list");
        drop(state);

        self.pushed.notify_waiters();
        Ok(())
    }

    async fn pop_back_blocking(
        &self,
        keys: &[&str],
        timeout: Duration,
    ) -> Result<Option<(String, String)>> {
        let deadline = Instant::now() + timeout;

        loop {
            // Register interest before checking, so a push between the check
            // and the await still wakes this waiter.
            let notified = self.pushed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state.lock().await;
                for key in keys {
                    if let Some(list) = state.lists.get_mut(*key) {
                        if let Some(value) = list.pop_back() {
                            return Ok(Some((key.to_string(), value)));
                        }
                    }
                }
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(None);
            }
        }
    }

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>> {
        let state = self.state.lock().await;
        Ok(state
            .hashes
            .get(key)
            .and_then(|hash| hash.get(field))
            .cloned())
    }

    async fn hash_del(&self, key: &str, field: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if let Some(hash) = state.hashes.get_mut(key) {
            hash.remove(field);
        }
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        let held = state
            .values
            .get(key)
            .is_some_and(|(_, expires)| expires.map_or(true, |at| at > now));
        if held {
            return Ok(false);
        }

        state
            .values
            .insert(key.to_string(), (value.to_string(), Some(now + ttl)));
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.values.remove(key);
        state.lists.remove(key);
        state.hashes.remove(key);
        Ok(())
    }
}
