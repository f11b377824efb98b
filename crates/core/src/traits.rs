//! Core traits for taskgrid.
//!
//! These traits define the contracts between the scheduling core and its
//! external collaborators: the key-value backend that holds shared state,
//! and the handlers that do the actual work.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::error::Result;

// =============================================================================
// KV Backend
// =============================================================================

/// Key-value backend carrying all cross-process coordination state.
///
/// `push_front` and `pop_back_blocking` together form a FIFO: producers push
/// on the left, workers pop on the right. Implementations must make
/// `set_if_absent` atomic; every other operation is atomic on a single key.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Push a value onto the head of a list.
    async fn push_front(&self, key: &str, value: &str) -> Result<()>;

    /// Pop a value from the tail of any of the listed keys, blocking up to
    /// `timeout`. A timeout yields `Ok(None)`, never an error.
    async fn pop_back_blocking(
        &self,
        keys: &[&str],
        timeout: Duration,
    ) -> Result<Option<(String, String)>>;

    /// Set a field in a hash.
    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<()>;

    /// Get a field from a hash. A missing field is `Ok(None)`.
    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>>;

    /// Delete a field from a hash.
    async fn hash_del(&self, key: &str, field: &str) -> Result<()>;

    /// Set a key only if it does not exist, with a TTL (for distributed
    /// locks). Returns whether the key was set.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool>;

    /// Delete a key.
    async fn delete(&self, key: &str) -> Result<()>;
}

// =============================================================================
// Task Handlers
// =============================================================================

/// A unit of work that a worker can execute.
///
/// Handlers are shared across worker tasks, so they must be safe to invoke
/// concurrently.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    /// Run the handler with the arguments carried by a task instance.
    async fn run(&self, args: &[Value]) -> Result<()>;
}

/// Adapter wrapping a plain closure as a [`TaskHandler`].
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&[Value]) -> Result<()> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> TaskHandler for FnHandler<F>
where
    F: Fn(&[Value]) -> Result<()> + Send + Sync,
{
    async fn run(&self, args: &[Value]) -> Result<()> {
        (self.f)(args)
    }
}
