//! The worker loop: claim one ready task, run it, release its dependents.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use taskgrid_core::{Error, Result, TaskInstance};

use crate::tasker::Tasker;

/// How long one tick blocks on the ready queue before yielding.
const POP_TIMEOUT: Duration = Duration::from_secs(1);

/// Extra attempts after a failed waiting-hash read or delete.
const RELEASE_RETRIES: usize = 5;

/// Decides whether a background worker absorbs a tick error and keeps going.
pub type ErrorHandler = Arc<dyn Fn(&Error) -> bool + Send + Sync>;

impl Tasker {
    /// Run one worker tick.
    ///
    /// Pops one ready instance (blocking up to a second), runs its handler,
    /// and walks the release protocol over its dependents. An empty queue is
    /// an idle tick, not an error. A handler failure is surfaced without
    /// touching dependents; the popped instance is not re-enqueued.
    pub async fn process_once(&self) -> Result<()> {
        let ready_key = self.config.ready_queue_key();
        let popped = self
            .store
            .pop_back_blocking(&[ready_key.as_str()], POP_TIMEOUT)
            .await?;

        let Some((_, payload)) = popped else {
            return Ok(());
        };

        let instance = TaskInstance::from_payload(&payload)?;
        let handler = self.registry.lookup(&instance.task_id)?;

        tracing::debug!(
            task = %instance.task_id,
            uuid = %instance.uuid,
            "Running task instance"
        );

        handler
            .run(&instance.args)
            .await
            .map_err(|e| Error::handler(&instance.task_id, e.to_string()))?;

        self.release_dependents(&instance).await
    }

    /// Decrement each dependent's outstanding-dependency counter and promote
    /// it to the ready queue when the counter reaches zero.
    ///
    /// Each dependent is handled under its per-UUID lock; deleting the
    /// waiting-hash field while holding the lock makes the promotion
    /// single-winner when several parents finish concurrently.
    async fn release_dependents(&self, instance: &TaskInstance) -> Result<()> {
        let waiting_key = self.config.waiting_hash_key();

        for dependent in &instance.dependents {
            self.locks.acquire(dependent).await?;

            let payload = match self.fetch_waiting(&waiting_key, dependent).await {
                Ok(Some(payload)) => payload,
                Ok(None) => {
                    // Another parent's worker already promoted this
                    // dependent.
                    tracing::debug!(uuid = %dependent, "Dependent no longer waiting, skipping");
                    self.locks.release(dependent).await?;
                    continue;
                }
                Err(e) => {
                    // Best effort; the TTL reclaims the lock otherwise.
                    let _ = self.locks.release(dependent).await;
                    return Err(e);
                }
            };

            if let Err(e) = self.remove_waiting(&waiting_key, dependent).await {
                let _ = self.locks.release(dependent).await;
                return Err(e);
            }

            let mut released = match TaskInstance::from_payload(&payload) {
                Ok(released) => released,
                Err(e) => {
                    tracing::error!(
                        uuid = %dependent,
                        error = %e,
                        "Failed to decode waiting dependent, skipping"
                    );
                    self.locks.release(dependent).await?;
                    continue;
                }
            };

            released.dependency_count = released.dependency_count.saturating_sub(1);
            if let Err(e) = self.scheduler.schedule(&released).await {
                let _ = self.locks.release(dependent).await;
                return Err(e);
            }

            self.locks.release(dependent).await?;
        }

        Ok(())
    }

    async fn fetch_waiting(&self, key: &str, field: &str) -> Result<Option<String>> {
        let mut attempt = 0;
        loop {
            match self.store.hash_get(key, field).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < RELEASE_RETRIES => {
                    attempt += 1;
                    tracing::warn!(
                        uuid = %field,
                        error = %e,
                        attempt,
                        "Retrying waiting-hash read"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn remove_waiting(&self, key: &str, field: &str) -> Result<()> {
        let mut attempt = 0;
        loop {
            match self.store.hash_del(key, field).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < RELEASE_RETRIES => {
                    attempt += 1;
                    tracing::warn!(
                        uuid = %field,
                        error = %e,
                        attempt,
                        "Retrying waiting-hash delete"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Run the worker loop in the calling task until the first error.
    pub async fn start_sync(&self) -> Result<()> {
        tracing::info!(tasker = %self.config.tasker_id, "Starting worker loop");
        loop {
            self.process_once().await?;
        }
    }

    /// Spawn a background worker loop.
    ///
    /// The cancellation token is observed between ticks, so an in-flight
    /// handler is never interrupted. A tick error terminates the process
    /// abruptly; use [`start_async_with_handler`] to absorb errors instead.
    ///
    /// [`start_async_with_handler`]: Tasker::start_async_with_handler
    pub fn start_async(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let tasker = self.clone();
        tokio::spawn(async move {
            loop {
                if cancel.is_cancelled() {
                    tracing::info!("Worker cancelled, shutting down");
                    return;
                }
                if let Err(e) = tasker.process_once().await {
                    tracing::error!(error = %e, "Worker tick failed, aborting process");
                    std::process::abort();
                }
            }
        })
    }

    /// Spawn a background worker loop with an error handler.
    ///
    /// A tick error is passed to `handler`; returning `true` absorbs it and
    /// the loop continues, returning `false` terminates the process.
    pub fn start_async_with_handler(
        self: &Arc<Self>,
        cancel: CancellationToken,
        handler: ErrorHandler,
    ) -> JoinHandle<()> {
        let tasker = self.clone();
        tokio::spawn(async move {
            loop {
                if cancel.is_cancelled() {
                    tracing::info!("Worker cancelled, shutting down");
                    return;
                }
                if let Err(e) = tasker.process_once().await {
                    if !handler(&e) {
                        tracing::error!(
                            error = %e,
                            "Worker tick failed and error handler declined, aborting process"
                        );
                        std::process::abort();
                    }
                    tracing::warn!(error = %e, "Worker tick failed, error absorbed by handler");
                }
            }
        })
    }
}
