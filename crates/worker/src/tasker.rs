//! The tasker context: configuration, KV backend, and registry in one place.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use taskgrid_core::{
    FnHandler, GroupDeclaration, KvStore, Result, TaskHandler, TaskInstance, TaskerConfig,
};
use taskgrid_store::RedisKvStore;

use crate::group::TaskGroup;
use crate::loader;
use crate::lock::LockManager;
use crate::registry::{Task, TaskRegistry};
use crate::scheduler::Scheduler;

/// One logical tasker: the shared configuration, the KV backend holding the
/// job graph, and the process-local handler registry.
///
/// Producers and workers hold the same `Tasker` (usually behind an `Arc`);
/// separate processes build their own against the same KV backend and
/// tasker id. Tests build isolated instances over an in-memory store.
pub struct Tasker {
    pub(crate) config: Arc<TaskerConfig>,
    pub(crate) store: Arc<dyn KvStore>,
    pub(crate) registry: TaskRegistry,
    pub(crate) scheduler: Arc<Scheduler>,
    pub(crate) locks: LockManager,
}

impl Tasker {
    /// Start building a tasker.
    pub fn builder() -> TaskerBuilder {
        TaskerBuilder::new()
    }

    /// The configuration this tasker was built with.
    pub fn config(&self) -> &TaskerConfig {
        &self.config
    }

    /// Register a handler under a unique task id.
    pub fn register_task(&self, id: &str, handler: Arc<dyn TaskHandler>) -> Result<Task> {
        self.registry.register(id, handler)
    }

    /// Register a plain closure as a task handler.
    pub fn register_fn<F>(&self, id: &str, f: F) -> Result<Task>
    where
        F: Fn(&[Value]) -> Result<()> + Send + Sync + 'static,
    {
        self.register_task(id, Arc::new(FnHandler::new(f)))
    }

    /// Enqueue a single instance according to its dependency count.
    pub async fn schedule(&self, instance: &TaskInstance) -> Result<()> {
        self.scheduler.schedule(instance).await
    }

    /// Load a task group from a JSON declaration string.
    pub fn load_task_group_from_str(&self, json: &str) -> Result<TaskGroup> {
        let declaration: GroupDeclaration = serde_json::from_str(json)?;
        loader::build_group(&self.registry, self.scheduler.clone(), declaration)
    }

    /// Load a task group from a JSON declaration file.
    pub fn load_task_group_from_file(&self, path: impl AsRef<Path>) -> Result<TaskGroup> {
        let data = std::fs::read_to_string(path)?;
        self.load_task_group_from_str(&data)
    }
}

/// Builder for constructing a [`Tasker`].
pub struct TaskerBuilder {
    config: Option<TaskerConfig>,
    store: Option<Arc<dyn KvStore>>,
}

impl TaskerBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: None,
            store: None,
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: TaskerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the KV backend.
    pub fn with_store(mut self, store: Arc<dyn KvStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the tasker. Without an explicit store, a Redis backend is
    /// created from the configuration.
    pub fn build(self) -> Result<Tasker> {
        let config = Arc::new(self.config.unwrap_or_default());

        let store: Arc<dyn KvStore> = match self.store {
            Some(store) => store,
            None => {
                tracing::info!(url = %config.redis_url(), "Initializing Redis KV store");
                Arc::new(RedisKvStore::from_config(&config)?)
            }
        };

        Ok(Tasker {
            scheduler: Arc::new(Scheduler::new(config.clone(), store.clone())),
            locks: LockManager::new(config.clone(), store.clone()),
            registry: TaskRegistry::new(),
            config,
            store,
        })
    }
}

impl Default for TaskerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
