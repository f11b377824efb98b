//! Process-local task handler registry.

use dashmap::DashMap;
use std::sync::Arc;

use taskgrid_core::{Error, Result, TaskHandler, TaskInstance};

/// Thread-safe mapping from task id to handler.
///
/// The registry is written during setup and read concurrently by every
/// worker afterwards; handlers are shared via `Arc` and must be safe to
/// invoke from any worker.
pub struct TaskRegistry {
    handlers: DashMap<String, Arc<dyn TaskHandler>>,
}

impl TaskRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    /// Register a handler under a unique task id.
    pub fn register(&self, id: &str, handler: Arc<dyn TaskHandler>) -> Result<Task> {
        tracing::info!(task = %id, "Registering task handler");

        if self.handlers.contains_key(id) {
            return Err(Error::redefined(id));
        }

        self.handlers.insert(id.to_string(), handler);
        Ok(Task { id: id.to_string() })
    }

    /// Resolve a handler by task id.
    pub fn lookup(&self, id: &str) -> Result<Arc<dyn TaskHandler>> {
        self.handlers
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::task_not_found(id))
    }

    /// Get the number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a registered task, used to mint new instances.
#[derive(Debug, Clone)]
pub struct Task {
    id: String,
}

impl Task {
    /// The registered task id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Create a new instance of this task. The instance is not enqueued.
    pub fn new_instance(&self) -> TaskInstance {
        TaskInstance::new(&self.id)
    }
}
