//! Error types for taskgrid.

use thiserror::Error;

/// Result type alias using taskgrid's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for taskgrid.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Registration
    // =========================================================================
    #[error("Task redefinition: {0}")]
    Redefined(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    // =========================================================================
    // Producer-side validation
    // =========================================================================
    #[error("Parameter count mismatch: expected {expected}, got {actual}")]
    ParameterMismatch { expected: usize, actual: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Cyclic dependency in task group: {0}")]
    CyclicDependency(String),

    // =========================================================================
    // Worker-side
    // =========================================================================
    /// Internal sentinel for an empty blocking pop; never surfaced by the
    /// worker loop.
    #[error("No runnable tasks found")]
    NoRunnableTasks,

    #[error("KV backend error: {0}")]
    Kv(String),

    #[error("Task handler '{task_id}' failed: {message}")]
    Handler { task_id: String, message: String },

    // =========================================================================
    // Generic
    // =========================================================================
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a task-redefinition error.
    pub fn redefined(id: impl Into<String>) -> Self {
        Self::Redefined(id.into())
    }

    /// Create a task-not-found error.
    pub fn task_not_found(id: impl Into<String>) -> Self {
        Self::TaskNotFound(id.into())
    }

    /// Create an invalid-parameter error.
    pub fn invalid_param(msg: impl Into<String>) -> Self {
        Self::InvalidParam(msg.into())
    }

    /// Create a cyclic-dependency error.
    pub fn cyclic_dependency(group: impl Into<String>) -> Self {
        Self::CyclicDependency(group.into())
    }

    /// Create a KV backend error.
    pub fn kv(msg: impl Into<String>) -> Self {
        Self::Kv(msg.into())
    }

    /// Create a handler-failure error.
    pub fn handler(task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Handler {
            task_id: task_id.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
