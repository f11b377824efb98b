//! Process configuration and the KV key namespace.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for a tasker deployment.
///
/// `tasker_id` namespaces every key the library writes, so several
/// independent taskers can share one Redis server.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TaskerConfig {
    pub tasker_id: String,
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_db: i64,
}

impl TaskerConfig {
    /// Load configuration from optional `config/tasker*` files and
    /// `TASKER`-prefixed environment variables, layered over the defaults.
    ///
    /// `TASKER__REDIS_PORT=6380` maps to `redis_port`.
    pub fn load() -> Result<Self> {
        let defaults =
            Config::try_from(&Self::default()).map_err(|e| Error::config(e.to_string()))?;

        let s = Config::builder()
            .add_source(defaults)
            .add_source(File::with_name("config/tasker").required(false))
            .add_source(File::with_name("config/tasker.local").required(false))
            .add_source(Environment::with_prefix("TASKER").separator("__"))
            .build()
            .map_err(|e| Error::config(e.to_string()))?;

        s.try_deserialize().map_err(|e| Error::config(e.to_string()))
    }

    /// Connection URL for the configured Redis server.
    pub fn redis_url(&self) -> String {
        format!(
            "redis://{}:{}/{}",
            self.redis_host, self.redis_port, self.redis_db
        )
    }

    /// Key of the FIFO list holding instances ready to run.
    pub fn ready_queue_key(&self) -> String {
        format!("tasker:{}:jobs:ready", self.tasker_id)
    }

    /// Key of the hash holding instances with unfinished dependencies.
    pub fn waiting_hash_key(&self) -> String {
        format!("tasker:{}:jobs", self.tasker_id)
    }

    /// Key of the per-dependent release lock.
    pub fn lock_key(&self, uuid: &str) -> String {
        format!("tasker:{}:lock:{}", self.tasker_id, uuid)
    }
}

impl Default for TaskerConfig {
    fn default() -> Self {
        Self {
            tasker_id: "tasker".into(),
            redis_host: "127.0.0.1".into(),
            redis_port: 6379,
            redis_db: 0,
        }
    }
}
