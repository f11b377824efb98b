//! Redis implementation of the KvStore trait.

use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use std::time::Duration;

use taskgrid_core::{Error, KvStore, Result, TaskerConfig};

/// Redis-backed coordination state.
///
/// All scheduling structures (the ready list, the waiting hash, the
/// per-dependent locks) live on the server this store points at, so any
/// number of producer and worker processes can share one job graph.
pub struct RedisKvStore {
    client: Client,
}

impl RedisKvStore {
    /// Create a new Redis KV store from a connection URL.
    pub fn new(url: &str) -> Result<Self> {
        let client = Client::open(url)
            .map_err(|e| Error::kv(format!("Failed to connect to Redis: {}", e)))?;
        Ok(Self { client })
    }

    /// Create a new Redis KV store from a tasker configuration.
    pub fn from_config(config: &TaskerConfig) -> Result<Self> {
        Self::new(&config.redis_url())
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| Error::kv(format!("Redis connection error: {}", e)))
    }
}

#[async_trait]
impl KvStore for RedisKvStore {
    async fn push_front(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: () = conn
            .lpush(key, value)
            .await
            .map_err(|e| Error::kv(format!("Redis lpush error: {}", e)))?;
        Ok(())
    }

    async fn pop_back_blocking(
        &self,
        keys: &[&str],
        timeout: Duration,
    ) -> Result<Option<(String, String)>> {
        let mut conn = self.connection().await?;
        // BRPOP returns nil on timeout, which decodes to None.
        let popped: Option<(String, String)> = conn
            .brpop(keys.to_vec(), timeout.as_secs_f64())
            .await
            .map_err(|e| Error::kv(format!("Redis brpop error: {}", e)))?;
        Ok(popped)
    }

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: () = conn
            .hset(key, field, value)
            .await
            .map_err(|e| Error::kv(format!("Redis hset error: {}", e)))?;
        Ok(())
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn
            .hget(key, field)
            .await
            .map_err(|e| Error::kv(format!("Redis hget error: {}", e)))?;
        Ok(value)
    }

    async fn hash_del(&self, key: &str, field: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: () = conn
            .hdel(key, field)
            .await
            .map_err(|e| Error::kv(format!("Redis hdel error: {}", e)))?;
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        let mut conn = self.connection().await?;
        // The claim and its TTL must land in one atomic command.
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::kv(format!("Redis set error: {}", e)))?;
        Ok(reply.is_some())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: () = conn
            .del(key)
            .await
            .map_err(|e| Error::kv(format!("Redis del error: {}", e)))?;
        Ok(())
    }
}
