#![deny(unused)]
//! KV backends for taskgrid.
//!
//! Coordination state (the ready queue, the waiting hash, the per-dependent
//! locks) lives behind the [`KvStore`] trait from `taskgrid_core`. This crate
//! provides the two implementations: the Redis backend shared across
//! processes and hosts, and an in-memory twin for tests and single-process
//! deployments.
//!
//! [`KvStore`]: taskgrid_core::KvStore

pub mod memory;
pub mod redis;

pub use memory::InMemoryKvStore;
pub use redis::RedisKvStore;
