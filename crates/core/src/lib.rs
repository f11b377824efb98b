#![deny(unused)]
//! Core types, traits, and error definitions for taskgrid.
//!
//! This crate provides the building blocks shared by the KV backends and the
//! worker runtime: the process configuration and key namespace, the task
//! instance model, the external DAG declaration schema, and the `KvStore` /
//! `TaskHandler` seams.

pub mod config;
pub mod declaration;
pub mod error;
pub mod instance;
pub mod traits;

pub use config::TaskerConfig;
pub use declaration::{ArgSpec, GroupDeclaration, SubtaskDeclaration};
pub use error::{Error, Result};
pub use instance::TaskInstance;
pub use traits::{FnHandler, KvStore, TaskHandler};
