#![deny(unused)]
//! Worker runtime for taskgrid.
//!
//! This crate holds everything that happens around the KV backend: the
//! process-local handler registry, the enqueue-side scheduler, the graph
//! loader that turns external DAG declarations into wired task groups, the
//! per-dependent lock manager, and the worker loop that claims ready
//! instances and releases their dependents.

pub mod group;
mod loader;
pub mod lock;
pub mod registry;
pub mod scheduler;
pub mod tasker;
pub mod worker;

pub use group::TaskGroup;
pub use lock::LockManager;
pub use registry::{Task, TaskRegistry};
pub use scheduler::Scheduler;
pub use tasker::{Tasker, TaskerBuilder};
pub use worker::ErrorHandler;
