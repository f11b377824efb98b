#![deny(unused)]
//! taskgrid - distributed task execution with dependency-aware scheduling.
//!
//! Producers register named task handlers, declare DAG-shaped dependencies
//! between task instances, and enqueue them; workers across any number of
//! processes drain the shared ready queue and release downstream work as
//! dependencies complete. All coordination state lives in a key-value
//! backend (Redis in production, in-memory for tests), so one logical job
//! graph spans every participating process.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskgrid::{InMemoryKvStore, Tasker};
//!
//! # #[tokio::main]
//! # async fn main() -> taskgrid::Result<()> {
//! let tasker = Arc::new(
//!     Tasker::builder()
//!         .with_store(Arc::new(InMemoryKvStore::new()))
//!         .build()?,
//! );
//!
//! let fetch = tasker.register_fn("fetch", |args| {
//!     println!("fetching {:?}", args);
//!     Ok(())
//! })?;
//! let report = tasker.register_fn("report", |_| Ok(()))?;
//!
//! let mut fetch_instance = fetch.new_instance();
//! let report_instance = report.new_instance().depends_on(&mut fetch_instance);
//!
//! // Dependents are parked before roots become visible to workers.
//! tasker.schedule(&report_instance).await?;
//! tasker.schedule(&fetch_instance).await?;
//!
//! tasker.process_once().await?; // runs "fetch", promotes "report"
//! tasker.process_once().await?; // runs "report"
//! # Ok(())
//! # }
//! ```

pub mod telemetry;

pub use taskgrid_core::{
    ArgSpec, Error, FnHandler, GroupDeclaration, KvStore, Result, SubtaskDeclaration, TaskHandler,
    TaskInstance, TaskerConfig,
};
pub use taskgrid_store::{InMemoryKvStore, RedisKvStore};
pub use taskgrid_worker::{ErrorHandler, Task, TaskGroup, TaskRegistry, Tasker, TaskerBuilder};

pub use telemetry::configure_tracing;
