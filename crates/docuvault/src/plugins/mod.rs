//! Plugin system for the document pipeline.
//!
//! Every capability a rule can bind into its pipeline is a plugin:
//!
//! - [`Plugin`] - base trait (identity, lifecycle)
//! - [`DocumentWorker`] - the uniform `work(document, context)` contract
//! - [`registry::WorkerRegistry`] - the closed registration table, built at
//!   startup and passed by reference
//! - [`registry::RulePipelines`] - per-(rule, stage) ordered chains,
//!   resolved once at load time
//!
//! # Lifecycle Pattern
//!
//! Workers are stored in `Arc<dyn DocumentWorker>` for thread-safe shared
//! access and registered explicitly:
//!
//! ```rust
//! use docuvault::plugins::registry::WorkerRegistry;
//! use docuvault::plugins::workers::FileTypeValidator;
//! use std::sync::Arc;
//!
//! # fn main() -> docuvault::Result<()> {
//! let mut registry = WorkerRegistry::new();
//! registry.register(Arc::new(FileTypeValidator::new()))?;
//! # Ok(())
//! # }
//! ```
//!
//! Unknown plugin identifiers referenced by configuration fail when the
//! rule pipelines are resolved — never at execution time.

pub mod registry;
mod traits;
mod worker;
pub mod workers;

pub use traits::Plugin;
pub use worker::{DocumentWorker, PipelineContext, Stage};
