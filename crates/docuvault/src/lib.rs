//! Docuvault - Document Management Core
//!
//! Docuvault stores documents through rule-matched plugin pipelines:
//! an uploaded file's code is matched against configured document type
//! rules, the matching rule's ordered plugin chain validates, hashes and
//! persists the buffer, and every store produces a new immutable revision
//! with a metadata sidecar (mimetype, tags, content hash).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use docuvault::core::config::DmsConfig;
//! use docuvault::core::manager::DocumentManager;
//! use docuvault::plugins::registry::WorkerRegistry;
//! use docuvault::storage::LocalStorage;
//! use std::sync::Arc;
//!
//! # async fn example() -> docuvault::Result<()> {
//! let config = DmsConfig::from_toml_file("dms.toml")?;
//! let registry = WorkerRegistry::with_builtin_workers()?;
//! let backend = Arc::new(LocalStorage::new(&config.storage_root));
//! let manager = DocumentManager::from_config(&config, &registry, backend)?;
//!
//! let document = manager
//!     .handle_store("ADL-1234", std::fs::read("invoice.pdf")?, &[])
//!     .await?;
//! println!("stored revision {:?}", document.revision);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Rules** (`rules`): document type rules matched against codes
//! - **Plugin System** (`plugins`): closed worker registry and per-rule
//!   pipelines resolved at startup
//! - **Pipeline** (`core::pipeline`): sequential, fail-fast stage executor
//! - **Storage** (`storage`): revisioned backend abstraction with a
//!   local-filesystem reference implementation
//! - **Manager** (`core::manager`): the façade external callers use

#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod plugins;
pub mod rules;
pub mod storage;
pub mod types;

pub use crate::core::config::DmsConfig;
pub use crate::core::manager::DocumentManager;
pub use error::{DocuvaultError, Result};
pub use plugins::registry::WorkerRegistry;
pub use rules::{DocTypeRule, RuleSet};
pub use storage::{LocalStorage, StorageBackend};
pub use types::{Document, DocumentRecord, TagAction};
