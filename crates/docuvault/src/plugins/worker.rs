//! Pipeline worker trait and execution context.
//!
//! A worker is a single pipeline stage capability: validate a buffer,
//! persist it, attach tags. Workers share one uniform contract —
//! [`DocumentWorker::work`] receives the operation's working [`Document`]
//! and mutates it in place, accumulating state for later stages.

use crate::error::Result;
use crate::plugins::Plugin;
use crate::rules::DocTypeRule;
use crate::storage::StorageBackend;
use crate::types::{Document, TagAction};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Lifecycle points where workers attach.
///
/// Stores run `BeforeStore` → `Store` → `AfterStore`; retrieve and delete
/// bracket the backend call with their before/after stages. Within one
/// stage, workers execute in binding ordinal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Validation and annotation before any byte is persisted.
    BeforeStore,
    /// Exactly the persistence write.
    Store,
    /// Enrichment after a successful write (tagging, notification).
    AfterStore,
    BeforeRetrieve,
    AfterRetrieve,
    BeforeDelete,
    AfterDelete,
}

impl Stage {
    /// All stages, in lifecycle order.
    pub const ALL: [Stage; 7] = [
        Stage::BeforeStore,
        Stage::Store,
        Stage::AfterStore,
        Stage::BeforeRetrieve,
        Stage::AfterRetrieve,
        Stage::BeforeDelete,
        Stage::AfterDelete,
    ];
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::BeforeStore => "before_store",
            Stage::Store => "store",
            Stage::AfterStore => "after_store",
            Stage::BeforeRetrieve => "before_retrieve",
            Stage::AfterRetrieve => "after_retrieve",
            Stage::BeforeDelete => "before_delete",
            Stage::AfterDelete => "after_delete",
        };
        f.write_str(name)
    }
}

/// Per-invocation context handed to a worker.
///
/// Carries the matched rule, the stage being executed, the binding's
/// configuration options, the operation's requested tag actions, and an
/// open handle to the storage backend for workers that persist state.
pub struct PipelineContext<'a> {
    pub rule: &'a DocTypeRule,
    pub stage: Stage,
    pub backend: &'a dyn StorageBackend,
    pub tag_actions: &'a [TagAction],
    pub options: &'a serde_json::Map<String, serde_json::Value>,
}

impl<'a> PipelineContext<'a> {
    /// Fetch a binding option by name.
    pub fn option(&self, name: &str) -> Option<&serde_json::Value> {
        self.options.get(name)
    }
}

/// Trait for pipeline workers.
///
/// Workers must not reorder or skip later workers in the chain; they see
/// only their own invocation. A worker MAY write through
/// `ctx.backend` (storage-stage workers) or only inspect and annotate the
/// document (validators, taggers).
///
/// # Error Handling
///
/// Return [`crate::DocuvaultError::Plugin`] for any domain-level rejection
/// (unsupported mimetype, malformed metadata). Such errors are always
/// recoverable by the caller; they stop the pipeline and surface with the
/// worker's identity attached. Backend `Io` errors bubble unchanged.
///
/// # Example
///
/// ```rust
/// use docuvault::plugins::{DocumentWorker, PipelineContext, Plugin, Stage};
/// use docuvault::types::Document;
/// use docuvault::Result;
/// use async_trait::async_trait;
///
/// /// Reject empty uploads.
/// #[derive(Debug)]
/// struct NonEmptyValidator;
///
/// impl Plugin for NonEmptyValidator {
///     fn name(&self) -> &str { "non-empty-validator" }
///     fn version(&self) -> String { "1.0.0".to_string() }
///     fn initialize(&self) -> Result<()> { Ok(()) }
///     fn shutdown(&self) -> Result<()> { Ok(()) }
/// }
///
/// #[async_trait]
/// impl DocumentWorker for NonEmptyValidator {
///     async fn work(&self, document: &mut Document, _ctx: &PipelineContext<'_>) -> Result<()> {
///         if document.content_len() == Some(0) {
///             return Err(docuvault::DocuvaultError::plugin(self.name(), "empty file"));
///         }
///         Ok(())
///     }
///
///     fn supported_stages(&self) -> &[Stage] {
///         &[Stage::BeforeStore]
///     }
/// }
/// ```
#[async_trait]
pub trait DocumentWorker: Plugin + std::fmt::Debug {
    /// Run this worker's stage step over the working document.
    async fn work(&self, document: &mut Document, ctx: &PipelineContext<'_>) -> Result<()>;

    /// Stages this worker may be bound to.
    ///
    /// Binding a worker to a stage outside this list is rejected when the
    /// rule pipelines are resolved, not at execution time.
    fn supported_stages(&self) -> &[Stage];
}
