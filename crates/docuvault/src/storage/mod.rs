//! Storage backend abstraction.
//!
//! Backends persist document bytes as immutable, sequentially numbered
//! revisions addressed by `(code, revision)`, plus a per-code metadata
//! record. The local-filesystem implementation lives in [`local`].

mod local;

pub use local::LocalStorage;

use crate::error::Result;
use crate::types::DocumentRecord;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Annotations persisted alongside a new revision.
///
/// Collected from the working document by the storage-stage worker; the
/// backend folds them into the document record.
#[derive(Debug, Clone, Default)]
pub struct RevisionAnnotations {
    pub mimetype: Option<String>,
    pub suggested_extension: Option<String>,
    pub content_hash: Option<String>,
    pub tags: BTreeSet<String>,
}

/// A retrieved revision: payload plus the document record it came from.
#[derive(Debug, Clone)]
pub struct RetrievedRevision {
    pub revision: u32,
    pub content: Vec<u8>,
    pub record: DocumentRecord,
}

/// Capability interface for revisioned document storage.
///
/// # Contract
///
/// - `store` always allocates a fresh revision number, strictly greater
///   than any previously allocated for the code; it never overwrites an
///   existing revision in place. Concurrent stores for the same code are
///   serialized inside the backend.
/// - `retrieve`/`delete`/`revision_count` fail with
///   [`crate::DocuvaultError::NotFound`] when the code or revision does
///   not exist.
/// - Transient failures surface as `Io` errors; callers decide whether to
///   retry. Remote implementations must bound reads and writes with
///   configurable timeouts so no operation blocks indefinitely; the local
///   backend relies on the filesystem for this.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Persist a new revision and return its number.
    async fn store(&self, code: &str, content: &[u8], annotations: &RevisionAnnotations) -> Result<u32>;

    /// Fetch a revision's bytes and metadata. `None` selects the latest
    /// stored revision.
    async fn retrieve(&self, code: &str, revision: Option<u32>) -> Result<RetrievedRevision>;

    /// Delete one revision, or the whole document when `revision` is `None`.
    async fn delete(&self, code: &str, revision: Option<u32>) -> Result<()>;

    /// Number of revisions currently stored for a code.
    async fn revision_count(&self, code: &str) -> Result<u32>;

    /// The document's metadata record (tags, mimetype, revision table).
    async fn document_record(&self, code: &str) -> Result<DocumentRecord>;

    /// Apply tag additions/removals to the document record, atomically,
    /// returning the resulting tag set.
    async fn update_tags(&self, code: &str, add: &[String], remove: &[String]) -> Result<BTreeSet<String>>;
}
