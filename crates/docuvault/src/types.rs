//! Core data types shared across the pipeline and storage layers.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::{SystemTime, UNIX_EPOCH};

/// Transient working object for one manager operation.
///
/// A `Document` is constructed at the start of a store/retrieve/delete
/// operation and handed through the plugin chain, which mutates it in
/// place: validators annotate the mimetype, the hash worker records a
/// digest, the storage worker fills in the allocated revision. The object
/// is discarded when the operation ends; durable state lives in the
/// backend's [`DocumentRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Document code, e.g. `ADL-1234`.
    pub code: String,
    /// Raw byte buffer. Absent until loaded (retrieve) or supplied (store).
    pub content: Option<Vec<u8>>,
    /// Detected MIME type, set by content sniffing.
    pub mimetype: Option<String>,
    /// Canonical file extension for the detected type.
    pub suggested_extension: Option<String>,
    /// Revision number, set once the storage stage has run.
    pub revision: Option<u32>,
    /// Hex digest of the content, set by the hashing stage.
    pub content_hash: Option<String>,
    /// Tags attached to the document.
    pub tags: BTreeSet<String>,
}

impl Document {
    /// Create a working document with a byte buffer (store path).
    pub fn with_content(code: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            code: code.into(),
            content: Some(content),
            mimetype: None,
            suggested_extension: None,
            revision: None,
            content_hash: None,
            tags: BTreeSet::new(),
        }
    }

    /// Create an empty working document (retrieve/delete path).
    pub fn bare(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            content: None,
            mimetype: None,
            suggested_extension: None,
            revision: None,
            content_hash: None,
            tags: BTreeSet::new(),
        }
    }

    /// Byte length of the buffer, if one is loaded.
    pub fn content_len(&self) -> Option<usize> {
        self.content.as_ref().map(Vec::len)
    }
}

/// A tag mutation requested alongside an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagAction {
    Add(String),
    Remove(String),
}

/// Durable per-document metadata, persisted by the storage backend as a
/// sidecar record and updated atomically on every revision write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub code: String,
    /// MIME type detected when the document was first stored.
    #[serde(default)]
    pub mimetype: Option<String>,
    #[serde(default)]
    pub suggested_extension: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Revisions keyed by ordinal. Ordinals are allocated strictly
    /// increasing and are never reused, so the map may be sparse after
    /// single-revision deletes.
    #[serde(default)]
    pub revisions: BTreeMap<u32, RevisionRecord>,
    /// Highest ordinal ever allocated; only grows, even across deletes.
    #[serde(default)]
    pub last_allocated: u32,
}

impl DocumentRecord {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    /// Number of revisions currently stored.
    pub fn revision_count(&self) -> u32 {
        self.revisions.len() as u32
    }

    /// Highest stored revision ordinal, if any revision exists.
    pub fn latest_revision(&self) -> Option<u32> {
        self.revisions.keys().next_back().copied()
    }

    /// Next ordinal to allocate. One past the highest ever allocated, so
    /// deleted ordinals are never reissued.
    pub fn next_revision(&self) -> u32 {
        self.last_allocated + 1
    }
}

/// Durable per-revision metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRecord {
    /// File name of the revision payload inside the document directory.
    pub file_name: String,
    /// Payload size in bytes.
    pub size: u64,
    #[serde(default)]
    pub content_hash: Option<String>,
    /// Unix timestamp (seconds) of the write.
    pub stored_at: u64,
}

/// Current unix time in seconds, for revision timestamps.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
