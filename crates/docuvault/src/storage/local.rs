//! Local-filesystem storage backend.
//!
//! Layout: one directory per document code under the root; revision
//! payloads are named `{code}_r{N}.{ext}` and a `metadata.json` sidecar
//! carries the document record. The sidecar is rewritten via a temp file
//! and atomic rename on every mutation, so readers never observe a
//! half-written record. A per-code mutex table serializes mutations so two
//! concurrent stores can never allocate the same revision number.

use crate::error::{DocuvaultError, Result};
use crate::storage::{RetrievedRevision, RevisionAnnotations, StorageBackend};
use crate::types::{unix_now, DocumentRecord, RevisionRecord};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

const METADATA_FILE: &str = "metadata.json";

/// Filesystem-backed storage rooted at a single directory.
pub struct LocalStorage {
    root: PathBuf,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl LocalStorage {
    /// Create a backend rooted at `root`. The directory is created lazily
    /// on the first store.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: DashMap::new(),
        }
    }

    /// Root directory of this backend.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn lock_for(&self, code: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(code.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn document_dir(&self, code: &str) -> Result<PathBuf> {
        validate_code(code)?;
        Ok(self.root.join(code))
    }

    async fn read_record(&self, code: &str) -> Result<Option<DocumentRecord>> {
        let path = self.document_dir(code)?.join(METADATA_FILE);
        match fs::read(&path).await {
            Ok(bytes) => {
                let record = serde_json::from_slice(&bytes)?;
                Ok(Some(record))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn require_record(&self, code: &str) -> Result<DocumentRecord> {
        self.read_record(code)
            .await?
            .ok_or_else(|| DocuvaultError::not_found(format!("no document stored under code '{code}'")))
    }

    /// Write the sidecar via temp file + rename.
    async fn write_record(&self, dir: &Path, record: &DocumentRecord) -> Result<()> {
        let target = dir.join(METADATA_FILE);
        let tmp = dir.join(format!("{METADATA_FILE}.tmp"));
        let bytes = serde_json::to_vec_pretty(record)?;
        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, &target).await?;
        Ok(())
    }
}

/// Document codes become directory names; reject anything that could
/// escape the storage root.
fn validate_code(code: &str) -> Result<()> {
    if code.is_empty() {
        return Err(DocuvaultError::validation("document code cannot be empty"));
    }
    if code.contains(['/', '\\']) || code == "." || code == ".." {
        return Err(DocuvaultError::validation(format!(
            "document code '{}' contains path components",
            code
        )));
    }
    Ok(())
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn store(&self, code: &str, content: &[u8], annotations: &RevisionAnnotations) -> Result<u32> {
        let dir = self.document_dir(code)?;
        let lock = self.lock_for(code);
        let _guard = lock.lock().await;

        fs::create_dir_all(&dir).await?;

        let mut record = self
            .read_record(code)
            .await?
            .unwrap_or_else(|| DocumentRecord::new(code));

        let revision = record.next_revision();
        let extension = annotations
            .suggested_extension
            .clone()
            .unwrap_or_else(|| "bin".to_string());
        let file_name = format!("{code}_r{revision}.{extension}");

        // Payload first, sidecar second: a crash in between leaves an
        // orphan payload file, never a record pointing at missing bytes.
        let target = dir.join(&file_name);
        let tmp = dir.join(format!("{file_name}.tmp"));
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &target).await?;

        if record.mimetype.is_none() {
            record.mimetype = annotations.mimetype.clone();
            record.suggested_extension = annotations.suggested_extension.clone();
        }
        record.tags.extend(annotations.tags.iter().cloned());
        record.revisions.insert(
            revision,
            RevisionRecord {
                file_name,
                size: content.len() as u64,
                content_hash: annotations.content_hash.clone(),
                stored_at: unix_now(),
            },
        );
        record.last_allocated = revision;

        self.write_record(&dir, &record).await?;

        debug!(code, revision, size = content.len(), "stored revision");
        Ok(revision)
    }

    async fn retrieve(&self, code: &str, revision: Option<u32>) -> Result<RetrievedRevision> {
        let record = self.require_record(code).await?;
        let revision = match revision {
            Some(rev) => rev,
            None => record
                .latest_revision()
                .ok_or_else(|| DocuvaultError::not_found(format!("document '{code}' has no revisions")))?,
        };
        let rev_record = record
            .revisions
            .get(&revision)
            .ok_or_else(|| DocuvaultError::not_found(format!("document '{code}' has no revision {revision}")))?;

        let path = self.document_dir(code)?.join(&rev_record.file_name);
        let content = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DocuvaultError::not_found(format!(
                    "payload for '{code}' revision {revision} is missing"
                )));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(RetrievedRevision {
            revision,
            content,
            record,
        })
    }

    async fn delete(&self, code: &str, revision: Option<u32>) -> Result<()> {
        let dir = self.document_dir(code)?;
        let lock = self.lock_for(code);
        let _guard = lock.lock().await;

        let mut record = self.require_record(code).await?;

        match revision {
            Some(rev) => {
                let rev_record = record
                    .revisions
                    .remove(&rev)
                    .ok_or_else(|| DocuvaultError::not_found(format!("document '{code}' has no revision {rev}")))?;
                match fs::remove_file(dir.join(&rev_record.file_name)).await {
                    Ok(()) => {}
                    // Sidecar is authoritative; a missing payload is already gone.
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
                self.write_record(&dir, &record).await?;
                debug!(code, revision = rev, "deleted revision");
            }
            None => {
                fs::remove_dir_all(&dir).await?;
                self.locks.remove(code);
                debug!(code, "deleted document");
            }
        }
        Ok(())
    }

    async fn revision_count(&self, code: &str) -> Result<u32> {
        Ok(self.require_record(code).await?.revision_count())
    }

    async fn document_record(&self, code: &str) -> Result<DocumentRecord> {
        self.require_record(code).await
    }

    async fn update_tags(&self, code: &str, add: &[String], remove: &[String]) -> Result<BTreeSet<String>> {
        let dir = self.document_dir(code)?;
        let lock = self.lock_for(code);
        let _guard = lock.lock().await;

        let mut record = self.require_record(code).await?;
        for tag in add {
            record.tags.insert(tag.clone());
        }
        for tag in remove {
            record.tags.remove(tag);
        }
        self.write_record(&dir, &record).await?;
        Ok(record.tags)
    }
}
