//! Storage write worker — exactly the persistence write of the store
//! pipeline. Hands the buffer and the annotations accumulated by earlier
//! stages to the backend and records the allocated revision on the
//! document.

use crate::error::{DocuvaultError, Result};
use crate::plugins::worker::{DocumentWorker, PipelineContext, Stage};
use crate::plugins::Plugin;
use crate::storage::RevisionAnnotations;
use crate::types::Document;
use async_trait::async_trait;
use tracing::debug;

#[derive(Debug)]
pub struct StorageWriter;

impl Plugin for StorageWriter {
    fn name(&self) -> &str {
        "local-storage"
    }

    fn version(&self) -> String {
        "1.0.0".to_string()
    }

    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn description(&self) -> &str {
        "Persists the document as a new revision through the storage backend"
    }
}

#[async_trait]
impl DocumentWorker for StorageWriter {
    async fn work(&self, document: &mut Document, ctx: &PipelineContext<'_>) -> Result<()> {
        let content = document
            .content
            .as_deref()
            .ok_or_else(|| DocuvaultError::plugin(self.name(), "File buffer not initialized"))?;

        let annotations = RevisionAnnotations {
            mimetype: document.mimetype.clone(),
            suggested_extension: document.suggested_extension.clone(),
            content_hash: document.content_hash.clone(),
            tags: document.tags.clone(),
        };

        let revision = ctx.backend.store(&document.code, content, &annotations).await?;
        document.revision = Some(revision);
        debug!(code = %document.code, revision, "persisted revision");
        Ok(())
    }

    fn supported_stages(&self) -> &[Stage] {
        &[Stage::Store]
    }
}
