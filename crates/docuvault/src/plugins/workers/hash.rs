//! Content hashing worker.
//!
//! Annotates the document with a SHA-256 hex digest of the buffer before
//! storage, so every revision's integrity can be checked and addressed by
//! content hash.

use crate::error::{DocuvaultError, Result};
use crate::plugins::worker::{DocumentWorker, PipelineContext, Stage};
use crate::plugins::Plugin;
use crate::types::Document;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

#[derive(Debug)]
pub struct ContentHashWorker;

impl Plugin for ContentHashWorker {
    fn name(&self) -> &str {
        "content-hash"
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
        "Records a SHA-256 digest of the document content"
    }
}

#[async_trait]
impl DocumentWorker for ContentHashWorker {
    async fn work(&self, document: &mut Document, _ctx: &PipelineContext<'_>) -> Result<()> {
        let content = document
            .content
            .as_deref()
            .ok_or_else(|| DocuvaultError::plugin(self.name(), "File buffer not initialized"))?;
        document.content_hash = Some(hex::encode(Sha256::digest(content)));
        Ok(())
    }

    fn supported_stages(&self) -> &[Stage] {
        &[Stage::BeforeStore]
    }
}
