//! Tagging worker.
//!
//! Applies the operation's requested tag actions after a successful store
//! and persists them on the document record. With no tag actions this
//! stage is a no-op.

use crate::error::Result;
use crate::plugins::worker::{DocumentWorker, PipelineContext, Stage};
use crate::plugins::Plugin;
use crate::types::{Document, TagAction};
use async_trait::async_trait;
use tracing::debug;

#[derive(Debug)]
pub struct TagWorker;

impl Plugin for TagWorker {
    fn name(&self) -> &str {
        "tagger"
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
        "Applies requested tag additions and removals to the stored document"
    }
}

#[async_trait]
impl DocumentWorker for TagWorker {
    async fn work(&self, document: &mut Document, ctx: &PipelineContext<'_>) -> Result<()> {
        if ctx.tag_actions.is_empty() {
            return Ok(());
        }

        let mut add = Vec::new();
        let mut remove = Vec::new();
        for action in ctx.tag_actions {
            match action {
                TagAction::Add(tag) => add.push(tag.clone()),
                TagAction::Remove(tag) => remove.push(tag.clone()),
            }
        }

        let tags = ctx.backend.update_tags(&document.code, &add, &remove).await?;
        debug!(code = %document.code, added = add.len(), removed = remove.len(), "applied tags");
        document.tags = tags;
        Ok(())
    }

    fn supported_stages(&self) -> &[Stage] {
        &[Stage::AfterStore]
    }
}
