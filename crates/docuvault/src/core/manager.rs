//! Document manager façade.
//!
//! The entry point external callers use: one method per operation, each
//! running match → pipeline stages → storage. HTTP layers map the returned
//! errors onto status codes (`NoMatchingRule`/`Plugin` → 400, `NotFound` →
//! 404); nothing here knows about transport.
//!
//! # Partial effects
//!
//! Stage execution is fail-fast without compensation: if an `after_store`
//! worker fails, the revision written by the `store` stage remains. Callers
//! that need all-or-nothing behaviour must compensate themselves (e.g.
//! delete the reported revision); retrying is safe for `Io` errors.

use crate::core::config::DmsConfig;
use crate::core::pipeline::run_stage;
use crate::error::Result;
use crate::plugins::registry::{RulePipelines, WorkerRegistry};
use crate::plugins::Stage;
use crate::rules::RuleSet;
use crate::storage::StorageBackend;
use crate::types::{Document, DocumentRecord, TagAction};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

/// Orchestrates match → pipeline → storage for single document operations.
pub struct DocumentManager {
    rules: RuleSet,
    pipelines: RulePipelines,
    backend: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for DocumentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentManager")
            .field("pipelines", &self.pipelines)
            .finish_non_exhaustive()
    }
}

impl DocumentManager {
    /// Build a manager from configuration.
    ///
    /// Compiles the rule set and resolves every plugin binding against the
    /// registry; all configuration errors (invalid patterns, ambiguous
    /// rules, unknown plugins, bad ordinals) surface here, at load time.
    pub fn from_config(
        config: &DmsConfig,
        registry: &WorkerRegistry,
        backend: Arc<dyn StorageBackend>,
    ) -> Result<Self> {
        let rules = config.build_rules()?;
        let pipelines = RulePipelines::resolve(&config.rules, registry)?;
        Ok(Self {
            rules,
            pipelines,
            backend,
        })
    }

    /// Store a new revision of a document.
    ///
    /// Runs the matched rule's `before_store`, `store` and `after_store`
    /// chains in order. Any stage failure short-circuits; the error names
    /// the rejecting plugin. No byte is written when no rule matches.
    pub async fn handle_store(
        &self,
        code: &str,
        content: Vec<u8>,
        tag_actions: &[TagAction],
    ) -> Result<Document> {
        let rule = self.rules.match_code(code)?;
        let mut document = Document::with_content(code, content);

        for stage in [Stage::BeforeStore, Stage::Store, Stage::AfterStore] {
            let bindings = self.pipelines.bindings_for(rule.id, stage);
            run_stage(stage, bindings, &mut document, rule, self.backend.as_ref(), tag_actions).await?;
        }

        info!(code, rule = %rule.name, revision = ?document.revision, "stored document");
        Ok(document)
    }

    /// Retrieve a revision's bytes and metadata. `None` selects the latest.
    pub async fn handle_retrieve(&self, code: &str, revision: Option<u32>) -> Result<Document> {
        let rule = self.rules.match_code(code)?;
        let mut document = Document::bare(code);

        let before = self.pipelines.bindings_for(rule.id, Stage::BeforeRetrieve);
        run_stage(Stage::BeforeRetrieve, before, &mut document, rule, self.backend.as_ref(), &[]).await?;

        let retrieved = self.backend.retrieve(code, revision).await?;
        document.content = Some(retrieved.content);
        document.mimetype = retrieved.record.mimetype.clone();
        document.suggested_extension = retrieved.record.suggested_extension.clone();
        document.tags = retrieved.record.tags.clone();
        document.content_hash = retrieved
            .record
            .revisions
            .get(&retrieved.revision)
            .and_then(|r| r.content_hash.clone());
        document.revision = Some(retrieved.revision);

        let after = self.pipelines.bindings_for(rule.id, Stage::AfterRetrieve);
        run_stage(Stage::AfterRetrieve, after, &mut document, rule, self.backend.as_ref(), &[]).await?;

        Ok(document)
    }

    /// Delete one revision, or the whole document when `revision` is `None`.
    pub async fn handle_delete(&self, code: &str, revision: Option<u32>) -> Result<()> {
        let rule = self.rules.match_code(code)?;
        let mut document = Document::bare(code);

        let before = self.pipelines.bindings_for(rule.id, Stage::BeforeDelete);
        run_stage(Stage::BeforeDelete, before, &mut document, rule, self.backend.as_ref(), &[]).await?;

        self.backend.delete(code, revision).await?;

        let after = self.pipelines.bindings_for(rule.id, Stage::AfterDelete);
        run_stage(Stage::AfterDelete, after, &mut document, rule, self.backend.as_ref(), &[]).await?;

        info!(code, revision = ?revision, "deleted");
        Ok(())
    }

    /// Document metadata: mimetype, tags, revision table.
    pub async fn document_info(&self, code: &str) -> Result<DocumentRecord> {
        self.backend.document_record(code).await
    }

    /// Number of stored revisions for a code.
    pub async fn revision_count(&self, code: &str) -> Result<u32> {
        self.backend.revision_count(code).await
    }

    /// Attach a tag to an existing document.
    pub async fn add_tag(&self, code: &str, tag: &str) -> Result<BTreeSet<String>> {
        self.backend.update_tags(code, &[tag.to_string()], &[]).await
    }

    /// Remove a tag from an existing document.
    pub async fn remove_tag(&self, code: &str, tag: &str) -> Result<BTreeSet<String>> {
        self.backend.update_tags(code, &[], &[tag.to_string()]).await
    }

    /// The configured rule set.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}
