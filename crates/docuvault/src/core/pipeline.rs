//! Pipeline stage execution.
//!
//! Folds the ordered worker chain of one stage over the working document:
//! each worker sees the document as its predecessor left it. Execution is
//! strictly sequential — later workers may depend on annotations made by
//! earlier ones — and fail-fast: the first error stops the chain and no
//! further worker runs.
//!
//! Side effects applied before the failure point are NOT rolled back.
//! Callers needing stronger guarantees must compensate at the manager /
//! storage boundary; the executor deliberately does not.

use crate::error::{DocuvaultError, Result};
use crate::plugins::registry::ResolvedBinding;
use crate::plugins::{PipelineContext, Stage};
use crate::rules::DocTypeRule;
use crate::storage::StorageBackend;
use crate::types::{Document, TagAction};
use tracing::{debug, warn};

/// Run one stage's worker chain over the document.
///
/// `bindings` must already be in ordinal order (guaranteed by
/// [`crate::plugins::registry::RulePipelines::resolve`]). An empty chain
/// is a no-op.
///
/// # Errors
///
/// The first failing worker stops the chain. Errors leave the executor
/// tagged with the offending worker's name: a worker's own
/// [`DocuvaultError::Plugin`] passes through, any other domain error is
/// wrapped into one. Backend `Io` errors bubble unchanged so callers can
/// tell transient storage failures from deterministic rejections.
pub async fn run_stage(
    stage: Stage,
    bindings: &[ResolvedBinding],
    document: &mut Document,
    rule: &DocTypeRule,
    backend: &dyn StorageBackend,
    tag_actions: &[TagAction],
) -> Result<()> {
    for binding in bindings {
        let name = binding.worker.name().to_string();
        debug!(
            code = %document.code,
            %stage,
            ordinal = binding.ordinal,
            plugin = %name,
            "running pipeline step"
        );

        let ctx = PipelineContext {
            rule,
            stage,
            backend,
            tag_actions,
            options: &binding.options,
        };

        if let Err(err) = binding.worker.work(document, &ctx).await {
            warn!(
                code = %document.code,
                %stage,
                ordinal = binding.ordinal,
                plugin = %name,
                error = %err,
                "pipeline step failed"
            );
            return Err(match err {
                e @ (DocuvaultError::Io(_) | DocuvaultError::Plugin { .. }) => e,
                other => DocuvaultError::plugin(name, other.to_string()),
            });
        }
    }
    Ok(())
}
