//! File type validation worker.
//!
//! Sniffs the buffer's real content type from magic bytes and rejects
//! documents outside the allow-list, regardless of what the upload claims
//! to be. On success the document is annotated with the detected mimetype
//! and its canonical extension.

use crate::core::mime;
use crate::error::{DocuvaultError, Result};
use crate::plugins::worker::{DocumentWorker, PipelineContext, Stage};
use crate::plugins::Plugin;
use crate::types::Document;
use async_trait::async_trait;

/// Sniffing buffers the whole file; cap what we are willing to hold so
/// adversarial uploads cannot exhaust memory.
const DEFAULT_MAX_BYTES: u64 = 64 * 1024 * 1024;

/// Binding options:
///
/// - `allowed_mimetypes` (array of strings): overrides the default
///   allow-list from the supported-type table
/// - `max_bytes` (integer): overrides the maximum buffer size
#[derive(Debug)]
pub struct FileTypeValidator {
    default_allowed: Vec<String>,
}

impl FileTypeValidator {
    pub fn new() -> Self {
        Self {
            default_allowed: mime::default_allowed_types(),
        }
    }

    fn allowed_types(&self, ctx: &PipelineContext<'_>) -> Vec<String> {
        ctx.option("allowed_mimetypes")
            .and_then(|v| v.as_array())
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_else(|| self.default_allowed.clone())
    }
}

impl Default for FileTypeValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for FileTypeValidator {
    fn name(&self) -> &str {
        "filetype-validator"
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
        "Validates document type against supported types"
    }
}

#[async_trait]
impl DocumentWorker for FileTypeValidator {
    async fn work(&self, document: &mut Document, ctx: &PipelineContext<'_>) -> Result<()> {
        let content = document
            .content
            .as_deref()
            .ok_or_else(|| DocuvaultError::plugin(self.name(), "File buffer not initialized"))?;

        let max_bytes = ctx
            .option("max_bytes")
            .and_then(|v| v.as_u64())
            .unwrap_or(DEFAULT_MAX_BYTES);
        if content.len() as u64 > max_bytes {
            return Err(DocuvaultError::plugin(
                self.name(),
                format!("file of {} bytes exceeds limit of {} bytes", content.len(), max_bytes),
            ));
        }

        let detected = mime::sniff_mimetype(content)
            .ok_or_else(|| DocuvaultError::plugin(self.name(), "could not determine file type"))?;

        if !self.allowed_types(ctx).iter().any(|m| m == &detected) {
            return Err(DocuvaultError::plugin(
                self.name(),
                format!("File type {detected} is not supported"),
            ));
        }

        document.suggested_extension = mime::extension_for(&detected);
        document.mimetype = Some(detected);
        Ok(())
    }

    fn supported_stages(&self) -> &[Stage] {
        &[Stage::BeforeStore]
    }
}
