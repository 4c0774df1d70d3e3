//! MIME type sniffing and the supported-type table.
//!
//! Detection is content-based: the `infer` crate runs magic-byte matching
//! over the buffer, with a UTF-8 heuristic fallback for plain text (which
//! has no magic bytes). Extension lookup prefers the local table and falls
//! back to `mime_guess`.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const TIFF_MIME_TYPE: &str = "image/tiff";
pub const JPEG_MIME_TYPE: &str = "image/jpeg";
pub const GIF_MIME_TYPE: &str = "image/gif";
pub const PNG_MIME_TYPE: &str = "image/png";
pub const PLAIN_TEXT_MIME_TYPE: &str = "text/plain";
pub const LEGACY_WORD_MIME_TYPE: &str = "application/msword";
pub const LEGACY_EXCEL_MIME_TYPE: &str = "application/vnd.ms-excel";
pub const DOCX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const EXCEL_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Supported (MIME type, canonical extension) pairs.
///
/// This is the default allow-list for the filetype validator; individual
/// rule bindings can override it per rule.
pub static SUPPORTED_TYPES: &[(&str, &str)] = &[
    (PDF_MIME_TYPE, "pdf"),
    (TIFF_MIME_TYPE, "tiff"),
    (JPEG_MIME_TYPE, "jpg"),
    (GIF_MIME_TYPE, "gif"),
    (PNG_MIME_TYPE, "png"),
    (PLAIN_TEXT_MIME_TYPE, "txt"),
    (LEGACY_WORD_MIME_TYPE, "doc"),
    (LEGACY_EXCEL_MIME_TYPE, "xls"),
    (DOCX_MIME_TYPE, "docx"),
    (EXCEL_MIME_TYPE, "xlsx"),
];

static MIME_TO_EXT: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| SUPPORTED_TYPES.iter().copied().collect());

/// Default allow-list of MIME types, as owned strings.
pub fn default_allowed_types() -> Vec<String> {
    SUPPORTED_TYPES.iter().map(|(mime, _)| (*mime).to_string()).collect()
}

/// Sniff the MIME type of a byte buffer.
///
/// Magic-byte detection first; buffers with no recognizable signature that
/// decode as UTF-8 are reported as `text/plain`. Returns `None` when the
/// content is neither.
pub fn sniff_mimetype(content: &[u8]) -> Option<String> {
    if let Some(kind) = infer::get(content) {
        return Some(kind.mime_type().to_string());
    }
    if !content.is_empty() && std::str::from_utf8(content).is_ok() {
        return Some(PLAIN_TEXT_MIME_TYPE.to_string());
    }
    None
}

/// Canonical file extension for a MIME type.
///
/// Uses the supported-type table, then `mime_guess` for types outside it.
pub fn extension_for(mime_type: &str) -> Option<String> {
    if let Some(ext) = MIME_TO_EXT.get(mime_type) {
        return Some((*ext).to_string());
    }
    mime_guess::get_mime_extensions_str(mime_type)
        .and_then(|exts| exts.first())
        .map(|ext| (*ext).to_string())
}
