//! Error types for Docuvault.
//!
//! All fallible operations return [`DocuvaultError`] through the [`Result`]
//! alias. The taxonomy separates load-time misconfiguration (`AmbiguousRule`,
//! `UnknownPlugin`, `Validation`) from per-request conditions the caller is
//! expected to handle (`NoMatchingRule`, `Plugin`, `NotFound`).
//!
//! # Error Handling Philosophy
//!
//! **System errors MUST always bubble up unchanged:**
//! - `DocuvaultError::Io` (from `std::io::Error`) - backend unavailability,
//!   permission errors, write failures. Callers may retry these with backoff;
//!   nothing in the pipeline retries internally.
//!
//! **Domain errors carry the context needed to act on them:**
//! - `Plugin` always names the plugin that rejected the document, so an
//!   operator can identify a misconfigured validator from the response alone.
//! - `NoMatchingRule` carries the submitted code; it is a user input error,
//!   not a fault.
use thiserror::Error;

/// Result type alias using `DocuvaultError`.
pub type Result<T> = std::result::Result<T, DocuvaultError>;

/// Main error type for all Docuvault operations.
///
/// # Variants
///
/// - `Io` - File system and I/O errors (always bubble up; retryable)
/// - `NoMatchingRule` - No active document type rule matches a code
/// - `AmbiguousRule` - Two active rules match the same canonical code (fatal at load)
/// - `UnknownPlugin` - A binding references an unregistered plugin (fatal at load)
/// - `Plugin` - A pipeline plugin rejected the document (recoverable)
/// - `NotFound` - Storage-level absence of a code or revision (recoverable)
/// - `Validation` - Invalid configuration or parameters
/// - `Serialization` - Sidecar/JSON serialization errors
#[derive(Debug, Error)]
pub enum DocuvaultError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no document type rule matches code '{code}'")]
    NoMatchingRule { code: String },

    #[error("ambiguous rule configuration: {message}")]
    AmbiguousRule { message: String },

    #[error("unknown plugin '{plugin_name}'")]
    UnknownPlugin { plugin_name: String },

    #[error("plugin error in '{plugin_name}': {message}")]
    Plugin { message: String, plugin_name: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl From<serde_json::Error> for DocuvaultError {
    fn from(err: serde_json::Error) -> Self {
        DocuvaultError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl DocuvaultError {
    /// Create a Validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            source: None,
        }
    }

    /// Create a Validation error with source.
    pub fn validation_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Validation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a Plugin error tagged with the offending plugin's name.
    pub fn plugin<S: Into<String>, N: Into<String>>(plugin_name: N, message: S) -> Self {
        Self::Plugin {
            message: message.into(),
            plugin_name: plugin_name.into(),
        }
    }

    /// Create a NotFound error.
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    /// Whether the error indicates a transient storage failure the caller
    /// may retry, as opposed to a deterministic rejection.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DocuvaultError::Io(_))
    }
}
