//! Error types for the document store
//!
//! This module defines the errors a host store reports to its callers.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Plugin-side failures (configuration, predicates) are defined by the plugin
//! crate and cross the host boundary as [`HookError`], which the store wraps
//! in [`Error::HookFailed`] so the failing write surfaces the original cause.

use crate::write::WriteEvent;
use thiserror::Error;

/// Boxed error returned by pre-write hooks
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the document store
#[derive(Debug, Error)]
pub enum Error {
    /// No document matched where one was required
    #[error("Document not found: {0}")]
    NotFound(String),

    /// A value does not match the declared field type
    #[error("Cast error on field '{field}': expected {expected}, got {actual}")]
    Cast {
        /// Field being written
        field: String,
        /// Declared type
        expected: &'static str,
        /// Type of the offending value
        actual: &'static str,
    },

    /// A field with this name is already declared on the schema
    #[error("Field already declared: {0}")]
    FieldExists(String),

    /// Invalid operation or state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A pre-write hook rejected the operation; nothing was persisted
    #[error("pre-{event} hook failed: {source}")]
    HookFailed {
        /// The write event whose hooks were running
        event: WriteEvent,
        /// The hook's error
        #[source]
        source: HookError,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
