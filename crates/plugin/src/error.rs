//! Plugin error types
//!
//! Two families, matching the two places the plugin can fail:
//!
//! - [`ConfigurationError`]: raised while the plugin is built or attached to
//!   a schema; nothing is registered on failure
//! - [`PredicateError`]: raised while a write is being decided; the write is
//!   aborted and no derived field is touched
//!
//! Predicate errors reach the caller through the host store, which wraps
//! the hook failure; `source()` leads back to the predicate's own error.

use modstamp_core::HookError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for plugin operations
pub type Result<T> = std::result::Result<T, ModifiedAtError>;

/// Error returned while building or attaching the plugin
///
/// Predicate failures never surface here; they arrive during a write as the
/// source of the store's `Error::HookFailed`.
#[derive(Debug, Error)]
pub enum ModifiedAtError {
    /// Bad options or a setup conflict
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Configuration failure, surfaced when the plugin is built or attached
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Options are neither a field list nor an options object
    #[error("Missing options or type error: {0}")]
    MissingOrInvalidOptions(String),

    /// An empty field name or suffix
    #[error("Invalid field name: {0:?}")]
    InvalidFieldName(String),

    /// Two tracked fields or predicates resolve to the same derived field
    #[error("Derived field '{0}' is configured more than once")]
    DuplicateDerivedField(String),

    /// The schema already declares a field with the derived name
    #[error("Derived field '{field}' collides with an existing schema field")]
    FieldCollision {
        /// Derived field name
        field: String,
        /// Store error reported by the schema
        #[source]
        source: modstamp_core::Error,
    },

    /// Malformed TOML configuration
    #[error("Failed to parse modified-at config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Config file could not be read
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// A custom predicate failed; the whole decision is abandoned
#[derive(Debug, Error)]
#[error("Predicate for derived field '{field}' failed: {source}")]
pub struct PredicateError {
    /// Derived field whose predicate failed
    pub field: String,
    /// The predicate's own error
    #[source]
    pub source: HookError,
}
