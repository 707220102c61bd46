//! Host capability traits
//!
//! These traits are the seam between a document store and the plugins that
//! extend it. A plugin sees only these contracts and never a concrete store:
//!
//! - [`SchemaHost`]: declare typed fields, register pre-write hooks
//! - [`PreHook`]: async handler run before a write is persisted
//! - [`SaveTarget`]: the in-memory document handed to `save` hooks
//! - [`SchemaPlugin`]: something that configures a schema once
//! - [`Clock`]: source of "now"

use crate::error::{HookError, Result};
use crate::schema::{FieldOptions, FieldType};
use crate::timestamp::Timestamp;
use crate::value::{FieldMap, Value};
use crate::write::{PendingWrite, WriteEvent};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Schema-side capabilities a plugin may use during setup
pub trait SchemaHost {
    /// Declare a new typed field
    ///
    /// # Errors
    ///
    /// Fails if a field with the same name is already declared.
    fn declare_field(&mut self, name: &str, field_type: FieldType, options: FieldOptions)
        -> Result<()>;

    /// Whether a field is already declared
    fn has_field(&self, name: &str) -> bool;

    /// Register `hook` to run before every write of the given events
    ///
    /// Hooks run in registration order.
    fn register_pre_hook(&mut self, events: &[WriteEvent], hook: Arc<dyn PreHook>);
}

/// Handler run before a write reaches storage
///
/// The write proceeds only after `run` returns `Ok`. An error aborts the
/// write; nothing is persisted.
#[async_trait]
pub trait PreHook: Send + Sync {
    /// Inspect and/or mutate the pending write
    async fn run(&self, event: WriteEvent, write: PendingWrite<'_>) -> std::result::Result<(), HookError>;
}

/// In-memory document being saved
pub trait SaveTarget: Send {
    /// Top-level paths changed since the document was loaded or created
    fn modified_paths(&self) -> Vec<String>;

    /// Current field values
    fn fields(&self) -> &FieldMap;

    /// Set a field directly on the document
    fn set_field(&mut self, path: &str, value: Value);
}

/// A reusable schema extension, applied once per schema
pub trait SchemaPlugin {
    /// Setup failure
    type Error: std::error::Error + Send + Sync + 'static;

    /// Configure `schema`
    fn apply(&self, schema: &mut dyn SchemaHost) -> std::result::Result<(), Self::Error>;
}

/// Source of wall-clock time
pub trait Clock: Send + Sync + fmt::Debug {
    /// The current instant
    fn now(&self) -> Timestamp;
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
