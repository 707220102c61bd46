//! Core types and traits for modstamp
//!
//! This crate defines the foundational types shared by the document store
//! and the plugins that extend it:
//! - Value / FieldMap: document value model (with a native `Date`)
//! - Timestamp: microsecond wall-clock instants
//! - FieldType / FieldOptions / FieldDef: schema field declarations
//! - WriteEvent, per-operation options, UpdateDoc, PendingWrite
//! - Traits: SchemaHost, PreHook, SaveTarget, SchemaPlugin, Clock
//! - Error: store error hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod schema;
pub mod timestamp;
pub mod traits;
pub mod value;
pub mod write;

pub use error::{Error, HookError, Result};
pub use schema::{FieldDef, FieldOptions, FieldType};
pub use timestamp::Timestamp;
pub use traits::{Clock, PreHook, SaveTarget, SchemaHost, SchemaPlugin, SystemClock};
pub use value::{fields_from_json, FieldMap, Value};
pub use write::{
    InsertManyOptions, PendingWrite, ReplaceOptions, SaveOptions, UpdateDoc, UpdateOptions,
    WriteEvent,
};
