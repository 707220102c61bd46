//! modstamp - per-field "last modified" timestamps for document stores
//!
//! Attach the [`ModifiedAt`] plugin to a schema and every write that touches
//! a tracked field stamps a companion `Date` field (`field + suffix`).
//! Custom predicates stamp their own field whenever they hold for the
//! document being written.
//!
//! # Quick Start
//!
//! ```ignore
//! use modstamp::{fields_from_json, FieldType, Model, ModifiedAt, Schema};
//! use serde_json::json;
//!
//! let mut schema = Schema::new()
//!     .field("name", FieldType::String)
//!     .field("age", FieldType::Number);
//! schema.plugin(&ModifiedAt::new(["name", "age"])?)?;
//!
//! let cats = Model::new("cats", schema);
//! let kitty = cats.create(fields_from_json(json!({"name": "Kitty", "age": 1}))).await?;
//! assert!(kitty.get_date("age_modifiedAt").is_some());
//! ```
//!
//! # Architecture
//!
//! - `modstamp-core`: value model, timestamps and the host contracts
//!   (`SchemaHost`, `PreHook`, `SaveTarget`, `SchemaPlugin`)
//! - `modstamp-engine`: an in-memory document store implementing them
//! - `modstamp-plugin`: the plugin itself, written against the contracts only

pub use modstamp_core::*;
pub use modstamp_engine::{Document, Model, Projection, Schema, UpdateResult, ID_FIELD};
pub use modstamp_plugin::{
    predicate, ConfigurationError, Configuration, Defaults, ModifiedAt, ModifiedAtConfig,
    ModifiedAtError, ModifiedAtOptions, PluginOptions, Predicate, PredicateError,
    PredicateOutcome, Resolver, DEFAULT_SUFFIX,
};
