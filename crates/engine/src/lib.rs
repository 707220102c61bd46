//! In-memory document store for modstamp
//!
//! The engine is the host side of the plugin contract defined in
//! `modstamp-core`:
//!
//! - [`Schema`]: typed, strict field declarations plus pre-write hooks;
//!   implements [`modstamp_core::SchemaHost`]
//! - [`Model`]: a named collection with save / insert-many / update /
//!   replace / find operations, each dispatching its write event to the
//!   schema's hooks before persisting
//! - [`Document`]: in-memory document with modified-path tracking;
//!   implements [`modstamp_core::SaveTarget`]
//!
//! # Example
//!
//! ```rust,ignore
//! use modstamp_engine::{Model, Schema};
//! use modstamp_core::{fields_from_json, FieldType};
//! use serde_json::json;
//!
//! let schema = Schema::new().field("name", FieldType::String);
//! let cats = Model::new("cats", schema);
//! let kitty = cats.create(fields_from_json(json!({"name": "Kitty"}))).await?;
//! assert_eq!(cats.count(), 1);
//! assert!(kitty.id().is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod filter;
pub mod hooks;
pub mod model;
pub mod schema;
pub mod update;

pub use document::Document;
pub use filter::Projection;
pub use hooks::{HookEntry, HookRegistry};
pub use model::{Model, UpdateResult};
pub use schema::{Schema, ID_FIELD};
