//! Per-field "modified at" timestamps for modstamp schemas
//!
//! [`ModifiedAt`] is a [`SchemaPlugin`]. Attached to a schema it:
//!
//! - declares a `Date` field `field + suffix` for every tracked field, and a
//!   `Date` field per custom predicate (named as given)
//! - registers one pre-write hook per write pathway (save, filtered update,
//!   replace, insertMany) that stamps those fields before the write persists
//!
//! Tracked fields modified by the same write share one timestamp. Each
//! custom predicate that matches gets its own, read after it resolves.
//!
//! # Example
//!
//! ```rust,ignore
//! use modstamp_engine::{Model, Schema};
//! use modstamp_core::{fields_from_json, FieldType, Value};
//! use modstamp_plugin::{predicate, ModifiedAt, ModifiedAtOptions};
//! use serde_json::json;
//!
//! let mut schema = Schema::new()
//!     .field("name", FieldType::String)
//!     .field("status", FieldType::Number);
//! schema.plugin(&ModifiedAt::new(
//!     ModifiedAtOptions::new()
//!         .fields(["name"])
//!         .predicate("boughtAt", predicate::from_fn(|doc| doc.get("status") == Some(&Value::Int(2)))),
//! )?)?;
//!
//! let orders = Model::new("orders", schema);
//! let order = orders.create(fields_from_json(json!({"name": "Kitty", "status": 1}))).await?;
//! assert!(order.get_date("name_modifiedAt").is_some());
//! assert!(order.get_date("boughtAt").is_none());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod augment;
pub mod config;
pub mod decision;
pub mod error;
pub mod predicate;

pub use adapters::{
    normalize, ApplyMode, InsertManyAdapter, ReplaceAdapter, SaveAdapter, StampTarget, Stamper,
    UpdateAdapter,
};
pub use augment::augment;
pub use config::{
    Configuration, Defaults, ModifiedAtConfig, ModifiedAtOptions, PluginOptions, Resolver,
    DEFAULT_SUFFIX,
};
pub use decision::{decide, Stamps};
pub use error::{ConfigurationError, ModifiedAtError, PredicateError, Result};
pub use predicate::{Predicate, PredicateOutcome};

use modstamp_core::{Clock, SchemaHost, SchemaPlugin, SystemClock, WriteEvent};
use std::sync::Arc;
use tracing::info;

/// The modified-at schema plugin
#[derive(Debug, Clone)]
pub struct ModifiedAt {
    config: Arc<Configuration>,
    clock: Arc<dyn Clock>,
}

impl ModifiedAt {
    /// Resolve `options` with the standard defaults
    ///
    /// # Errors
    ///
    /// Returns [`ModifiedAtError::Configuration`] for invalid options.
    pub fn new(options: impl Into<PluginOptions>) -> Result<Self> {
        Self::with_resolver(&Resolver::new(), options)
    }

    /// Resolve `options` with an explicit resolver (custom defaults)
    ///
    /// # Errors
    ///
    /// Returns [`ModifiedAtError::Configuration`] for invalid options.
    pub fn with_resolver(resolver: &Resolver, options: impl Into<PluginOptions>) -> Result<Self> {
        Ok(Self::from_configuration(resolver.resolve(options)?))
    }

    /// Resolve loosely typed JSON options
    ///
    /// # Errors
    ///
    /// Returns [`ModifiedAtError::Configuration`] for any shape other than a
    /// field list or an options object.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        Ok(Self::from_configuration(Resolver::new().resolve_value(value)?))
    }

    /// Wrap an already resolved configuration
    pub fn from_configuration(config: Configuration) -> Self {
        Self {
            config: Arc::new(config),
            clock: Arc::new(SystemClock),
        }
    }

    /// Use a different clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Resolved configuration
    pub fn config(&self) -> &Configuration {
        &self.config
    }
}

impl SchemaPlugin for ModifiedAt {
    type Error = ModifiedAtError;

    fn apply(&self, schema: &mut dyn SchemaHost) -> Result<()> {
        augment(schema, &self.config)?;

        let stamper = Stamper::new(self.config.clone(), self.clock.clone());
        schema.register_pre_hook(&[WriteEvent::Save], Arc::new(SaveAdapter(stamper.clone())));
        schema.register_pre_hook(
            &WriteEvent::FILTERED_UPDATES,
            Arc::new(UpdateAdapter(stamper.clone())),
        );
        schema.register_pre_hook(&WriteEvent::REPLACES, Arc::new(ReplaceAdapter(stamper.clone())));
        schema.register_pre_hook(&[WriteEvent::InsertMany], Arc::new(InsertManyAdapter(stamper)));

        info!(
            tracked = self.config.tracked_fields().len(),
            predicates = self.config.predicates().len(),
            suffix = %self.config.suffix(),
            "Attached modified-at plugin"
        );
        Ok(())
    }
}
