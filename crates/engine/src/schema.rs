//! Document schema
//!
//! A schema declares the typed top-level fields of a model, their options
//! (selectability, defaults) and the pre-write hooks that run for it.
//!
//! ## Strict Mode
//!
//! Schemas are strict: undeclared fields are stripped when a document is
//! cast for storage. A plugin that wants to persist extra fields must
//! declare them first via [`SchemaHost::declare_field`].
//!
//! ## Example
//!
//! ```
//! use modstamp_engine::Schema;
//! use modstamp_core::FieldType;
//!
//! let schema = Schema::new()
//!     .field("name", FieldType::String)
//!     .field("age", FieldType::Number);
//! assert!(schema.field_def("name").is_some());
//! ```

use crate::hooks::HookRegistry;
use modstamp_core::{
    Error, FieldDef, FieldMap, FieldOptions, FieldType, PreHook, Result, SchemaHost, SchemaPlugin,
    Value, WriteEvent,
};
use std::sync::Arc;
use tracing::debug;

/// Name of the identifier field every document carries
pub const ID_FIELD: &str = "_id";

/// Typed field declarations plus pre-write hooks
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Declared fields in declaration order
    fields: Vec<(String, FieldDef)>,
    hooks: HookRegistry,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a selectable field without a default
    ///
    /// Redeclaring a name replaces the earlier definition.
    pub fn field(self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.field_with(name, field_type, FieldOptions::default())
    }

    /// Declare a field with explicit options
    ///
    /// Redeclaring a name replaces the earlier definition.
    pub fn field_with(
        mut self,
        name: impl Into<String>,
        field_type: FieldType,
        options: FieldOptions,
    ) -> Self {
        let name = name.into();
        let def = FieldDef::new(field_type, options);
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = def,
            None => self.fields.push((name, def)),
        }
        self
    }

    /// Apply a plugin to this schema
    ///
    /// # Errors
    ///
    /// Propagates the plugin's setup error.
    pub fn plugin<P: SchemaPlugin>(&mut self, plugin: &P) -> std::result::Result<(), P::Error> {
        plugin.apply(self)
    }

    /// Look up a field declaration
    pub fn field_def(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    /// Declared field names in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// The schema's hook registry
    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Cast a document for storage
    ///
    /// Strips undeclared fields and rejects values whose type does not match
    /// the declaration. `_id` is always kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cast`] on a type mismatch.
    pub fn cast(&self, fields: FieldMap) -> Result<FieldMap> {
        let mut cast = FieldMap::new();
        for (name, value) in fields {
            if name == ID_FIELD {
                cast.insert(name, value);
                continue;
            }
            match self.field_def(&name) {
                Some(def) => {
                    if !def.field_type.accepts(&value) {
                        return Err(Error::Cast {
                            field: name,
                            expected: def.field_type.name(),
                            actual: value.type_name(),
                        });
                    }
                    cast.insert(name, value);
                }
                None => {
                    debug!(field = %name, "Stripped undeclared field");
                }
            }
        }
        Ok(cast)
    }

    /// Fill declared defaults for absent fields
    ///
    /// Returns the names of fields that were filled.
    pub fn apply_defaults(&self, fields: &mut FieldMap) -> Vec<String> {
        let mut filled = Vec::new();
        for (name, def) in &self.fields {
            if let Some(default) = &def.options.default {
                if !fields.contains_key(name) {
                    fields.insert(name.clone(), default.clone());
                    filled.push(name.clone());
                }
            }
        }
        filled
    }

    /// Whether a field is hidden from default projections
    pub fn is_deselected(&self, name: &str) -> bool {
        self.field_def(name).is_some_and(|d| !d.options.select)
    }
}

impl SchemaHost for Schema {
    fn declare_field(
        &mut self,
        name: &str,
        field_type: FieldType,
        options: FieldOptions,
    ) -> Result<()> {
        if name == ID_FIELD || self.has_field(name) {
            return Err(Error::FieldExists(name.to_string()));
        }
        debug!(field = %name, field_type = %field_type, select = options.select, "Declared field");
        self.fields
            .push((name.to_string(), FieldDef::new(field_type, options)));
        Ok(())
    }

    fn has_field(&self, name: &str) -> bool {
        self.field_def(name).is_some()
    }

    fn register_pre_hook(&mut self, events: &[WriteEvent], hook: Arc<dyn PreHook>) {
        self.hooks.register(events, hook);
    }
}

/// Build a value for an `_id` field
pub(crate) fn id_value(id: &str) -> Value {
    Value::String(id.to_string())
}
