//! Schema field definitions
//!
//! Describes the typed fields a host schema declares. Plugins add fields
//! through [`crate::traits::SchemaHost::declare_field`] using these types.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// Int or Float
    Number,
    /// Boolean
    Bool,
    /// Point in time
    Date,
    /// Any value, no casting
    Mixed,
}

impl FieldType {
    /// Name used in cast errors
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "String",
            FieldType::Number => "Number",
            FieldType::Bool => "Bool",
            FieldType::Date => "Date",
            FieldType::Mixed => "Mixed",
        }
    }

    /// Whether `value` can be stored in a field of this type
    ///
    /// Null is accepted by every type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) | (FieldType::Mixed, _) => true,
            (FieldType::String, Value::String(_)) => true,
            (FieldType::Number, Value::Int(_) | Value::Float(_)) => true,
            (FieldType::Bool, Value::Bool(_)) => true,
            (FieldType::Date, Value::Date(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-field options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOptions {
    /// Included in default projections when documents are loaded
    pub select: bool,
    /// Value filled in on new documents when the field is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            select: true,
            default: None,
        }
    }
}

impl FieldOptions {
    /// Options with the given selectability and no default
    pub fn selectable(select: bool) -> Self {
        Self {
            select,
            default: None,
        }
    }

    /// Attach a default value
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// A declared field: its type and options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Declared type
    pub field_type: FieldType,
    /// Options
    pub options: FieldOptions,
}

impl FieldDef {
    /// Create a field definition
    pub fn new(field_type: FieldType, options: FieldOptions) -> Self {
        Self {
            field_type,
            options,
        }
    }
}
