//! In-memory document with change tracking
//!
//! A [`Document`] is what `create`, `save` and the read operations hand
//! back. It remembers which top-level paths were set since it was loaded
//! (or created), which is what `save` hooks see as the modified-path set.

use crate::schema::ID_FIELD;
use modstamp_core::{FieldMap, SaveTarget, Timestamp, Value};
use std::collections::BTreeSet;

/// A document loaded from, or about to be written to, a model
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    fields: FieldMap,
    modified: BTreeSet<String>,
    is_new: bool,
}

impl Document {
    /// A fresh document; every provided path counts as modified
    pub(crate) fn new_unsaved(fields: FieldMap, provided: impl IntoIterator<Item = String>) -> Self {
        Self {
            fields,
            modified: provided.into_iter().collect(),
            is_new: true,
        }
    }

    /// A document as read back from storage
    pub(crate) fn loaded(fields: FieldMap) -> Self {
        Self {
            fields,
            modified: BTreeSet::new(),
            is_new: false,
        }
    }

    /// The `_id` of this document
    pub fn id(&self) -> Option<&str> {
        self.fields.get(ID_FIELD).and_then(Value::as_str)
    }

    /// Get a field value
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.fields.get(path)
    }

    /// Get a `Date` field
    pub fn get_date(&self, path: &str) -> Option<Timestamp> {
        self.get(path).and_then(Value::as_date)
    }

    /// Set a field, marking it modified if the value changed
    pub fn set(&mut self, path: impl Into<String>, value: impl Into<Value>) {
        let path = path.into();
        let value = value.into();
        if self.fields.get(&path) == Some(&value) {
            return;
        }
        self.fields.insert(path.clone(), value);
        self.modified.insert(path);
    }

    /// Whether `path` changed since load
    pub fn is_modified(&self, path: &str) -> bool {
        self.modified.contains(path)
    }

    /// Whether this document has never been persisted
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// All field values
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Consume into the field map
    pub fn into_fields(self) -> FieldMap {
        self.fields
    }

    /// Render as plain JSON (dates as RFC 3339 strings)
    pub fn to_json(&self) -> serde_json::Value {
        Value::Object(self.fields.clone()).to_json()
    }

    /// Replace the body after a successful write and reset change tracking
    pub(crate) fn mark_persisted(&mut self, fields: FieldMap) {
        self.fields = fields;
        self.modified.clear();
        self.is_new = false;
    }
}

impl SaveTarget for Document {
    fn modified_paths(&self) -> Vec<String> {
        self.modified.iter().cloned().collect()
    }

    fn fields(&self) -> &FieldMap {
        &self.fields
    }

    fn set_field(&mut self, path: &str, value: Value) {
        self.set(path, value);
    }
}
