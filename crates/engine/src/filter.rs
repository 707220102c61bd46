//! Filter matching and projection
//!
//! Filters are top-level equality maps: a document matches when every
//! filter entry equals the document's value for that field. Entries whose
//! key starts with `$` are query operators and are not supported.

use crate::schema::{Schema, ID_FIELD};
use modstamp_core::{Error, FieldMap, Result, Value};

/// Whether `doc` satisfies every equality in `filter`
///
/// An absent field matches a `null` filter value.
pub fn matches(doc: &FieldMap, filter: &FieldMap) -> bool {
    filter.iter().all(|(key, expected)| match doc.get(key) {
        Some(actual) => actual == expected,
        None => expected.is_null(),
    })
}

/// Reject filters the store cannot evaluate
///
/// # Errors
///
/// Returns [`Error::InvalidOperation`] for top-level `$` keys or values that
/// are operator objects such as `{"$gt": 1}`.
pub fn validate(filter: &FieldMap) -> Result<()> {
    for (key, value) in filter {
        if key.starts_with('$') {
            return Err(Error::InvalidOperation(format!(
                "Unsupported filter operator '{}'",
                key
            )));
        }
        if let Some(obj) = value.as_object() {
            if let Some(op) = obj.keys().find(|k| k.starts_with('$')) {
                return Err(Error::InvalidOperation(format!(
                    "Unsupported filter operator '{}' on field '{}'",
                    op, key
                )));
            }
        }
    }
    Ok(())
}

/// Fields an upsert seeds its new document with
///
/// Every equality entry of the filter, `_id` included.
pub fn upsert_seed(filter: &FieldMap) -> FieldMap {
    filter.clone()
}

/// Filter selecting a single document by id
pub fn by_id(id: &str) -> FieldMap {
    let mut filter = FieldMap::new();
    filter.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    filter
}

/// Which fields a read returns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    /// Every field except those declared with `select: false`
    #[default]
    Default,
    /// Only the listed fields, plus `_id`
    Include(Vec<String>),
}

impl Projection {
    /// Include only the given fields
    pub fn include<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection::Include(fields.into_iter().map(Into::into).collect())
    }

    /// Apply to a stored document
    pub fn apply(&self, schema: &Schema, doc: &FieldMap) -> FieldMap {
        match self {
            Projection::Default => doc
                .iter()
                .filter(|(k, _)| !schema.is_deselected(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            Projection::Include(fields) => doc
                .iter()
                .filter(|(k, _)| k.as_str() == ID_FIELD || fields.iter().any(|f| f == *k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}
