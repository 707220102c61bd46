//! Write events, per-operation options and pending-write views
//!
//! A host store dispatches every write to its pre-hooks as a
//! [`PendingWrite`]: a mutable view of the operation in the shape of its
//! pathway. Hooks may inspect and mutate it; the store persists whatever the
//! view holds once every hook has returned.
//!
//! ## Pathways
//!
//! | Event(s) | View |
//! |---|---|
//! | `save` | [`PendingWrite::Save`] - the in-memory document |
//! | `update`, `updateOne`, `updateMany`, `findOneAndUpdate` | [`PendingWrite::Update`] - filter + update document |
//! | `replaceOne`, `findOneAndReplace` | [`PendingWrite::Replace`] - filter + replacement |
//! | `insertMany` | [`PendingWrite::InsertMany`] - raw candidate documents |

use crate::traits::SaveTarget;
use crate::value::{FieldMap, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// WriteEvent
// =============================================================================

/// Named write event a pre-hook can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WriteEvent {
    /// Document save (create or in-place mutation)
    Save,
    /// Legacy update, single or multi depending on options
    Update,
    /// Update the first matching document
    UpdateOne,
    /// Update every matching document
    UpdateMany,
    /// Update the first match and return it
    FindOneAndUpdate,
    /// Replace the first matching document
    ReplaceOne,
    /// Replace the first match and return it
    FindOneAndReplace,
    /// Insert a batch of raw documents
    InsertMany,
}

impl WriteEvent {
    /// Filtered-update events
    pub const FILTERED_UPDATES: [WriteEvent; 4] = [
        WriteEvent::FindOneAndUpdate,
        WriteEvent::Update,
        WriteEvent::UpdateOne,
        WriteEvent::UpdateMany,
    ];

    /// Replace events
    pub const REPLACES: [WriteEvent; 2] = [WriteEvent::ReplaceOne, WriteEvent::FindOneAndReplace];

    /// Canonical event name
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteEvent::Save => "save",
            WriteEvent::Update => "update",
            WriteEvent::UpdateOne => "updateOne",
            WriteEvent::UpdateMany => "updateMany",
            WriteEvent::FindOneAndUpdate => "findOneAndUpdate",
            WriteEvent::ReplaceOne => "replaceOne",
            WriteEvent::FindOneAndReplace => "findOneAndReplace",
            WriteEvent::InsertMany => "insertMany",
        }
    }
}

impl fmt::Display for WriteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Per-operation options
// =============================================================================

/// Options for `save` / `create`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// `Some(false)` skips modified-at stamping for this call
    pub modified_at: Option<bool>,
}

impl SaveOptions {
    /// Set the per-call modified-at flag
    pub fn with_modified_at(mut self, enabled: bool) -> Self {
        self.modified_at = Some(enabled);
        self
    }
}

/// Options for filtered updates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Insert a document built from the filter when nothing matches
    pub upsert: bool,
    /// For `update`: touch every match instead of the first
    pub multi: bool,
    /// For `findOneAndUpdate`: return the document after the update
    pub return_new: bool,
    /// `Some(false)` skips modified-at stamping for this call
    pub modified_at: Option<bool>,
}

impl UpdateOptions {
    /// Set the per-call modified-at flag
    pub fn with_modified_at(mut self, enabled: bool) -> Self {
        self.modified_at = Some(enabled);
        self
    }

    /// Enable upsert
    pub fn upsert(mut self) -> Self {
        self.upsert = true;
        self
    }

    /// Enable multi-document `update`
    pub fn multi(mut self) -> Self {
        self.multi = true;
        self
    }

    /// Return the updated document from `findOneAndUpdate`
    pub fn return_new(mut self) -> Self {
        self.return_new = true;
        self
    }
}

/// Options for replace operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceOptions {
    /// Insert the replacement when nothing matches
    pub upsert: bool,
    /// `Some(true)` opts in to modified-at stamping for this call
    pub modified_at: Option<bool>,
}

impl ReplaceOptions {
    /// Set the per-call modified-at flag
    pub fn with_modified_at(mut self, enabled: bool) -> Self {
        self.modified_at = Some(enabled);
        self
    }
}

/// Options for `insertMany`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertManyOptions {
    /// `Some(false)` skips modified-at stamping for this call
    pub modified_at: Option<bool>,
}

impl InsertManyOptions {
    /// Set the per-call modified-at flag
    pub fn with_modified_at(mut self, enabled: bool) -> Self {
        self.modified_at = Some(enabled);
        self
    }
}

// =============================================================================
// UpdateDoc
// =============================================================================

/// An update document: plain field assignments and/or `$`-operators
///
/// Plain top-level fields are assignments (equivalent to `$set`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdateDoc(FieldMap);

impl UpdateDoc {
    /// `$set` operator key
    pub const SET: &'static str = "$set";

    /// Create an empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing map
    pub fn from_fields(fields: FieldMap) -> Self {
        UpdateDoc(fields)
    }

    /// Build from a JSON object literal
    pub fn from_json(json: serde_json::Value) -> Self {
        UpdateDoc(crate::value::fields_from_json(json))
    }

    /// Whether a top-level key is an operator
    pub fn is_operator(key: &str) -> bool {
        key.starts_with('$')
    }

    /// Raw entries
    pub fn fields(&self) -> &FieldMap {
        &self.0
    }

    /// Mutable raw entries
    pub fn fields_mut(&mut self) -> &mut FieldMap {
        &mut self.0
    }

    /// Unwrap into the raw map
    pub fn into_fields(self) -> FieldMap {
        self.0
    }

    /// Whether the update has no entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Record `field = value` under `$set`, creating the operator if absent
    ///
    /// A non-object `$set` entry is replaced.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let entry = self
            .0
            .entry(Self::SET.to_string())
            .or_insert_with(|| Value::Object(FieldMap::new()));
        if !entry.is_object() {
            *entry = Value::Object(FieldMap::new());
        }
        if let Some(set) = entry.as_object_mut() {
            set.insert(field.into(), value.into());
        }
    }
}

impl From<FieldMap> for UpdateDoc {
    fn from(fields: FieldMap) -> Self {
        UpdateDoc(fields)
    }
}

// =============================================================================
// PendingWrite
// =============================================================================

/// Mutable view of a write about to be persisted
pub enum PendingWrite<'a> {
    /// Document save
    Save {
        /// The in-memory document
        doc: &'a mut dyn SaveTarget,
        /// Per-call options
        options: &'a SaveOptions,
    },
    /// Filtered update
    Update {
        /// Filter criteria
        filter: &'a FieldMap,
        /// Pending update document
        update: &'a mut UpdateDoc,
        /// Per-call options
        options: &'a UpdateOptions,
    },
    /// Full replacement
    Replace {
        /// Filter criteria
        filter: &'a FieldMap,
        /// Replacement payload, sent as-is after hooks return
        replacement: &'a mut FieldMap,
        /// Per-call options
        options: &'a ReplaceOptions,
    },
    /// Bulk insert
    InsertMany {
        /// Candidate documents prior to persistence
        docs: &'a mut [FieldMap],
        /// Shared per-call options
        options: &'a InsertManyOptions,
    },
}

impl<'a> PendingWrite<'a> {
    /// Reborrow for handing to one hook while keeping the view for the next
    pub fn reborrow(&mut self) -> PendingWrite<'_> {
        match self {
            PendingWrite::Save { doc, options } => PendingWrite::Save {
                doc: &mut **doc,
                options: *options,
            },
            PendingWrite::Update {
                filter,
                update,
                options,
            } => PendingWrite::Update {
                filter: *filter,
                update: &mut **update,
                options: *options,
            },
            PendingWrite::Replace {
                filter,
                replacement,
                options,
            } => PendingWrite::Replace {
                filter: *filter,
                replacement: &mut **replacement,
                options: *options,
            },
            PendingWrite::InsertMany { docs, options } => PendingWrite::InsertMany {
                docs: &mut **docs,
                options: *options,
            },
        }
    }

    /// Short pathway name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            PendingWrite::Save { .. } => "save",
            PendingWrite::Update { .. } => "update",
            PendingWrite::Replace { .. } => "replace",
            PendingWrite::InsertMany { .. } => "insertMany",
        }
    }
}

impl fmt::Debug for PendingWrite<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingWrite::Save { doc, options } => f
                .debug_struct("Save")
                .field("modified_paths", &doc.modified_paths())
                .field("options", options)
                .finish(),
            PendingWrite::Update {
                filter,
                update,
                options,
            } => f
                .debug_struct("Update")
                .field("filter", filter)
                .field("update", update)
                .field("options", options)
                .finish(),
            PendingWrite::Replace {
                filter,
                replacement,
                options,
            } => f
                .debug_struct("Replace")
                .field("filter", filter)
                .field("replacement", replacement)
                .field("options", options)
                .finish(),
            PendingWrite::InsertMany { docs, options } => f
                .debug_struct("InsertMany")
                .field("count", &docs.len())
                .field("options", options)
                .finish(),
        }
    }
}
