//! Write-kind adapters
//!
//! One pre-hook per write pathway. Each one reads its pathway's view of the
//! pending write, honours the per-call `modified_at` flag, runs the
//! decision engine and writes the stamps back before the store persists.
//!
//! | Pathway | Modified paths | Candidate | Stamps go to | Runs by default |
//! |---|---|---|---|---|
//! | save | paths changed in memory | the document | the document | yes |
//! | filtered update | keys of the normalized update | filter + normalized update | the update's `$set` | yes |
//! | replace | keys of the normalized replacement | filter + normalized replacement | the replacement | no, needs `Some(true)` |
//! | insertMany | keys of each document | the document | the document | yes |

use crate::config::Configuration;
use crate::decision::{decide, Stamps};
use crate::error::PredicateError;
use async_trait::async_trait;
use modstamp_core::{
    Clock, FieldMap, HookError, PendingWrite, PreHook, SaveTarget, UpdateDoc, Value, WriteEvent,
};
use std::sync::Arc;
use tracing::debug;

/// Update operators whose fields count as modified
pub const TRACKED_OPERATORS: [&str; 4] = ["$mul", "$inc", "$currentDate", "$set"];

/// How stamps are written into a pathway's payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// Assign the derived field directly on the document or payload
    DirectFieldSet,
    /// Record the derived field under the update document's `$set`
    UpdateDocSet,
}

/// Destination for a decision's stamps
pub enum StampTarget<'a> {
    /// In-memory document being saved
    Document(&'a mut dyn SaveTarget),
    /// Pending update document
    Update(&'a mut UpdateDoc),
    /// Plain field map (replacement or bulk-insert candidate)
    Fields(&'a mut FieldMap),
}

impl StampTarget<'_> {
    /// Apply mode implied by the target
    pub fn mode(&self) -> ApplyMode {
        match self {
            StampTarget::Update(_) => ApplyMode::UpdateDocSet,
            StampTarget::Document(_) | StampTarget::Fields(_) => ApplyMode::DirectFieldSet,
        }
    }

    /// Write every stamp as a `Date` value
    pub fn apply(&mut self, stamps: &Stamps) {
        for (field, at) in stamps {
            let value = Value::Date(*at);
            match self {
                StampTarget::Document(doc) => doc.set_field(field, value),
                StampTarget::Update(update) => update.set(field.clone(), value),
                StampTarget::Fields(fields) => {
                    fields.insert(field.clone(), value);
                }
            }
        }
    }
}

/// Flatten an update or replacement payload into plain field entries
///
/// Plain fields are kept. Object arguments of [`TRACKED_OPERATORS`] are
/// merged in as if they were plain fields. Every other operator is dropped.
pub fn normalize(payload: &FieldMap) -> FieldMap {
    let mut flat = FieldMap::new();
    for (key, value) in payload {
        if !UpdateDoc::is_operator(key) {
            flat.insert(key.clone(), value.clone());
        }
    }
    for op in TRACKED_OPERATORS {
        if let Some(args) = payload.get(op).and_then(Value::as_object) {
            flat.extend(args.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }
    flat
}

/// Filter entries overlaid with the payload's; the payload wins
fn merge_candidate(filter: &FieldMap, payload: &FieldMap) -> FieldMap {
    let mut candidate = filter.clone();
    candidate.extend(payload.iter().map(|(k, v)| (k.clone(), v.clone())));
    candidate
}

// ============================================================================
// Shared state
// ============================================================================

/// Configuration and clock shared by every adapter of one plugin
#[derive(Debug, Clone)]
pub struct Stamper {
    config: Arc<Configuration>,
    clock: Arc<dyn Clock>,
}

impl Stamper {
    /// Create from a resolved configuration and a clock
    pub fn new(config: Arc<Configuration>, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    async fn decide(&self, modified_paths: &[String], candidate: &FieldMap) -> Result<Stamps, PredicateError> {
        decide(&self.config, modified_paths, candidate, self.clock.as_ref()).await
    }
}

fn applied(event: WriteEvent, mode: ApplyMode, stamps: &Stamps) {
    debug!(event = %event, mode = ?mode, stamps = stamps.len(), "Applied modified-at stamps");
}

fn skipped(event: WriteEvent, reason: &'static str) {
    debug!(event = %event, reason, "Skipped modified-at stamping");
}

// ============================================================================
// Adapters
// ============================================================================

/// `save` pathway
#[derive(Debug, Clone)]
pub struct SaveAdapter(pub Stamper);

#[async_trait]
impl PreHook for SaveAdapter {
    async fn run(&self, event: WriteEvent, write: PendingWrite<'_>) -> Result<(), HookError> {
        let PendingWrite::Save { doc, options } = write else {
            return Ok(());
        };
        if options.modified_at == Some(false) {
            skipped(event, "disabled for this call");
            return Ok(());
        }

        let paths = doc.modified_paths();
        let candidate = doc.fields().clone();
        let stamps = self.0.decide(&paths, &candidate).await?;
        let mut target = StampTarget::Document(doc);
        target.apply(&stamps);
        applied(event, target.mode(), &stamps);
        Ok(())
    }
}

/// `update`, `updateOne`, `updateMany` and `findOneAndUpdate` pathways
#[derive(Debug, Clone)]
pub struct UpdateAdapter(pub Stamper);

#[async_trait]
impl PreHook for UpdateAdapter {
    async fn run(&self, event: WriteEvent, write: PendingWrite<'_>) -> Result<(), HookError> {
        let PendingWrite::Update {
            filter,
            update,
            options,
        } = write
        else {
            return Ok(());
        };
        if options.modified_at == Some(false) {
            skipped(event, "disabled for this call");
            return Ok(());
        }

        let normalized = normalize(update.fields());
        let paths: Vec<String> = normalized.keys().cloned().collect();
        let candidate = merge_candidate(filter, &normalized);
        let stamps = self.0.decide(&paths, &candidate).await?;
        let mut target = StampTarget::Update(update);
        target.apply(&stamps);
        applied(event, target.mode(), &stamps);
        Ok(())
    }
}

/// `replaceOne` and `findOneAndReplace` pathways
///
/// Opt-in only: a replace drops every field not in the replacement, so
/// stamping runs only when the call passes `modified_at: Some(true)`.
#[derive(Debug, Clone)]
pub struct ReplaceAdapter(pub Stamper);

#[async_trait]
impl PreHook for ReplaceAdapter {
    async fn run(&self, event: WriteEvent, write: PendingWrite<'_>) -> Result<(), HookError> {
        let PendingWrite::Replace {
            filter,
            replacement,
            options,
        } = write
        else {
            return Ok(());
        };
        if options.modified_at != Some(true) {
            skipped(event, "replace requires opt-in");
            return Ok(());
        }

        let mut normalized = normalize(replacement);
        let paths: Vec<String> = normalized.keys().cloned().collect();
        let candidate = merge_candidate(filter, &normalized);
        let stamps = self.0.decide(&paths, &candidate).await?;

        let mut target = StampTarget::Fields(&mut normalized);
        target.apply(&stamps);
        applied(event, target.mode(), &stamps);
        *replacement = normalized;
        Ok(())
    }
}

/// `insertMany` pathway
///
/// Every document is decided before any is stamped.
#[derive(Debug, Clone)]
pub struct InsertManyAdapter(pub Stamper);

#[async_trait]
impl PreHook for InsertManyAdapter {
    async fn run(&self, event: WriteEvent, write: PendingWrite<'_>) -> Result<(), HookError> {
        let PendingWrite::InsertMany { docs, options } = write else {
            return Ok(());
        };
        if options.modified_at == Some(false) {
            skipped(event, "disabled for this call");
            return Ok(());
        }

        let mut decided = Vec::with_capacity(docs.len());
        for doc in docs.iter() {
            let paths: Vec<String> = doc.keys().cloned().collect();
            decided.push(self.0.decide(&paths, doc).await?);
        }
        for (doc, stamps) in docs.iter_mut().zip(&decided) {
            let mut target = StampTarget::Fields(doc);
            target.apply(stamps);
            applied(event, target.mode(), stamps);
        }
        Ok(())
    }
}
