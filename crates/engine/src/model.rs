//! Model: a named collection of documents bound to a schema
//!
//! ## Write Path
//!
//! Every write follows the same shape:
//!
//! 1. Build the pathway's [`PendingWrite`] view
//! 2. Await every pre-hook registered for the event (hooks may mutate the view)
//! 3. Take the collection lock, cast, and persist what the view now holds
//!
//! The lock is only taken after the last hook returns, so it is never held
//! across an `.await`. A hook error aborts the write before step 3; nothing
//! is persisted.
//!
//! ## Thread Safety
//!
//! `Model` is a cheap `Clone` handle (`Arc` inside) and is `Send + Sync`.
//! Documents live in a `parking_lot::RwLock`, insertion-ordered.

use crate::document::Document;
use crate::filter::{self, Projection};
use crate::schema::{id_value, Schema, ID_FIELD};
use crate::update;
use modstamp_core::{
    Error, FieldMap, InsertManyOptions, PendingWrite, ReplaceOptions, Result, SaveOptions,
    SaveTarget, Timestamp, UpdateDoc, UpdateOptions, Value, WriteEvent,
};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Outcome of an update or replace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateResult {
    /// Documents matched by the filter
    pub matched: usize,
    /// Documents whose stored body changed
    pub modified: usize,
    /// `_id` of the document inserted by an upsert
    pub upserted_id: Option<String>,
}

/// Bodies before and after a write, for `findOneAnd*`
#[derive(Debug, Default)]
struct WriteOutcome {
    result: UpdateResult,
    before: Vec<FieldMap>,
    after: Vec<FieldMap>,
}

struct ModelInner {
    name: String,
    schema: Schema,
    docs: RwLock<Vec<FieldMap>>,
}

/// Handle to a collection of documents
#[derive(Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.inner.name)
            .field("documents", &self.inner.docs.read().len())
            .finish()
    }
}

impl Model {
    /// Create a model; the schema is frozen from here on
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        let name = name.into();
        debug!(model = %name, fields = schema.field_names().count(), "Created model");
        Self {
            inner: Arc::new(ModelInner {
                name,
                schema,
                docs: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Model name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The frozen schema
    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    /// Number of stored documents
    pub fn count(&self) -> usize {
        self.inner.docs.read().len()
    }

    // ========================================================================
    // Document pathway
    // ========================================================================

    /// Build an unsaved document
    ///
    /// Provided (declared) fields are marked modified. Schema defaults are
    /// filled in but not marked modified. An `_id` is generated if absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cast`] if a provided value has the wrong type.
    pub fn new_document(&self, fields: FieldMap) -> Result<Document> {
        let mut fields = self.inner.schema.cast(fields)?;
        let provided: Vec<String> = fields
            .keys()
            .filter(|k| k.as_str() != ID_FIELD)
            .cloned()
            .collect();
        self.inner.schema.apply_defaults(&mut fields);
        ensure_id(&mut fields);
        Ok(Document::new_unsaved(fields, provided))
    }

    /// Create and save one document
    pub async fn create(&self, fields: FieldMap) -> Result<Document> {
        self.create_with(fields, SaveOptions::default()).await
    }

    /// Create and save one document with per-call options
    pub async fn create_with(&self, fields: FieldMap, options: SaveOptions) -> Result<Document> {
        let mut doc = self.new_document(fields)?;
        self.save(&mut doc, options).await?;
        Ok(doc)
    }

    /// Create and save several documents, one `save` each
    ///
    /// Stops at the first failure; earlier documents stay saved.
    pub async fn create_many(&self, docs: Vec<FieldMap>, options: SaveOptions) -> Result<Vec<Document>> {
        let mut created = Vec::with_capacity(docs.len());
        for fields in docs {
            created.push(self.create_with(fields, options.clone()).await?);
        }
        Ok(created)
    }

    /// Persist a document: insert if new, otherwise write its modified paths
    ///
    /// # Errors
    ///
    /// - [`Error::HookFailed`] if a `save` hook fails (nothing persisted)
    /// - [`Error::NotFound`] if an existing document was removed meanwhile
    /// - [`Error::InvalidOperation`] on a duplicate `_id`
    pub async fn save(&self, doc: &mut Document, options: SaveOptions) -> Result<()> {
        self.inner
            .schema
            .hooks()
            .run_pre(
                WriteEvent::Save,
                PendingWrite::Save {
                    doc: &mut *doc,
                    options: &options,
                },
            )
            .await?;

        let fields = self.inner.schema.cast(doc.fields().clone())?;
        let id = doc
            .id()
            .map(str::to_string)
            .ok_or_else(|| Error::InvalidOperation("Document has no _id".to_string()))?;
        {
            let mut docs = self.inner.docs.write();
            let position = docs.iter().position(|d| has_id(d, &id));
            match (doc.is_new(), position) {
                (true, None) => docs.push(fields.clone()),
                (true, Some(_)) => {
                    return Err(Error::InvalidOperation(format!("Duplicate _id '{}'", id)))
                }
                // A loaded document may be a projection; only its modified
                // paths are written back
                (false, Some(i)) => {
                    for path in doc.modified_paths() {
                        if let Some(value) = fields.get(&path) {
                            docs[i].insert(path, value.clone());
                        }
                    }
                }
                (false, None) => return Err(Error::NotFound(id)),
            }
        }
        debug!(model = %self.inner.name, id = %id, "Saved document");
        doc.mark_persisted(fields);
        Ok(())
    }

    // ========================================================================
    // Bulk insert pathway
    // ========================================================================

    /// Insert raw documents in one batch
    ///
    /// Hooks see the raw field maps before casting and default filling.
    /// The batch is all-or-nothing.
    pub async fn insert_many(
        &self,
        docs: Vec<FieldMap>,
        options: InsertManyOptions,
    ) -> Result<Vec<Document>> {
        let mut docs = docs;
        self.inner
            .schema
            .hooks()
            .run_pre(
                WriteEvent::InsertMany,
                PendingWrite::InsertMany {
                    docs: &mut docs,
                    options: &options,
                },
            )
            .await?;

        let mut prepared = Vec::with_capacity(docs.len());
        for fields in docs {
            let mut fields = self.inner.schema.cast(fields)?;
            self.inner.schema.apply_defaults(&mut fields);
            ensure_id(&mut fields);
            prepared.push(fields);
        }
        {
            let mut stored = self.inner.docs.write();
            for fields in &prepared {
                let id = fields.get(ID_FIELD).and_then(Value::as_str).unwrap_or_default();
                if stored.iter().any(|d| has_id(d, id)) {
                    return Err(Error::InvalidOperation(format!("Duplicate _id '{}'", id)));
                }
            }
            stored.extend(prepared.iter().cloned());
        }
        debug!(model = %self.inner.name, count = prepared.len(), "Inserted documents");
        Ok(prepared.into_iter().map(Document::loaded).collect())
    }

    // ========================================================================
    // Filtered update pathway
    // ========================================================================

    /// Update the first match, or every match with `options.multi`
    pub async fn update(
        &self,
        filter: FieldMap,
        update: UpdateDoc,
        options: UpdateOptions,
    ) -> Result<UpdateResult> {
        let multi = options.multi;
        self.run_update(WriteEvent::Update, filter, update, options, multi)
            .await
            .map(|o| o.result)
    }

    /// Update the first match
    pub async fn update_one(
        &self,
        filter: FieldMap,
        update: UpdateDoc,
        options: UpdateOptions,
    ) -> Result<UpdateResult> {
        self.run_update(WriteEvent::UpdateOne, filter, update, options, false)
            .await
            .map(|o| o.result)
    }

    /// Update every match
    pub async fn update_many(
        &self,
        filter: FieldMap,
        update: UpdateDoc,
        options: UpdateOptions,
    ) -> Result<UpdateResult> {
        self.run_update(WriteEvent::UpdateMany, filter, update, options, true)
            .await
            .map(|o| o.result)
    }

    /// Update the first match and return it
    ///
    /// Returns the body before the update, or after it with
    /// `options.return_new`. An upsert only returns a document with
    /// `return_new`.
    pub async fn find_one_and_update(
        &self,
        filter: FieldMap,
        update: UpdateDoc,
        options: UpdateOptions,
    ) -> Result<Option<Document>> {
        let return_new = options.return_new;
        let outcome = self
            .run_update(WriteEvent::FindOneAndUpdate, filter, update, options, false)
            .await?;
        let picked = if return_new { outcome.after } else { outcome.before };
        Ok(picked.into_iter().next().map(Document::loaded))
    }

    /// [`Model::find_one_and_update`] by `_id`
    pub async fn find_by_id_and_update(
        &self,
        id: &str,
        update: UpdateDoc,
        options: UpdateOptions,
    ) -> Result<Option<Document>> {
        self.find_one_and_update(filter::by_id(id), update, options)
            .await
    }

    /// `updateOne` targeting this document's `_id`
    pub async fn document_update_one(
        &self,
        doc: &Document,
        update: UpdateDoc,
        options: UpdateOptions,
    ) -> Result<UpdateResult> {
        let id = require_id(doc)?;
        self.update_one(filter::by_id(id), update, options).await
    }

    async fn run_update(
        &self,
        event: WriteEvent,
        filter: FieldMap,
        mut update: UpdateDoc,
        options: UpdateOptions,
        multi: bool,
    ) -> Result<WriteOutcome> {
        filter::validate(&filter)?;
        self.inner
            .schema
            .hooks()
            .run_pre(
                event,
                PendingWrite::Update {
                    filter: &filter,
                    update: &mut update,
                    options: &options,
                },
            )
            .await?;

        let schema = &self.inner.schema;
        let now = Timestamp::now();
        let mut outcome = WriteOutcome::default();
        let mut docs = self.inner.docs.write();

        let mut targets: Vec<usize> = docs
            .iter()
            .enumerate()
            .filter(|(_, d)| filter::matches(d, &filter))
            .map(|(i, _)| i)
            .collect();
        if !multi {
            targets.truncate(1);
        }

        if targets.is_empty() {
            if options.upsert {
                let mut fields = filter::upsert_seed(&filter);
                update::apply(&mut fields, &update, now, true)?;
                schema.apply_defaults(&mut fields);
                let id = ensure_id(&mut fields);
                let fields = schema.cast(fields)?;
                docs.push(fields.clone());
                debug!(model = %self.inner.name, event = %event, id = %id, "Upserted document");
                outcome.result.upserted_id = Some(id);
                outcome.after.push(fields);
            }
            return Ok(outcome);
        }

        // Stage every change before committing any
        let mut staged = Vec::with_capacity(targets.len());
        for &i in &targets {
            let mut next = docs[i].clone();
            update::apply(&mut next, &update, now, false)?;
            staged.push((i, schema.cast(next)?));
        }
        outcome.result.matched = staged.len();
        for (i, next) in staged {
            if docs[i] != next {
                outcome.result.modified += 1;
            }
            outcome.before.push(std::mem::replace(&mut docs[i], next.clone()));
            outcome.after.push(next);
        }
        debug!(
            model = %self.inner.name,
            event = %event,
            matched = outcome.result.matched,
            modified = outcome.result.modified,
            "Updated documents"
        );
        Ok(outcome)
    }

    // ========================================================================
    // Replace pathway
    // ========================================================================

    /// Replace the first match with `replacement` (the `_id` is kept)
    pub async fn replace_one(
        &self,
        filter: FieldMap,
        replacement: FieldMap,
        options: ReplaceOptions,
    ) -> Result<UpdateResult> {
        self.run_replace(WriteEvent::ReplaceOne, filter, replacement, options)
            .await
            .map(|o| o.result)
    }

    /// Replace the first match and return its body before the replace
    pub async fn find_one_and_replace(
        &self,
        filter: FieldMap,
        replacement: FieldMap,
        options: ReplaceOptions,
    ) -> Result<Option<Document>> {
        let outcome = self
            .run_replace(WriteEvent::FindOneAndReplace, filter, replacement, options)
            .await?;
        Ok(outcome.before.into_iter().next().map(Document::loaded))
    }

    /// `replaceOne` targeting this document's `_id`
    pub async fn document_replace_one(
        &self,
        doc: &Document,
        replacement: FieldMap,
        options: ReplaceOptions,
    ) -> Result<UpdateResult> {
        let id = require_id(doc)?;
        self.replace_one(filter::by_id(id), replacement, options)
            .await
    }

    async fn run_replace(
        &self,
        event: WriteEvent,
        filter: FieldMap,
        mut replacement: FieldMap,
        options: ReplaceOptions,
    ) -> Result<WriteOutcome> {
        filter::validate(&filter)?;
        self.inner
            .schema
            .hooks()
            .run_pre(
                event,
                PendingWrite::Replace {
                    filter: &filter,
                    replacement: &mut replacement,
                    options: &options,
                },
            )
            .await?;

        if let Some(op) = replacement.keys().find(|k| UpdateDoc::is_operator(k)) {
            return Err(Error::InvalidOperation(format!(
                "Replacement document must not contain operator '{}'",
                op
            )));
        }

        let schema = &self.inner.schema;
        let mut outcome = WriteOutcome::default();
        let mut docs = self.inner.docs.write();
        match docs.iter().position(|d| filter::matches(d, &filter)) {
            Some(i) => {
                let mut next = replacement;
                if let Some(id) = docs[i].get(ID_FIELD) {
                    next.insert(ID_FIELD.to_string(), id.clone());
                }
                let next = schema.cast(next)?;
                outcome.result.matched = 1;
                if docs[i] != next {
                    outcome.result.modified = 1;
                }
                outcome.before.push(std::mem::replace(&mut docs[i], next.clone()));
                outcome.after.push(next);
            }
            None if options.upsert => {
                let mut next = replacement;
                if let Some(id) = filter.get(ID_FIELD) {
                    next.insert(ID_FIELD.to_string(), id.clone());
                }
                let id = ensure_id(&mut next);
                let next = schema.cast(next)?;
                docs.push(next.clone());
                outcome.result.upserted_id = Some(id);
                outcome.after.push(next);
            }
            None => {}
        }
        debug!(
            model = %self.inner.name,
            event = %event,
            matched = outcome.result.matched,
            "Replaced document"
        );
        Ok(outcome)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// All matching documents, in insertion order
    pub fn find(&self, filter: &FieldMap, projection: &Projection) -> Result<Vec<Document>> {
        filter::validate(filter)?;
        let docs = self.inner.docs.read();
        Ok(docs
            .iter()
            .filter(|d| filter::matches(d, filter))
            .map(|d| Document::loaded(projection.apply(&self.inner.schema, d)))
            .collect())
    }

    /// First matching document
    pub fn find_one(&self, filter: &FieldMap, projection: &Projection) -> Result<Option<Document>> {
        filter::validate(filter)?;
        let docs = self.inner.docs.read();
        Ok(docs
            .iter()
            .find(|d| filter::matches(d, filter))
            .map(|d| Document::loaded(projection.apply(&self.inner.schema, d))))
    }

    /// Document by `_id` with the default projection
    pub fn find_by_id(&self, id: &str) -> Result<Option<Document>> {
        self.find_by_id_with(id, &Projection::Default)
    }

    /// Document by `_id` with an explicit projection
    pub fn find_by_id_with(&self, id: &str, projection: &Projection) -> Result<Option<Document>> {
        self.find_one(&filter::by_id(id), projection)
    }
}

/// Return the document's `_id`, generating one if absent
fn ensure_id(fields: &mut FieldMap) -> String {
    if let Some(id) = fields.get(ID_FIELD).and_then(Value::as_str) {
        return id.to_string();
    }
    let id = Uuid::new_v4().to_string();
    fields.insert(ID_FIELD.to_string(), id_value(&id));
    id
}

fn has_id(doc: &FieldMap, id: &str) -> bool {
    doc.get(ID_FIELD).and_then(Value::as_str) == Some(id)
}

fn require_id(doc: &Document) -> Result<&str> {
    doc.id()
        .ok_or_else(|| Error::InvalidOperation("Document has no _id".to_string()))
}
