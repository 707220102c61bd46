//! Shared test utilities for the integration suites.
//!
//! Import via `mod common;` from any test's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

pub use modstamp::*;
pub use serde_json::json;

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::Arc;
use std::sync::Once;

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

// ============================================================================
// Fixtures
// ============================================================================

/// Random model name so suites never share state by accident.
pub fn random_name() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("model_{}", suffix.to_lowercase())
}

/// `name`, `age`, `sex`: the schema most scenarios start from.
pub fn pet_schema() -> Schema {
    Schema::new()
        .field("name", FieldType::String)
        .field("age", FieldType::Number)
        .field("sex", FieldType::String)
}

/// Pet model with the plugin attached.
pub fn pet_model(plugin: ModifiedAt) -> Model {
    init_tracing();
    let mut schema = pet_schema();
    schema.plugin(&plugin).expect("plugin should attach");
    Model::new(random_name(), schema)
}

/// `name`, `status`: schema for predicate scenarios.
pub fn order_model(plugin: ModifiedAt) -> Model {
    init_tracing();
    let mut schema = Schema::new()
        .field("name", FieldType::String)
        .field("status", FieldType::Number);
    schema.plugin(&plugin).expect("plugin should attach");
    Model::new(random_name(), schema)
}

/// Field map from a JSON literal.
pub fn fields(json: serde_json::Value) -> FieldMap {
    fields_from_json(json)
}

/// Update document from a JSON literal.
pub fn update(json: serde_json::Value) -> UpdateDoc {
    UpdateDoc::from_json(json)
}

/// Predicate: `status == n`.
pub fn status_is(n: i64) -> Arc<dyn Predicate> {
    predicate::from_fn(move |doc: &FieldMap| doc.get("status") == Some(&Value::Int(n)))
}

// ============================================================================
// Assertions
// ============================================================================

/// Assert a derived field holds a time inside `[start, end]`.
pub fn assert_stamped_within(doc: &Document, field: &str, start: Timestamp, end: Timestamp) -> Timestamp {
    let at = doc
        .get_date(field)
        .unwrap_or_else(|| panic!("expected '{}' to be stamped, got {:?}", field, doc.get(field)));
    assert!(
        at.is_within(start, end),
        "'{}' = {} not within [{}, {}]",
        field,
        at,
        start,
        end
    );
    at
}

/// Assert a derived field is absent.
pub fn assert_not_stamped(doc: &Document, field: &str) {
    assert!(
        doc.get(field).is_none(),
        "expected '{}' to be absent, got {:?}",
        field,
        doc.get(field)
    );
}

/// Reload a document by id with an explicit projection of `extra` plus all pet fields.
pub fn reload(model: &Model, doc: &Document, extra: &[&str]) -> Document {
    let id = doc.id().expect("document should have an id");
    let mut include: Vec<String> = model.schema().field_names().map(str::to_string).collect();
    include.extend(extra.iter().map(|s| s.to_string()));
    model
        .find_by_id_with(id, &Projection::Include(include))
        .expect("find should succeed")
        .expect("document should exist")
}

/// Fixed clock for deterministic timestamps.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}
