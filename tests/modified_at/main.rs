//! Integration tests for the modified-at plugin against the in-memory store.

#[path = "../common/mod.rs"]
mod common;

mod array_form;
mod default_suffix;
mod default_value;
mod document_methods;
mod model_methods;
mod object_form;
