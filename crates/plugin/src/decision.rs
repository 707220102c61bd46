//! Timestamp decision engine
//!
//! Given the paths a write modifies and its candidate document, decide which
//! derived fields to stamp and with what time:
//!
//! 1. Read the clock once (`t0`) at the start of the call
//! 2. Every modified path that is a tracked field stamps `field + suffix`
//!    with `t0`
//! 3. Every custom predicate, in declaration order, is awaited against the
//!    candidate document; a match stamps its field with a fresh clock read
//!
//! A predicate error abandons the whole decision. Callers apply stamps only
//! from a complete [`Stamps`] map, so a failed decision touches nothing.

use crate::config::Configuration;
use crate::error::PredicateError;
use modstamp_core::{Clock, FieldMap, Timestamp};
use std::collections::BTreeMap;
use tracing::trace;

/// Derived field name -> stamp time
pub type Stamps = BTreeMap<String, Timestamp>;

/// Decide the stamps for one write
///
/// # Errors
///
/// Returns [`PredicateError`] naming the first predicate that failed.
pub async fn decide(
    config: &Configuration,
    modified_paths: &[String],
    candidate: &FieldMap,
    clock: &dyn Clock,
) -> Result<Stamps, PredicateError> {
    let mut stamps = Stamps::new();
    let t0 = clock.now();

    for path in modified_paths {
        if config.is_tracked(path) {
            stamps.insert(config.derived_name(path), t0);
        }
    }

    for (field, predicate) in config.predicates() {
        let outcome = predicate
            .evaluate(candidate)
            .await
            .map_err(|source| PredicateError {
                field: field.clone(),
                source,
            })?;
        trace!(field = %field, outcome = ?outcome, "Evaluated predicate");
        if outcome.is_match() {
            stamps.insert(field.clone(), clock.now());
        }
    }

    Ok(stamps)
}
