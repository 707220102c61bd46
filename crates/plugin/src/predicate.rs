//! Custom predicates
//!
//! A predicate decides, from the candidate document of a write, whether its
//! derived field should be stamped. Evaluation is async so a predicate may
//! await external checks; the write waits for it.
//!
//! Results are three-valued. Only [`PredicateOutcome::Matched`] stamps;
//! [`PredicateOutcome::NotMatched`] and [`PredicateOutcome::Indeterminate`]
//! leave the derived field untouched.

use async_trait::async_trait;
use modstamp_core::{FieldMap, HookError};
use std::future::Future;
use std::sync::Arc;

/// Outcome of evaluating a predicate against a candidate document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateOutcome {
    /// Condition holds: stamp the derived field
    Matched,
    /// Condition does not hold
    NotMatched,
    /// Condition could not be decided (e.g. a field it reads is absent)
    Indeterminate,
}

impl PredicateOutcome {
    /// Whether the derived field should be stamped
    pub fn is_match(self) -> bool {
        matches!(self, PredicateOutcome::Matched)
    }
}

impl From<bool> for PredicateOutcome {
    fn from(matched: bool) -> Self {
        if matched {
            PredicateOutcome::Matched
        } else {
            PredicateOutcome::NotMatched
        }
    }
}

impl From<Option<bool>> for PredicateOutcome {
    fn from(matched: Option<bool>) -> Self {
        matched.map_or(PredicateOutcome::Indeterminate, PredicateOutcome::from)
    }
}

/// Condition over a candidate document
#[async_trait]
pub trait Predicate: Send + Sync {
    /// Evaluate against `candidate`
    ///
    /// An error aborts the enclosing write.
    async fn evaluate(&self, candidate: &FieldMap) -> Result<PredicateOutcome, HookError>;
}

// =============================================================================
// Closure adapters
// =============================================================================

struct FnPredicate<F>(F);

#[async_trait]
impl<F, O> Predicate for FnPredicate<F>
where
    F: Fn(&FieldMap) -> O + Send + Sync,
    O: Into<PredicateOutcome> + 'static,
{
    async fn evaluate(&self, candidate: &FieldMap) -> Result<PredicateOutcome, HookError> {
        Ok((self.0)(candidate).into())
    }
}

struct TryFnPredicate<F>(F);

#[async_trait]
impl<F, O, E> Predicate for TryFnPredicate<F>
where
    F: Fn(&FieldMap) -> Result<O, E> + Send + Sync,
    O: Into<PredicateOutcome> + 'static,
    E: Into<HookError> + 'static,
{
    async fn evaluate(&self, candidate: &FieldMap) -> Result<PredicateOutcome, HookError> {
        (self.0)(candidate).map(Into::into).map_err(Into::into)
    }
}

struct AsyncFnPredicate<F>(F);

#[async_trait]
impl<F, Fut, O> Predicate for AsyncFnPredicate<F>
where
    F: Fn(FieldMap) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O, HookError>> + Send + 'static,
    O: Into<PredicateOutcome> + 'static,
{
    async fn evaluate(&self, candidate: &FieldMap) -> Result<PredicateOutcome, HookError> {
        (self.0)(candidate.clone()).await.map(Into::into)
    }
}

/// Predicate from a synchronous, infallible closure
///
/// The closure may return `bool`, `Option<bool>` or a [`PredicateOutcome`].
///
/// ```
/// use modstamp_core::Value;
/// use modstamp_plugin::predicate;
///
/// let bought = predicate::from_fn(|doc| doc.get("status") == Some(&Value::Int(2)));
/// # let _ = bought;
/// ```
pub fn from_fn<F, O>(f: F) -> Arc<dyn Predicate>
where
    F: Fn(&FieldMap) -> O + Send + Sync + 'static,
    O: Into<PredicateOutcome> + 'static,
{
    Arc::new(FnPredicate(f))
}

/// Predicate from a synchronous closure that may fail
pub fn try_from_fn<F, O, E>(f: F) -> Arc<dyn Predicate>
where
    F: Fn(&FieldMap) -> Result<O, E> + Send + Sync + 'static,
    O: Into<PredicateOutcome> + 'static,
    E: Into<HookError> + 'static,
{
    Arc::new(TryFnPredicate(f))
}

/// Predicate from an async closure
///
/// The closure receives its own copy of the candidate document.
pub fn from_async_fn<F, Fut, O>(f: F) -> Arc<dyn Predicate>
where
    F: Fn(FieldMap) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, HookError>> + Send + 'static,
    O: Into<PredicateOutcome> + 'static,
{
    Arc::new(AsyncFnPredicate(f))
}
