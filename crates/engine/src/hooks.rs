//! Pre-write hook registry
//!
//! Each schema owns one registry. Plugins register hooks through
//! [`modstamp_core::SchemaHost::register_pre_hook`]; the model dispatches
//! every write through [`HookRegistry::run_pre`] before touching storage.
//!
//! ## Ordering
//!
//! Hooks run sequentially in registration order. The first error stops the
//! chain, later hooks are not called, and the write is abandoned.

use modstamp_core::{Error, PendingWrite, PreHook, Result, WriteEvent};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// A registered hook and the events it listens to
#[derive(Clone)]
pub struct HookEntry {
    /// Events that trigger this hook
    pub events: Vec<WriteEvent>,
    /// The handler
    pub hook: Arc<dyn PreHook>,
}

impl fmt::Debug for HookEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookEntry")
            .field("events", &self.events)
            .finish()
    }
}

/// Ordered collection of pre-write hooks
#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    entries: Vec<HookEntry>,
}

impl HookRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook for the given events
    pub fn register(&mut self, events: &[WriteEvent], hook: Arc<dyn PreHook>) {
        debug!(events = ?events, "Registered pre-write hook");
        self.entries.push(HookEntry {
            events: events.to_vec(),
            hook,
        });
    }

    /// Number of hooks listening to `event`
    pub fn count_for(&self, event: WriteEvent) -> usize {
        self.entries
            .iter()
            .filter(|e| e.events.contains(&event))
            .count()
    }

    /// Run every hook registered for `event`
    ///
    /// # Errors
    ///
    /// Returns [`Error::HookFailed`] wrapping the first hook error.
    pub async fn run_pre(&self, event: WriteEvent, mut write: PendingWrite<'_>) -> Result<()> {
        for (index, entry) in self
            .entries
            .iter()
            .filter(|e| e.events.contains(&event))
            .enumerate()
        {
            trace!(event = %event, index, kind = write.kind(), "Running pre-write hook");
            entry
                .hook
                .run(event, write.reborrow())
                .await
                .map_err(|source| Error::HookFailed { event, source })?;
        }
        Ok(())
    }
}
