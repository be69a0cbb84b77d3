//! Named progress counters.
//!
//! A [`CounterRegistry`] lives for one scan session. Sources declare the
//! counters they use up front so the host can display them at zero, then
//! increment them as items are discovered.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use crate::error::BulkImportError;
use crate::Result;

/// Point-in-time copy of every registered counter, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CounterSnapshot {
    counts: BTreeMap<String, u64>,
}

impl CounterSnapshot {
    /// Count for `name`, or `None` if it was never registered.
    pub fn get(&self, name: &str) -> Option<u64> {
        self.counts.get(name).copied()
    }

    /// Iterate `(name, count)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Registry of named, monotonically increasing counters.
///
/// Counters must be pre-registered before they can be incremented.
/// Registering a name that already exists keeps its current count, so
/// registration is additive and never resets progress.
#[derive(Debug, Default)]
pub struct CounterRegistry {
    counts: Mutex<BTreeMap<String, u64>>,
}

impl CounterRegistry {
    /// Create an empty registry for a new session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare counters, each starting at 0.
    ///
    /// Names that are already registered keep their count.
    pub fn preregister<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut counts = self.lock();
        for name in names {
            counts.entry(name.into()).or_insert(0);
        }
    }

    /// Add one to `name` and return the new count.
    ///
    /// Fails with [`BulkImportError::UnknownCounter`] if `name` was never
    /// registered; the registry is left unchanged in that case.
    pub fn increment(&self, name: &str) -> Result<u64> {
        let mut counts = self.lock();
        match counts.get_mut(name) {
            Some(count) => {
                *count += 1;
                Ok(*count)
            }
            None => Err(BulkImportError::UnknownCounter(name.to_string())),
        }
    }

    /// Current count for `name`, or `None` if it was never registered.
    pub fn get(&self, name: &str) -> Option<u64> {
        self.lock().get(name).copied()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    /// Copy the current counts.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            counts: self.lock().clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, u64>> {
        // Counts stay consistent even if a holder panicked: every update is a
        // single insert or increment.
        self.counts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
