//! Lookup of import sources by name.

use std::collections::BTreeMap;

use crate::error::BulkImportError;
use crate::Result;

use super::{ImportSource, SampleSource, SourceDescription};

/// Maps source names to source implementations.
#[derive(Default)]
pub struct SourceRegistry {
    sources: BTreeMap<&'static str, Box<dyn ImportSource>>,
}

impl SourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the sources shipped with this crate.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.sources.insert(
            super::sample::SAMPLE_SOURCE_NAME,
            Box::new(SampleSource::new()),
        );
        registry
    }

    /// Register `source` under the name it describes itself with.
    pub fn register(&mut self, source: Box<dyn ImportSource>) -> Result<()> {
        let name = source.describe().name;
        if self.sources.contains_key(name) {
            return Err(BulkImportError::DuplicateSource(name.to_string()));
        }
        self.sources.insert(name, source);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&dyn ImportSource> {
        self.sources
            .get(name)
            .map(|source| source.as_ref())
            .ok_or_else(|| BulkImportError::UnknownSource(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut (dyn ImportSource + 'static)> {
        self.sources
            .get_mut(name)
            .map(|source| source.as_mut())
            .ok_or_else(|| BulkImportError::UnknownSource(name.to_string()))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.sources.keys().copied()
    }

    /// Descriptions of every registered source, sorted by name.
    pub fn describe_all(&self) -> Vec<SourceDescription> {
        self.sources.values().map(|source| source.describe()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .finish()
    }
}
