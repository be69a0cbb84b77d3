//! Source configuration options.
//!
//! Sources are configured with a multi-valued string map, the same shape the
//! host passes through from its configuration UI. Each source describes the
//! keys it understands as [`SourceParameter`]s.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::error::BulkImportError;
use crate::Result;

/// An option key recognised by a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceParameter {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// Configuration passed to [`ImportSource::configure`](super::ImportSource::configure).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SourceOptions {
    values: BTreeMap<String, Vec<String>>,
}

impl SourceOptions {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append `value` under `key`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Append `value` under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// Parse a `key=value` pair and append it.
    ///
    /// The value may be empty (`key=`) but the key may not.
    pub fn parse_pair(&mut self, pair: &str) -> Result<()> {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            BulkImportError::invalid_configuration(pair, "expected key=value")
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(BulkImportError::invalid_configuration(pair, "option key is empty"));
        }
        self.insert(key, value);
        Ok(())
    }

    /// Build options from a list of `key=value` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut options = Self::new();
        for pair in pairs {
            options.parse_pair(pair)?;
        }
        Ok(options)
    }

    /// All values for `key`.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.values.get(key).map(Vec::as_slice)
    }

    /// First value for `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check these options against the parameters a source recognises.
    ///
    /// A required parameter must be present with at least one non-empty
    /// value. Keys no parameter names are ignored with a warning.
    pub fn validate(&self, source: &str, parameters: &[SourceParameter]) -> Result<()> {
        for parameter in parameters.iter().filter(|p| p.required) {
            let present = self
                .get(parameter.name)
                .is_some_and(|values| values.iter().any(|v| !v.is_empty()));
            if !present {
                return Err(BulkImportError::invalid_configuration(
                    parameter.name,
                    "required option is missing",
                ));
            }
        }

        for key in self.keys() {
            if !parameters.iter().any(|p| p.name == key) {
                warn!(source, option = key, "ignoring unrecognised source option");
            }
        }

        Ok(())
    }
}
