//! Import sources: where items come from.
//!
//! An import source enumerates a hierarchical namespace in two passes,
//! folders first and then files, and hands every discovered item to the
//! caller's [`ItemSink`] before producing the next one. This module
//! provides:
//!
//! - **The contract**: the [`ImportSource`] capability trait
//! - **Configuration**: [`SourceOptions`] and [`SourceParameter`]
//! - **Sources**: the synthetic [`SampleSource`]
//! - **Lookup**: the [`SourceRegistry`] mapping names to sources
//!
//! ## Example
//!
//! ```rust,ignore
//! use bulkimportlib::source::SourceRegistry;
//!
//! let registry = SourceRegistry::with_builtin();
//! let sample = registry.get("Sample")?;
//! println!("{}", sample.describe().description);
//! ```

pub mod options;
pub mod registry;
pub mod sample;

use serde::Serialize;

use crate::cancel::CancellationToken;
use crate::data::{CounterRegistry, ImportItem};
use crate::Result;

pub use options::{SourceOptions, SourceParameter};
pub use registry::SourceRegistry;
pub use sample::SampleSource;

/// Where a source sends the items it discovers.
///
/// Wraps the consumer's `emit` callback and an optional acceptance check.
/// Sources call [`check`](ItemSink::check) before counting an item and
/// [`submit`](ItemSink::submit) after, so an item the check rejects is
/// neither counted nor delivered.
///
/// The callback may block to apply backpressure. An error from either
/// closure aborts the running pass and is propagated to the caller.
pub struct ItemSink<'a> {
    emit: &'a mut dyn FnMut(ImportItem) -> Result<()>,
    check: Option<&'a mut dyn FnMut(&ImportItem) -> Result<()>>,
}

impl<'a> ItemSink<'a> {
    /// A sink that accepts every item and hands it to `emit`.
    pub fn new(emit: &'a mut dyn FnMut(ImportItem) -> Result<()>) -> Self {
        Self { emit, check: None }
    }

    /// Run `check` on every item before the source counts it.
    pub fn with_check(mut self, check: &'a mut dyn FnMut(&ImportItem) -> Result<()>) -> Self {
        self.check = Some(check);
        self
    }

    /// Vet an item before it is counted.
    pub fn check(&mut self, item: &ImportItem) -> Result<()> {
        match self.check.as_deref_mut() {
            Some(check) => check(item),
            None => Ok(()),
        }
    }

    /// Hand a counted item to the consumer.
    pub fn submit(&mut self, item: ImportItem) -> Result<()> {
        (self.emit)(item)
    }
}

/// Static metadata describing a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDescription {
    pub name: &'static str,
    pub description: &'static str,
    /// Location of the externally hosted configuration UI, if any. Opaque to
    /// this crate.
    pub config_ui_uri: Option<&'static str>,
}

impl SourceDescription {
    pub fn has_configuration_ui(&self) -> bool {
        self.config_ui_uri.is_some()
    }
}

/// The contract every import source implements.
///
/// Enumeration is synchronous and single-threaded. For each item a source
/// checks `cancel`, builds the item, passes it to [`ItemSink::check`],
/// increments its counter and calls [`ItemSink::submit`], in that order. At
/// any point the counters therefore equal the items submitted. Every call
/// starts a fresh traversal; sources keep no state between items.
pub trait ImportSource: Send + Sync {
    /// Name, description and configuration UI location.
    fn describe(&self) -> SourceDescription;

    /// Option keys this source recognises.
    fn parameters(&self) -> Vec<SourceParameter> {
        Vec::new()
    }

    /// Apply configuration. Must be idempotent.
    fn configure(&mut self, options: &SourceOptions) -> Result<()>;

    /// Whether items can be imported by reference instead of by copying
    /// their content.
    fn supports_in_place_import(&self) -> bool;

    /// Counters incremented by the enumeration passes. The caller
    /// pre-registers these before the folder pass.
    fn counter_names(&self) -> &'static [&'static str];

    /// Emit every folder. A folder is emitted only after its parent.
    fn enumerate_folders(
        &self,
        counters: &CounterRegistry,
        cancel: &CancellationToken,
        sink: &mut ItemSink<'_>,
    ) -> Result<()>;

    /// Emit every file. Files may sit under any folder from the folder pass,
    /// or under the root.
    fn enumerate_files(
        &self,
        counters: &CounterRegistry,
        cancel: &CancellationToken,
        sink: &mut ItemSink<'_>,
    ) -> Result<()>;
}
