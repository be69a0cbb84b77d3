//! A source that synthesises a small, hardcoded tree.
//!
//! It reads nothing and exists as a working reference for writing real
//! sources: it shows the call order every source follows and the counters
//! it is expected to keep.

use tracing::{debug, info, info_span, Span};

use crate::cancel::CancellationToken;
use crate::data::{CounterRegistry, ImportItem, ItemPath};
use crate::Result;

use super::{ImportSource, ItemSink, SourceDescription, SourceOptions, SourceParameter};

/// Registry name of the sample source.
pub const SAMPLE_SOURCE_NAME: &str = "Sample";

const SAMPLE_SOURCE_DESCRIPTION: &str = "This import source is a sample that synthesises a \
     small amount of hardcoded content. It primarily exists as a working example source code \
     for a custom import source.";

const SAMPLE_SOURCE_CONFIG_UI_URI: &str = "/bulk/import/samplesource/config";

pub const COUNTER_FOLDERS_DISCOVERED: &str = "folders discovered";
pub const COUNTER_FILES_DISCOVERED: &str = "files discovered";

const COUNTERS: &[&str] = &[COUNTER_FOLDERS_DISCOVERED, COUNTER_FILES_DISCOVERED];

/// (parent, name)
const FOLDERS: &[(Option<&str>, &str)] = &[
    (None, "folder1"),
    (None, "folder2"),
    (None, "folder3"),
    (Some("folder1"), "folder1.1"),
];

/// (parent, name, versions)
const FILES: &[(Option<&str>, &str, u32)] = &[
    (None, "file1.txt", 1),
    (Some("folder1"), "file1.1.txt", 1),
    (Some("folder1"), "file1.2.txt", 10),
];

/// The synthetic sample source.
#[derive(Debug, Clone)]
pub struct SampleSource {
    span: Span,
}

impl SampleSource {
    /// Create a sample source logging under its own `source` span.
    pub fn new() -> Self {
        Self::with_span(info_span!("source", source = SAMPLE_SOURCE_NAME))
    }

    /// Create a sample source whose log events are recorded under `span`.
    pub fn with_span(span: Span) -> Self {
        Self { span }
    }

    fn synthesise_folder(
        &self,
        counters: &CounterRegistry,
        sink: &mut ItemSink<'_>,
        parent: Option<&str>,
        name: &str,
    ) -> Result<()> {
        let item = ImportItem::folder(parent.map(ItemPath::parse).transpose()?, name)?;
        sink.check(&item)?;
        let count = counters.increment(COUNTER_FOLDERS_DISCOVERED)?;
        debug!(parent: &self.span, path = %item.path(), count, "synthesised folder");
        sink.submit(item)
    }

    fn synthesise_file(
        &self,
        counters: &CounterRegistry,
        sink: &mut ItemSink<'_>,
        parent: Option<&str>,
        name: &str,
        versions: u32,
    ) -> Result<()> {
        let item = ImportItem::file(parent.map(ItemPath::parse).transpose()?, name, versions)?;
        sink.check(&item)?;
        let count = counters.increment(COUNTER_FILES_DISCOVERED)?;
        debug!(parent: &self.span, path = %item.path(), versions, count, "synthesised file");
        sink.submit(item)
    }
}

impl Default for SampleSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportSource for SampleSource {
    fn describe(&self) -> SourceDescription {
        SourceDescription {
            name: SAMPLE_SOURCE_NAME,
            description: SAMPLE_SOURCE_DESCRIPTION,
            config_ui_uri: Some(SAMPLE_SOURCE_CONFIG_UI_URI),
        }
    }

    fn configure(&mut self, options: &SourceOptions) -> Result<()> {
        // No parameters, so this only reports keys that will be ignored.
        options.validate(SAMPLE_SOURCE_NAME, &self.parameters())
    }

    fn supports_in_place_import(&self) -> bool {
        false
    }

    fn parameters(&self) -> Vec<SourceParameter> {
        Vec::new()
    }

    fn counter_names(&self) -> &'static [&'static str] {
        COUNTERS
    }

    fn enumerate_folders(
        &self,
        counters: &CounterRegistry,
        cancel: &CancellationToken,
        sink: &mut ItemSink<'_>,
    ) -> Result<()> {
        for (parent, name) in FOLDERS {
            cancel.check()?;
            self.synthesise_folder(counters, sink, *parent, name)?;
        }
        info!(parent: &self.span, folders = FOLDERS.len(), "folder pass complete");
        Ok(())
    }

    fn enumerate_files(
        &self,
        counters: &CounterRegistry,
        cancel: &CancellationToken,
        sink: &mut ItemSink<'_>,
    ) -> Result<()> {
        for (parent, name, versions) in FILES {
            cancel.check()?;
            self.synthesise_file(counters, sink, *parent, name, *versions)?;
        }
        info!(parent: &self.span, files = FILES.len(), "file pass complete");
        Ok(())
    }
}
