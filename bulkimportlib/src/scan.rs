//! Running a source end to end.
//!
//! This module drives an [`ImportSource`] the way an importer does: configure
//! it, pre-register the source's counters in the caller's registry, run the
//! folder pass and then the file pass.
//!
//! The registry belongs to the caller so the counters stay readable however
//! the scan ends, including after cancellation or an error. Use a fresh
//! [`CounterRegistry`] per scan session; a reused one keeps accumulating.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, info_span};

use crate::cancel::CancellationToken;
use crate::data::{CounterRegistry, CounterSnapshot, ImportItem, ItemPath};
use crate::error::BulkImportError;
use crate::source::{ImportSource, ItemSink, SourceOptions};
use crate::Result;

/// Which enumeration passes to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ScanPasses {
    /// Folders, then files
    #[default]
    All,
    FoldersOnly,
    FilesOnly,
}

impl ScanPasses {
    fn folders(self) -> bool {
        matches!(self, ScanPasses::All | ScanPasses::FoldersOnly)
    }

    fn files(self) -> bool {
        matches!(self, ScanPasses::All | ScanPasses::FilesOnly)
    }
}

/// How items referencing a parent folder are checked.
///
/// Sources do not validate parent references themselves. In `Strict` mode
/// the scan fails with [`BulkImportError::UnknownParent`] when an item's
/// parent was not emitted earlier in the scan. The check runs through
/// [`ItemSink::check`], so the rejected item is neither counted nor handed to
/// the consumer.
/// `Lenient` forwards every item and leaves attachment to the consumer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ParentCheck {
    #[default]
    Strict,
    Lenient,
}

/// Options for running a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Configuration handed to the source
    pub source_options: SourceOptions,
    /// Token checked by the source between items
    pub cancellation: CancellationToken,
    /// Passes to run
    pub passes: ScanPasses,
    /// Parent reference checking
    pub parent_check: ParentCheck,
}

impl ScanOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set source configuration.
    pub fn options(mut self, options: SourceOptions) -> Self {
        self.source_options = options;
        self
    }

    /// Set the cancellation token.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Set which passes to run.
    pub fn passes(mut self, passes: ScanPasses) -> Self {
        self.passes = passes;
        self
    }

    /// Set parent reference checking.
    pub fn parent_check(mut self, check: ParentCheck) -> Self {
        self.parent_check = check;
        self
    }
}

/// Everything a collected scan discovered.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanResult {
    /// Name of the source that was scanned
    pub source: String,
    pub folders: Vec<ImportItem>,
    pub files: Vec<ImportItem>,
    /// Counter values at the end of the scan
    pub counters: CounterSnapshot,
}

impl ScanResult {
    /// Total number of items discovered.
    pub fn item_count(&self) -> usize {
        self.folders.len() + self.files.len()
    }
}

/// Tracks folders emitted so far in a scan.
#[derive(Debug, Default)]
struct ParentTracker {
    mode: ParentCheck,
    known: HashSet<ItemPath>,
}

impl ParentTracker {
    fn new(mode: ParentCheck) -> Self {
        Self {
            mode,
            known: HashSet::new(),
        }
    }

    fn check(&mut self, item: &ImportItem) -> Result<()> {
        if self.mode == ParentCheck::Strict {
            if let Some(parent) = item.parent_path() {
                if !self.known.contains(parent) {
                    return Err(BulkImportError::UnknownParent {
                        item: item.path().to_string(),
                        parent: parent.to_string(),
                    });
                }
            }
        }
        if item.is_folder() {
            self.known.insert(item.path());
        }
        Ok(())
    }
}

/// Run `source` and stream every item to `emit`.
///
/// Counters are kept in `counters`, which is read back for the returned
/// snapshot. Cancellation surfaces as [`BulkImportError::Cancelled`]; on that
/// and every other error the registry still holds one count per item handed
/// to `emit`.
///
/// # Example
///
/// ```rust
/// use bulkimportlib::{scan, CounterRegistry, SampleSource, ScanOptions};
///
/// let mut source = SampleSource::new();
/// let counters = CounterRegistry::new();
/// let mut paths = Vec::new();
/// let snapshot = scan(&mut source, &counters, ScanOptions::new(), &mut |item| {
///     paths.push(item.path().to_string());
///     Ok(())
/// })
/// .unwrap();
///
/// assert_eq!(paths.len(), 7);
/// assert_eq!(snapshot.get("folders discovered"), Some(4));
/// assert_eq!(counters.get("files discovered"), Some(3));
/// ```
pub fn scan(
    source: &mut dyn ImportSource,
    counters: &CounterRegistry,
    options: ScanOptions,
    emit: &mut dyn FnMut(ImportItem) -> Result<()>,
) -> Result<CounterSnapshot> {
    let description = source.describe();
    let _span = info_span!("scan", source = description.name).entered();

    source.configure(&options.source_options)?;
    counters.preregister(source.counter_names().iter().copied());

    let mut tracker = ParentTracker::new(options.parent_check);
    let mut check = |item: &ImportItem| tracker.check(item);
    let mut sink = ItemSink::new(emit).with_check(&mut check);

    let outcome = run_passes(source, counters, &options, &mut sink);
    let snapshot = counters.snapshot();

    match outcome {
        Ok(()) => {
            info!(counters = ?snapshot, "scan complete");
            Ok(snapshot)
        }
        Err(BulkImportError::Cancelled) => {
            info!(counters = ?snapshot, "scan cancelled");
            Err(BulkImportError::Cancelled)
        }
        Err(e) => Err(e),
    }
}

fn run_passes(
    source: &dyn ImportSource,
    counters: &CounterRegistry,
    options: &ScanOptions,
    sink: &mut ItemSink<'_>,
) -> Result<()> {
    if options.passes.folders() {
        source.enumerate_folders(counters, &options.cancellation, sink)?;
    }
    if options.passes.files() {
        source.enumerate_files(counters, &options.cancellation, sink)?;
    }
    Ok(())
}

/// Run `source` and collect everything it discovers.
///
/// If the scan fails the collected items are dropped, but `counters` still
/// reflects what was discovered before the failure.
pub fn scan_collect(
    source: &mut dyn ImportSource,
    counters: &CounterRegistry,
    options: ScanOptions,
) -> Result<ScanResult> {
    let mut result = ScanResult {
        source: source.describe().name.to_string(),
        ..ScanResult::default()
    };

    let snapshot = scan(source, counters, options, &mut |item| {
        if item.is_folder() {
            result.folders.push(item);
        } else {
            result.files.push(item);
        }
        Ok(())
    })?;
    result.counters = snapshot;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::sample::{COUNTER_FILES_DISCOVERED, COUNTER_FOLDERS_DISCOVERED};
    use crate::source::{SampleSource, SourceDescription, SourceParameter};

    /// Emits a file whose parent folder never appears.
    struct OrphanSource;

    impl ImportSource for OrphanSource {
        fn describe(&self) -> SourceDescription {
            SourceDescription {
                name: "Orphan",
                description: "Emits a file under a missing folder",
                config_ui_uri: None,
            }
        }

        fn parameters(&self) -> Vec<SourceParameter> {
            vec![SourceParameter {
                name: "root",
                description: "Root of the namespace",
                required: true,
            }]
        }

        fn configure(&mut self, options: &SourceOptions) -> Result<()> {
            options.validate("Orphan", &self.parameters())
        }

        fn supports_in_place_import(&self) -> bool {
            false
        }

        fn counter_names(&self) -> &'static [&'static str] {
            &["files discovered"]
        }

        fn enumerate_folders(
            &self,
            _counters: &CounterRegistry,
            _cancel: &CancellationToken,
            _sink: &mut ItemSink<'_>,
        ) -> Result<()> {
            Ok(())
        }

        fn enumerate_files(
            &self,
            counters: &CounterRegistry,
            cancel: &CancellationToken,
            sink: &mut ItemSink<'_>,
        ) -> Result<()> {
            cancel.check()?;
            let item = ImportItem::file(Some(ItemPath::parse("missing")?), "orphan.txt", 1)?;
            sink.check(&item)?;
            counters.increment("files discovered")?;
            sink.submit(item)
        }
    }

    fn orphan_options() -> ScanOptions {
        ScanOptions::new().options(SourceOptions::new().with("root", "/"))
    }

    fn collect_sample(options: ScanOptions) -> Result<ScanResult> {
        scan_collect(&mut SampleSource::new(), &CounterRegistry::new(), options)
    }

    #[test]
    fn test_full_scan_counts_match_emitted_items() {
        let result = collect_sample(ScanOptions::new()).unwrap();

        assert_eq!(result.source, "Sample");
        assert_eq!(result.folders.len(), 4);
        assert_eq!(result.files.len(), 3);
        assert_eq!(result.item_count(), 7);
        assert_eq!(
            result.counters.get(COUNTER_FOLDERS_DISCOVERED),
            Some(result.folders.len() as u64)
        );
        assert_eq!(
            result.counters.get(COUNTER_FILES_DISCOVERED),
            Some(result.files.len() as u64)
        );
        assert!(result.folders.iter().all(ImportItem::is_folder));
        assert!(result
            .files
            .iter()
            .all(|f| !f.is_folder() && f.version_count().is_some_and(|v| v.get() >= 1)));
    }

    #[test]
    fn test_folders_are_emitted_before_files() {
        let mut order = Vec::new();
        scan(
            &mut SampleSource::new(),
            &CounterRegistry::new(),
            ScanOptions::new(),
            &mut |item| {
                order.push(item.is_folder());
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(order, vec![true, true, true, true, false, false, false]);
    }

    #[test]
    fn test_repeated_scans_are_identical() {
        let first = collect_sample(ScanOptions::new()).unwrap();
        let second = collect_sample(ScanOptions::new()).unwrap();

        assert_eq!(first.folders, second.folders);
        assert_eq!(first.files, second.files);
        assert_eq!(first.counters, second.counters);
    }

    #[test]
    fn test_counters_belong_to_the_caller() {
        let mut source = SampleSource::new();
        let counters = CounterRegistry::new();

        scan_collect(&mut source, &counters, ScanOptions::new()).unwrap();
        assert_eq!(counters.get(COUNTER_FOLDERS_DISCOVERED), Some(4));

        let fresh = scan_collect(&mut source, &CounterRegistry::new(), ScanOptions::new()).unwrap();
        assert_eq!(fresh.counters.get(COUNTER_FOLDERS_DISCOVERED), Some(4));

        let reused = scan_collect(&mut source, &counters, ScanOptions::new()).unwrap();
        assert_eq!(reused.counters.get(COUNTER_FOLDERS_DISCOVERED), Some(8));
    }

    #[test]
    fn test_folders_only() {
        let result = collect_sample(ScanOptions::new().passes(ScanPasses::FoldersOnly)).unwrap();

        assert_eq!(result.folders.len(), 4);
        assert!(result.files.is_empty());
        assert_eq!(result.counters.get(COUNTER_FILES_DISCOVERED), Some(0));
    }

    #[test]
    fn test_files_only_needs_lenient_parents() {
        let counters = CounterRegistry::new();
        let strict = ScanOptions::new().passes(ScanPasses::FilesOnly);
        let err = scan_collect(&mut SampleSource::new(), &counters, strict).unwrap_err();
        assert_eq!(
            err,
            BulkImportError::UnknownParent {
                item: "folder1/file1.1.txt".to_string(),
                parent: "folder1".to_string(),
            }
        );
        // Only file1.txt, at the root, got through.
        assert_eq!(counters.get(COUNTER_FILES_DISCOVERED), Some(1));

        let lenient = ScanOptions::new()
            .passes(ScanPasses::FilesOnly)
            .parent_check(ParentCheck::Lenient);
        let result = collect_sample(lenient).unwrap();
        assert_eq!(result.files.len(), 3);
    }

    #[test]
    fn test_strict_parent_check_rejects_unknown_parent() {
        let counters = CounterRegistry::new();
        let mut received = 0;

        let result = scan(&mut OrphanSource, &counters, orphan_options(), &mut |_| {
            received += 1;
            Ok(())
        });

        assert!(matches!(result, Err(BulkImportError::UnknownParent { .. })));
        assert_eq!(received, 0);
        assert_eq!(counters.get("files discovered"), Some(0));
    }

    #[test]
    fn test_lenient_parent_check_forwards_unknown_parent() {
        let options = orphan_options().parent_check(ParentCheck::Lenient);
        let result = scan_collect(&mut OrphanSource, &CounterRegistry::new(), options).unwrap();

        assert_eq!(result.files.len(), 1);
        assert_eq!(result.counters.get("files discovered"), Some(1));
    }

    #[test]
    fn test_configuration_error_stops_scan() {
        let counters = CounterRegistry::new();
        let mut received = 0;

        let result = scan(&mut OrphanSource, &counters, ScanOptions::new(), &mut |_| {
            received += 1;
            Ok(())
        });

        assert!(matches!(
            result,
            Err(BulkImportError::InvalidConfiguration { ref key, .. }) if key == "root"
        ));
        assert_eq!(received, 0);
        assert!(counters.snapshot().is_empty());
    }

    #[test]
    fn test_cancel_mid_scan() {
        let token = CancellationToken::new();
        let options = ScanOptions::new().cancellation(token.clone());
        let counters = CounterRegistry::new();
        let mut items = Vec::new();

        let result = scan(&mut SampleSource::new(), &counters, options, &mut |item| {
            items.push(item);
            if items.len() == 5 {
                token.cancel();
            }
            Ok(())
        });

        assert_eq!(result, Err(BulkImportError::Cancelled));
        assert_eq!(items.len(), 5);
        for item in &items {
            assert!(!item.name().is_empty());
            if let Some(parent) = item.parent_path() {
                assert!(items.iter().any(|i| i.is_folder() && &i.path() == parent));
            }
        }

        let folders = items.iter().filter(|i| i.is_folder()).count() as u64;
        let files = items.len() as u64 - folders;
        assert_eq!((folders, files), (4, 1));
        assert_eq!(counters.get(COUNTER_FOLDERS_DISCOVERED), Some(folders));
        assert_eq!(counters.get(COUNTER_FILES_DISCOVERED), Some(files));
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let counters = CounterRegistry::new();
        let mut received = 0;

        let result = scan(
            &mut SampleSource::new(),
            &counters,
            ScanOptions::new().cancellation(token),
            &mut |_| {
                received += 1;
                Ok(())
            },
        );

        assert!(result.unwrap_err().is_cancelled());
        assert_eq!(received, 0);
        assert_eq!(counters.get(COUNTER_FOLDERS_DISCOVERED), Some(0));
        assert_eq!(counters.get(COUNTER_FILES_DISCOVERED), Some(0));
    }

    #[test]
    fn test_scan_result_serializes() {
        let result = collect_sample(ScanOptions::new()).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["source"], "Sample");
        assert_eq!(json["folders"].as_array().unwrap().len(), 4);
        assert_eq!(json["files"][2]["versions"], 10);
        assert_eq!(json["counters"]["files discovered"], 3);
    }
}
