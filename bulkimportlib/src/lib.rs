//! # bulkimportlib
//!
//! Pluggable import sources for a content-repository bulk importer.
//!
//! ## Overview
//!
//! A bulk import source walks a hierarchical namespace and streams what it
//! finds to a consumer, one item at a time. The walk happens in two passes:
//!
//! - **Folders**: every folder, each one emitted after its parent
//! - **Files**: every file, each with the number of historical versions to
//!   import
//!
//! While walking, a source keeps named progress counters in a
//! [`CounterRegistry`] owned by the caller. Counters are declared before the
//! scan starts so a host can show them at zero, and they can be read however
//! the scan ends.
//!
//! ## Features
//!
//! - **Capability trait**: any type implementing [`ImportSource`] can be
//!   registered in a [`SourceRegistry`] and run by name
//! - **Synchronous streaming**: items are handed to the `emit` callback
//!   before the next one is produced; the callback may block
//! - **Cooperative cancellation**: a [`CancellationToken`] is checked between
//!   items and ends the scan with [`BulkImportError::Cancelled`]
//! - **Parent checking**: the scan driver can reject items whose parent
//!   folder was never emitted, before the item is counted
//!
//! ## Example
//!
//! ```rust
//! use bulkimportlib::{scan_collect, CounterRegistry, ScanOptions, SourceRegistry};
//!
//! let mut registry = SourceRegistry::with_builtin();
//! let source = registry.get_mut("Sample").unwrap();
//!
//! let counters = CounterRegistry::new();
//! let result = scan_collect(source, &counters, ScanOptions::new()).unwrap();
//! assert_eq!(result.folders.len(), 4);
//! assert_eq!(result.files.len(), 3);
//! assert_eq!(result.counters.get("files discovered"), Some(3));
//! ```

pub mod cancel;
pub mod data;
pub mod error;
pub mod scan;
pub mod source;

pub use cancel::CancellationToken;
pub use data::{CounterRegistry, CounterSnapshot, ImportItem, ItemKind, ItemPath};
pub use error::BulkImportError;
pub use scan::{scan, scan_collect, ParentCheck, ScanOptions, ScanPasses, ScanResult};
pub use source::{
    ImportSource, ItemSink, SampleSource, SourceDescription, SourceOptions, SourceParameter,
    SourceRegistry,
};

/// Result type for bulkimportlib operations
pub type Result<T> = std::result::Result<T, BulkImportError>;
