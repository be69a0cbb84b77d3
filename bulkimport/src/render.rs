//! Template contexts for CLI output.
//!
//! Handlers build these pre-formatted structures and hand them to the
//! templates; the templates only lay them out.

use bulkimportlib::{CounterSnapshot, ImportItem, ScanResult, SourceRegistry};
use serde::Serialize;

/// Include templates at compile time
pub const SOURCES_TEMPLATE: &str = include_str!("../templates/sources.jinja");
pub const SCAN_TEMPLATE: &str = include_str!("../templates/scan.jinja");

const KIND_WIDTH: usize = 8;
const PATH_WIDTH: usize = 48;
const CELL_WIDTH: usize = 10;
const NAME_WIDTH: usize = 16;

/// One row of the source listing
#[derive(Debug, Serialize)]
pub struct SourceRow {
    name: String,
    in_place: String,
    config_ui: String,
    description: String,
}

/// Data context for the sources template
#[derive(Debug, Serialize)]
pub struct SourcesContext {
    header: String,
    separator: String,
    rows: Vec<SourceRow>,
}

/// Data context for the scan template
#[derive(Debug, Serialize)]
pub struct ScanContext {
    title: String,
    header: String,
    separator: String,
    rows: Vec<String>,
    counters: Vec<String>,
    total: String,
}

/// Truncate a path to fit within max_len, adding ".." prefix if needed
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() > max_len {
        let tail: String = path.chars().rev().take(max_len - 2).collect();
        format!("..{}", tail.chars().rev().collect::<String>())
    } else {
        path.to_string()
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Build the listing of every registered source.
pub fn sources_context(registry: &SourceRegistry) -> SourcesContext {
    let rows = registry
        .names()
        .filter_map(|name| registry.get(name).ok())
        .map(|source| {
            let description = source.describe();
            SourceRow {
                name: format!("{:<width$}", description.name, width = NAME_WIDTH),
                in_place: format!(
                    "{:<width$}",
                    yes_no(source.supports_in_place_import()),
                    width = CELL_WIDTH
                ),
                config_ui: description.config_ui_uri.unwrap_or("-").to_string(),
                description: description.description.to_string(),
            }
        })
        .collect();

    let header = format!(
        "{:<name$}{:<cell$}{}",
        "Source",
        "In-place",
        "Config UI",
        name = NAME_WIDTH,
        cell = CELL_WIDTH
    );

    SourcesContext {
        separator: "-".repeat(header.len() + 24),
        header,
        rows,
    }
}

fn item_row(item: &ImportItem) -> String {
    let kind = if item.is_folder() { "folder" } else { "file" };
    let versions = item
        .version_count()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{:<kind_w$}{:<path_w$}{:>cell_w$}",
        kind,
        truncate_path(&item.path().to_string(), PATH_WIDTH - 2),
        versions,
        kind_w = KIND_WIDTH,
        path_w = PATH_WIDTH,
        cell_w = CELL_WIDTH
    )
}

fn counter_rows(counters: &CounterSnapshot) -> Vec<String> {
    counters
        .iter()
        .map(|(name, count)| {
            format!(
                "{:<width$}{:>cell_w$}",
                name,
                count,
                width = KIND_WIDTH + PATH_WIDTH,
                cell_w = CELL_WIDTH
            )
        })
        .collect()
}

/// Build the scan report: one row per item, then the counters.
pub fn scan_context(result: &ScanResult) -> ScanContext {
    let header = format!(
        "{:<kind_w$}{:<path_w$}{:>cell_w$}",
        "Kind",
        "Path",
        "Versions",
        kind_w = KIND_WIDTH,
        path_w = PATH_WIDTH,
        cell_w = CELL_WIDTH
    );

    let rows = result
        .folders
        .iter()
        .chain(result.files.iter())
        .map(item_row)
        .collect();

    ScanContext {
        title: format!("Source: {}", result.source),
        separator: "-".repeat(header.len()),
        header,
        rows,
        counters: counter_rows(&result.counters),
        total: format!(
            "Total ({} folders, {} files)",
            result.folders.len(),
            result.files.len()
        ),
    }
}
