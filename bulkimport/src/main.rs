//! # bulkimport
//!
//! A CLI for listing and running bulk import sources.
//!
//! ## Overview
//!
//! bulkimport is built on top of bulkimportlib. It runs an import source by
//! name and reports every folder and file the source discovers, followed by
//! the source's progress counters.
//!
//! ## Usage
//!
//! ```bash
//! # List the registered sources (default command)
//! bulkimport
//! bulkimport sources
//!
//! # Run the sample source
//! bulkimport scan Sample
//!
//! # Pass source options and print JSON
//! bulkimport scan Sample --option key=value --output json
//!
//! # Run a single pass
//! bulkimport scan --folders-only
//! bulkimport scan --files-only
//!
//! # Show per-item log events
//! RUST_LOG=debug bulkimport scan
//! ```

mod render;

use std::process::ExitCode;

use bulkimportlib::{
    scan_collect, CounterRegistry, ParentCheck, ScanOptions, ScanPasses, SourceOptions,
    SourceRegistry,
};
use clap::{Arg, ArgAction, ArgMatches, Command};
use console::Style;
use outstanding::cli::{App, CommandContext, HandlerResult, Output, RunResult};
use outstanding::{OutputMode, Theme};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::render::{scan_context, sources_context, SCAN_TEMPLATE, SOURCES_TEMPLATE};

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("bulkimport")
        .version(env!("CARGO_PKG_VERSION"))
        .about("List and run bulk import sources")
        .subcommand(
            Command::new("sources").about("List registered import sources (default command)"),
        )
        .subcommand(
            Command::new("scan")
                .about("Run an import source and report what it discovers")
                .arg(
                    Arg::new("source")
                        .help("Name of the source to run")
                        .default_value("Sample"),
                )
                .arg(
                    Arg::new("option")
                        .short('o')
                        .long("option")
                        .action(ArgAction::Append)
                        .value_name("KEY=VALUE")
                        .help("Source option (can be specified multiple times)"),
                )
                .arg(
                    Arg::new("folders-only")
                        .long("folders-only")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("files-only")
                        .help("Run only the folder pass"),
                )
                .arg(
                    Arg::new("files-only")
                        .long("files-only")
                        .action(ArgAction::SetTrue)
                        .help("Run only the file pass"),
                )
                .arg(
                    Arg::new("lenient")
                        .long("lenient")
                        .action(ArgAction::SetTrue)
                        .help("Accept items whose parent folder was not emitted"),
                ),
        )
}

/// Build source options from matches
fn build_source_options(matches: &ArgMatches) -> Result<SourceOptions, anyhow::Error> {
    let pairs = matches
        .get_many::<String>("option")
        .map(|v| v.map(|s| s.as_str()).collect::<Vec<_>>())
        .unwrap_or_default();

    Ok(SourceOptions::from_pairs(pairs)?)
}

/// Build scan options from matches
fn build_scan_options(matches: &ArgMatches) -> Result<ScanOptions, anyhow::Error> {
    let passes = if matches.get_flag("folders-only") {
        ScanPasses::FoldersOnly
    } else if matches.get_flag("files-only") {
        ScanPasses::FilesOnly
    } else {
        ScanPasses::All
    };

    // A files-only run never sees the folders, so parents cannot be checked.
    let parent_check = if matches.get_flag("lenient") || passes == ScanPasses::FilesOnly {
        ParentCheck::Lenient
    } else {
        ParentCheck::Strict
    };

    Ok(ScanOptions::new()
        .options(build_source_options(matches)?)
        .passes(passes)
        .parent_check(parent_check))
}

/// Handler for sources command
fn sources_handler(
    _matches: &ArgMatches,
    ctx: &CommandContext,
) -> HandlerResult<serde_json::Value> {
    let registry = SourceRegistry::with_builtin();

    // For JSON mode, return raw data
    if ctx.output_mode.is_structured() {
        let sources: Vec<serde_json::Value> = registry
            .names()
            .filter_map(|name| registry.get(name).ok())
            .map(|source| {
                serde_json::json!({
                    "description": source.describe(),
                    "parameters": source.parameters(),
                    "in_place_import": source.supports_in_place_import(),
                })
            })
            .collect();
        return Ok(Output::Render(serde_json::Value::Array(sources)));
    }

    Ok(Output::Render(serde_json::to_value(sources_context(&registry))?))
}

/// Handler for scan command
fn scan_handler(matches: &ArgMatches, ctx: &CommandContext) -> HandlerResult<serde_json::Value> {
    let name = matches
        .get_one::<String>("source")
        .map(|s| s.as_str())
        .unwrap_or("Sample");
    let options = build_scan_options(matches)?;

    let mut registry = SourceRegistry::with_builtin();
    let source = registry.get_mut(name)?;
    debug!(source = name, passes = ?options.passes, "starting scan");

    let counters = CounterRegistry::new();
    let result = scan_collect(source, &counters, options).map_err(|e| {
        warn!(source = name, counters = ?counters.snapshot(), "scan stopped: {e}");
        e
    })?;

    // For JSON mode, return raw data
    if ctx.output_mode.is_structured() {
        return Ok(Output::Render(serde_json::to_value(&result)?));
    }

    Ok(Output::Render(serde_json::to_value(scan_context(&result))?))
}

/// Create the theme with styles
fn create_theme() -> Theme {
    Theme::new().add("category", Style::new().bold())
}

/// Install the log subscriber. Logs go to stderr so JSON output stays clean.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Output mode requested by the global `--output` flag.
fn requested_output_mode(matches: &ArgMatches) -> OutputMode {
    match matches.get_one::<String>("_output_mode").map(String::as_str) {
        Some("json") => OutputMode::Json,
        Some("text") => OutputMode::Text,
        Some("term-debug") => OutputMode::TermDebug,
        Some("term") => OutputMode::Term,
        _ => OutputMode::Auto,
    }
}

/// Print a handler result produced outside the app dispatcher.
fn print_handler_result(
    result: HandlerResult<serde_json::Value>,
    template: &str,
    mode: OutputMode,
) -> ExitCode {
    let rendered = match result {
        Ok(Output::Render(value)) if mode.is_structured() => serde_json::to_string_pretty(&value)
            .map(|json| json + "\n")
            .map_err(|e| e.to_string()),
        Ok(Output::Render(value)) => {
            outstanding::render(template, &value, &create_theme()).map_err(|e| e.to_string())
        }
        Ok(_) => Ok(String::new()),
        Err(e) => Err(e.to_string()),
    };

    match rendered {
        Ok(text) => {
            print!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    init_logging();

    let result = App::builder()
        .theme(create_theme())
        .command("sources", sources_handler, SOURCES_TEMPLATE)
        .command("scan", scan_handler, SCAN_TEMPLATE)
        .run_to_string(build_command(), std::env::args());

    match result {
        RunResult::Handled(output) if output.starts_with("Error:") => {
            eprintln!("{}", output);
            ExitCode::FAILURE
        }
        RunResult::Handled(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        // No handler produces binary output.
        RunResult::Binary(_, _) => ExitCode::SUCCESS,
        RunResult::NoMatch(matches) => {
            // Bare `bulkimport` lists the sources.
            let mode = requested_output_mode(&matches);
            let ctx = CommandContext {
                output_mode: mode,
                command_path: vec![],
            };
            print_handler_result(sources_handler(&matches, &ctx), SOURCES_TEMPLATE, mode)
        }
    }
}
