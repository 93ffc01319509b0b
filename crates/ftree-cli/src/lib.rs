//! CLI logic for the ftree genealogy tool.
//!
//! `ftree check` validates a file and prints its statistics and diagnostics;
//! `ftree layout` lays out a tree around one individual and writes it as JSON.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, CheckArgs, Command, LayoutArgs};

use std::{fmt::Write as _, fs};

use log::{info, warn};

use ftree::{FamilyTreeBuilder, FtreeError, Parsed, identifier::Xref};
use ftree_parser::{decode, error::Diagnostic};

use error_adapter::diagnostic_reportables;

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing that needs attention.
    Clean,
    /// The input has error-severity diagnostics.
    InvalidInput,
}

/// Run the ftree CLI application
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `FtreeError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Layout errors
/// - Serialization errors
pub fn run(args: &Args) -> Result<Outcome, FtreeError> {
    let app_config = config::load_config(args.config.as_ref())?;
    let builder = FamilyTreeBuilder::new(app_config);

    match &args.command {
        Command::Check(check) => run_check(&builder, check),
        Command::Layout(layout) => run_layout(&builder, layout),
    }
}

fn run_check(builder: &FamilyTreeBuilder, args: &CheckArgs) -> Result<Outcome, FtreeError> {
    info!(input_path = args.input; "Checking file");

    let (source, parsed) = read_input(builder, &args.input)?;
    let report = builder.check(&parsed);

    println!("{}", report.statistics);
    if !report.diagnostics.is_empty() {
        eprint!("{}", render_diagnostics(&report.diagnostics, &source));
    }

    if report.has_errors() {
        Ok(Outcome::InvalidInput)
    } else {
        Ok(Outcome::Clean)
    }
}

fn run_layout(builder: &FamilyTreeBuilder, args: &LayoutArgs) -> Result<Outcome, FtreeError> {
    let (_, parsed) = read_input(builder, &args.input)?;
    for diagnostic in &parsed.diagnostics {
        warn!(code:? = diagnostic.code(); "{diagnostic}");
    }

    let root = Xref::from_pointer(&args.root).unwrap_or_else(|| Xref::new(&args.root));
    let mode = args.mode.unwrap_or(builder.config().layout().mode());
    let mut options = builder.layout_options();
    if let Some(depth) = args.depth {
        options = options.with_max_depth(depth);
    }
    if args.no_spouses {
        options = options.with_include_spouses(false);
    }
    info!(
        input_path = args.input,
        root:% = root,
        mode:% = mode,
        max_depth = options.max_depth();
        "Laying out tree"
    );

    let tree = builder.layout(&parsed.graph, root, mode, &options)?;
    let json = builder.to_json(&tree)?;

    match &args.output {
        Some(path) => {
            fs::write(path, json)?;
            info!(output_file = path, individuals = tree.len(); "Layout exported successfully");
        }
        None => println!("{json}"),
    }

    Ok(Outcome::Clean)
}

/// Decode the file and parse the decoded text, so diagnostic spans point into
/// the returned source.
fn read_input(builder: &FamilyTreeBuilder, path: &str) -> Result<(String, Parsed), FtreeError> {
    let bytes = fs::read(path)?;
    let decoded = decode(&bytes);
    info!(encoding:? = decoded.encoding; "Decoded input");

    let mut parsed = builder.parse(&decoded.text);
    let mut diagnostics = decoded.diagnostics;
    diagnostics.append(&mut parsed.diagnostics);
    parsed.diagnostics = diagnostics;

    Ok((decoded.text, parsed))
}

/// Render diagnostics with miette's graphical handler, one report each.
pub fn render_diagnostics(diagnostics: &[Diagnostic], source: &str) -> String {
    let reporter = miette::GraphicalReportHandler::new();
    let mut out = String::new();
    for reportable in diagnostic_reportables(diagnostics, source) {
        if reporter.render_report(&mut out, &reportable).is_err() {
            // Fall back to the plain message.
            let _ = writeln!(out, "{reportable}");
        }
    }
    out
}
