//! ftree - Validation and generational layout for genealogy record files.
//!
//! Reads level/tag/value genealogy files into a family graph, checks the graph
//! for common data problems, and lays it out as pedigree, descendant or
//! hourglass trees for an external renderer.

pub mod config;
pub mod layout;
pub mod lint;
pub mod stats;

mod error;

pub use ftree_core::{date, graph, identifier, model};
pub use ftree_parser::{
    Parsed,
    error::{Diagnostic, ErrorCode, Severity},
};

pub use error::FtreeError;

use std::{fs, path::Path};

use log::{debug, info, trace};

use config::AppConfig;
use graph::FamilyGraph;
use identifier::Xref;
use layout::{EngineBuilder, LayoutOptions, PositionedTree, ViewMode};
use lint::LintEngine;
use stats::Statistics;

/// Everything `check` found in a parsed file.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub statistics: Statistics,
    /// Parse diagnostics in source order, followed by lint findings sorted by
    /// subject and category.
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckReport {
    /// Returns `true` if any error-severity diagnostic was found.
    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// Number of diagnostics with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity() == severity)
            .count()
    }
}

/// Builder for parsing, checking and laying out family trees.
///
/// # Examples
///
/// ```rust
/// use ftree::{FamilyTreeBuilder, identifier::Xref, layout::ViewMode};
///
/// let source = "\
/// 0 @I1@ INDI
/// 1 NAME Jane /Doe/
/// 0 @I2@ INDI
/// 1 NAME John /Doe/
/// 0 @F1@ FAM
/// 1 HUSB @I2@
/// 1 CHIL @I1@
/// ";
///
/// let builder = FamilyTreeBuilder::default();
/// let parsed = builder.parse(source);
///
/// let report = builder.check(&parsed);
/// assert!(!report.has_errors());
///
/// let options = builder.layout_options();
/// let tree = builder
///     .layout(&parsed.graph, Xref::new("I1"), ViewMode::Pedigree, &options)
///     .expect("I1 exists");
/// assert_eq!(tree.generation_of(Xref::new("I2")), Some(-1));
/// ```
#[derive(Debug, Default)]
pub struct FamilyTreeBuilder {
    config: AppConfig,
}

impl FamilyTreeBuilder {
    /// Create a new builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including lint and layout settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse source text into a family graph plus diagnostics.
    ///
    /// Parsing never fails; see [`ftree_parser::parse`].
    pub fn parse(&self, source: &str) -> Parsed {
        info!("Parsing family tree");
        let parsed = ftree_parser::parse(source);
        debug!(
            individuals = parsed.graph.individuals_count(),
            families = parsed.graph.families_count(),
            diagnostics = parsed.diagnostics.len();
            "Family tree parsed"
        );
        trace!(graph:? = parsed.graph; "Parsed graph");
        parsed
    }

    /// Decode and parse raw file content.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Parsed {
        info!(bytes = bytes.len(); "Parsing family tree from bytes");
        ftree_parser::parse_bytes(bytes)
    }

    /// Read and parse a file.
    ///
    /// # Errors
    ///
    /// Returns [`FtreeError::Io`] if the file cannot be read.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<Parsed, FtreeError> {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Reading family tree file");
        let bytes = fs::read(path)?;
        Ok(self.parse_bytes(&bytes))
    }

    /// Run the lint checks over a graph.
    pub fn lint(&self, graph: &FamilyGraph) -> Vec<Diagnostic> {
        LintEngine::new(self.config.lint()).run(graph)
    }

    /// Collect statistics, parse diagnostics and lint findings.
    ///
    /// Dangling references and duplicate ids are reported by the lint
    /// checks, so the parser's copies of those are left out.
    pub fn check(&self, parsed: &Parsed) -> CheckReport {
        let statistics = Statistics::collect(&parsed.graph);

        let mut diagnostics: Vec<Diagnostic> = parsed
            .diagnostics
            .iter()
            .filter(|d| !matches!(d.code(), Some(ErrorCode::E200 | ErrorCode::E201)))
            .cloned()
            .collect();
        diagnostics.extend(self.lint(&parsed.graph));

        let report = CheckReport {
            statistics,
            diagnostics,
        };
        info!(
            errors = report.count(Severity::Error),
            warnings = report.count(Severity::Warning),
            infos = report.count(Severity::Info);
            "Check complete"
        );
        report
    }

    /// Layout options taken from the configuration.
    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions::from(self.config.layout())
    }

    /// Lay out `graph` around `root`, within the configured depth limit and
    /// node budget.
    ///
    /// # Errors
    ///
    /// Returns [`FtreeError::Layout`] if the root is unknown or a limit is
    /// exceeded.
    pub fn layout(
        &self,
        graph: &FamilyGraph,
        root: Xref,
        mode: ViewMode,
        options: &LayoutOptions,
    ) -> Result<PositionedTree, FtreeError> {
        let engine = EngineBuilder::new()
            .with_depth_limit(self.config.layout().depth_limit())
            .with_node_budget(self.config.layout().node_budget())
            .build();
        Ok(engine.layout(graph, root, mode, options)?)
    }

    /// Serialize a positioned tree as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FtreeError::Export`] if serialization fails.
    pub fn to_json(&self, tree: &PositionedTree) -> Result<String, FtreeError> {
        Ok(serde_json::to_string_pretty(tree)?)
    }
}
