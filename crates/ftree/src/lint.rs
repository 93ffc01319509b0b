//! Lint engine for loaded family graphs.
//!
//! Linting never changes the graph. Each [`Check`] looks at the graph on its
//! own and adds its findings; the engine then sorts everything by subject id
//! and category so that the same graph always yields the same list.
//!
//! # Checks
//!
//! | code | category            | severity |
//! |------|---------------------|----------|
//! | E200 | dangling reference  | error    |
//! | E201 | duplicate id        | error    |
//! | E300 | missing name        | warning  |
//! | E301 | missing birth date  | warning  |
//! | E302 | missing death date  | info     |
//! | E303 | empty family        | warning  |
//! | E304 | ancestor cycle      | error    |

mod ancestry;
mod checks;

use log::{debug, info};

use ftree_core::graph::FamilyGraph;
use ftree_parser::error::Diagnostic;

use crate::config::LintConfig;

pub use ancestry::AncestorCycles;
pub use checks::{
    DanglingReferences, DuplicateIds, EmptyFamilies, MissingBirthDates, MissingDeathDates,
    MissingNames,
};

/// A single lint check.
pub trait Check {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Inspect `graph` and push any findings.
    fn run(&self, graph: &FamilyGraph, findings: &mut Vec<Diagnostic>);
}

/// Runs a fixed battery of checks over a graph.
pub struct LintEngine {
    checks: Vec<Box<dyn Check>>,
}

impl LintEngine {
    /// Create an engine with every built-in check.
    pub fn new(config: &LintConfig) -> Self {
        let checks: Vec<Box<dyn Check>> = vec![
            Box::new(DanglingReferences),
            Box::new(DuplicateIds),
            Box::new(MissingNames),
            Box::new(MissingBirthDates),
            Box::new(MissingDeathDates::new(
                config.plausible_lifespan(),
                config.reference_year(),
            )),
            Box::new(EmptyFamilies),
            Box::new(AncestorCycles),
        ];
        Self { checks }
    }

    /// Create an engine running only the given checks.
    pub fn with_checks(checks: Vec<Box<dyn Check>>) -> Self {
        Self { checks }
    }

    /// Run every check and return the findings, sorted by subject id and then
    /// category. Findings that tie keep the order their check produced them in.
    pub fn run(&self, graph: &FamilyGraph) -> Vec<Diagnostic> {
        info!(checks = self.checks.len(); "Linting graph");

        let mut findings = Vec::new();
        for check in &self.checks {
            let before = findings.len();
            check.run(graph, &mut findings);
            debug!(check = check.name(), findings = findings.len() - before; "Check finished");
        }

        findings.sort_by(|a, b| {
            a.subject()
                .cmp(&b.subject())
                .then_with(|| a.category().cmp(b.category()))
        });

        info!(findings = findings.len(); "Lint finished");
        findings
    }
}

impl Default for LintEngine {
    fn default() -> Self {
        Self::new(&LintConfig::default())
    }
}

/// Lint `graph` with every built-in check.
pub fn lint(graph: &FamilyGraph, config: &LintConfig) -> Vec<Diagnostic> {
    LintEngine::new(config).run(graph)
}
