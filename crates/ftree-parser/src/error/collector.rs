//! Collector for accumulating diagnostics during a processing phase.
//!
//! Every phase of reading a file reports problems into a
//! [`DiagnosticCollector`] and keeps going; nothing in parsing fails fast.

use log::debug;

use crate::error::Diagnostic;

/// A collector for accumulating diagnostics during a processing phase.
///
/// # Example
///
/// ```
/// # use ftree_parser::error::{Diagnostic, DiagnosticCollector, ErrorCode};
/// # use ftree_parser::Span;
///
/// let mut collector = DiagnosticCollector::new();
///
/// collector.emit(
///     Diagnostic::error("line has no tag")
///         .with_code(ErrorCode::E003)
///         .with_label(Span::new(0..2), "expected a tag"),
/// );
/// collector.emit(Diagnostic::warning("level skip"));
///
/// assert!(collector.has_errors());
/// assert_eq!(collector.into_diagnostics().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    ///
    /// The diagnostic is added to the collection and if it's an error,
    /// the collector is marked as having errors.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        debug!(diagnostic:% = diagnostic; "Diagnostic emitted");
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Returns `true` if any error-severity diagnostic was emitted.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Number of diagnostics collected so far.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Finish collection, returning every diagnostic in emission order.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl Extend<Diagnostic> for DiagnosticCollector {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        for diagnostic in iter {
            self.emit(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_new_is_empty() {
        let collector = DiagnosticCollector::new();
        assert!(collector.is_empty());
        assert!(!collector.has_errors());
        assert!(collector.into_diagnostics().is_empty());
    }

    #[test]
    fn test_collector_warning_is_not_an_error() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::warning("test warning"));
        collector.emit(Diagnostic::info("test info"));

        assert!(!collector.has_errors());
        assert_eq!(collector.len(), 2);
    }

    #[test]
    fn test_collector_keeps_emission_order() {
        let mut collector = DiagnosticCollector::new();
        collector.extend([
            Diagnostic::error("error 1"),
            Diagnostic::warning("warning 1"),
            Diagnostic::error("error 2"),
        ]);

        assert!(collector.has_errors());
        let messages: Vec<String> = collector
            .into_diagnostics()
            .iter()
            .map(|d| d.message().to_string())
            .collect();
        assert_eq!(messages, vec!["error 1", "warning 1", "error 2"]);
    }
}
