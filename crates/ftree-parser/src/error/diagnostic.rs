//! The core diagnostic type for the ftree error system.
//!
//! A [`Diagnostic`] represents a single finding (error, warning or info)
//! with an optional error code, the entity it is about, labeled source spans,
//! and help text.

use std::fmt;

use ftree_core::identifier::Xref;

use crate::{
    Span,
    error::{Severity, error_code::ErrorCode, label::Label},
};

/// A rich diagnostic message with source location information.
///
/// Diagnostics carry:
/// - A severity level
/// - An optional error code, whose description is the diagnostic's category
/// - A primary message describing the issue
/// - The id of the entity the diagnostic is about, when there is one
/// - The 1-based source line, when there is one
/// - Zero or more labeled source spans
/// - Optional help text with suggestions
///
/// # Example
///
/// ```text
/// error[E200]: @F1@ CHIL points to undefined individual @I2@
///   --> family.ged:9:1
///    |
///  9 | 1 CHIL @I2@
///    | ^^^^^^^^^^^ no record with this id
///    |
///    = help: define the record or remove the link
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    subject: Option<Xref>,
    line: Option<usize>,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use ftree_parser::error::{Diagnostic, ErrorCode};
    /// # use ftree_parser::Span;
    ///
    /// let diag = Diagnostic::error("line has no level")
    ///     .with_code(ErrorCode::E001)
    ///     .with_line(4)
    ///     .with_label(Span::new(30..38), "expected a level number")
    ///     .with_help("every line starts with a number such as `0` or `1`");
    /// assert!(diag.severity().is_error());
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Create an info diagnostic.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the human-readable category: the code's description, or the
    /// message for uncoded diagnostics.
    pub fn category(&self) -> &str {
        self.code
            .map(|code| code.description())
            .unwrap_or(&self.message)
    }

    /// Get the id of the entity this diagnostic is about, if any.
    pub fn subject(&self) -> Option<Xref> {
        self.subject
    }

    /// Get the 1-based source line, if any.
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Set the entity this diagnostic is about.
    pub fn with_subject(mut self, subject: Xref) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Set the source line.
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Create a new diagnostic with the given severity and message.
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            subject: None,
            line: None,
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}
