//! Labeled source spans for diagnostic messages.
//!
//! A label associates a message with a span in the source text,
//! pointing at the line (or part of it) a diagnostic is about.

use crate::Span;

/// A labeled span in source text.
///
/// # Primary vs Secondary Labels
///
/// - **Primary labels** mark the main location of an error or warning.
///   There should typically be one primary label per diagnostic.
/// - **Secondary labels** provide additional context, such as
///   "first defined here" for a duplicated record id.
///
/// # Example
///
/// ```text
/// error[E201]: duplicate INDI id @I1@
///   --> family.ged:12:1
///    |
/// 12 | 0 @I1@ INDI
///    | ^^^^^^^^^^^ duplicate record
///    |
///   --> family.ged:3:1
///    |
///  3 | 0 @I1@ INDI
///    | ----------- first defined here
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    /// Get the span this label applies to.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Get the label message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this is a primary label.
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    /// Check if this is a secondary label.
    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}
