//! Severity levels for diagnostics.
//!
//! This module defines the severity of diagnostic messages, distinguishing
//! real data errors from advisory warnings and informational notes.

use std::fmt;

/// The severity level of a diagnostic.
///
/// Severities are ordered from most to least severe, so sorting a list of
/// severities puts errors first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// The input is wrong in a way that lost or misplaced data.
    Error,

    /// The input is suspicious or incomplete, but nothing was lost.
    Warning,

    /// Something was inferred or repaired; no action is required.
    Info,
}

impl Severity {
    /// Returns `true` if this is an error severity.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Returns `true` if this is a warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }

    /// Returns `true` if this is an info severity.
    pub fn is_info(&self) -> bool {
        matches!(self, Severity::Info)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}
