//! Error and diagnostic system for the ftree parser.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Multiple labeled spans for rich error context
//! - Severity levels
//! - Diagnostic collector for accumulating findings without failing
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single finding with an optional error code, the entity it concerns,
//! source locations, and help text. Reading a file never fails: every phase
//! pushes diagnostics into a [`DiagnosticCollector`] and continues.
//!
//! # Example
//!
//! ```
//! # use ftree_core::identifier::Xref;
//! # use ftree_parser::error::{Diagnostic, ErrorCode};
//! # use ftree_parser::Span;
//!
//! let diag = Diagnostic::error("duplicate INDI id @I1@")
//!     .with_code(ErrorCode::E201)
//!     .with_subject(Xref::new("I1"))
//!     .with_label(Span::new(100..111), "duplicate record")
//!     .with_secondary_label(Span::new(20..31), "first defined here")
//!     .with_help("rename one of the records");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod severity;

pub use collector::DiagnosticCollector;
pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use severity::Severity;
