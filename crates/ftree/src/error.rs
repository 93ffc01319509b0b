//! Error types for ftree operations.
//!
//! Problems in the input data are never errors: they are reported as
//! [`Diagnostic`](ftree_parser::error::Diagnostic)s next to a best-effort
//! result. [`FtreeError`] covers the failures that leave nothing to return.

use std::io;

use thiserror::Error;

use crate::layout::LayoutError;

/// The main error type for ftree operations.
#[derive(Debug, Error)]
pub enum FtreeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),
}

impl From<serde_json::Error> for FtreeError {
    fn from(error: serde_json::Error) -> Self {
        Self::Export(Box::new(error))
    }
}
