//! # ftree Parser
//!
//! Reads genealogy record text (the level/tag/value line format) into a
//! [`FamilyGraph`]. Reading is permissive: it always produces a graph, and
//! everything wrong with the input is reported as a [`Diagnostic`] instead of
//! an error.
//!
//! ## Usage
//!
//! ```
//! # use ftree_core::identifier::Xref;
//! # use ftree_parser::parse;
//!
//! let source = "\
//! 0 HEAD
//! 0 @I1@ INDI
//! 1 NAME Jane /Doe/
//! 1 FAMS @F1@
//! 0 @F1@ FAM
//! 1 HUSB @I1@
//! 1 CHIL @I2@
//! 0 TRLR
//! ";
//!
//! let parsed = parse(source);
//! assert!(parsed.graph.individual(Xref::new("I1")).is_some());
//! assert!(parsed.graph.family(Xref::new("F1")).is_some());
//! // `@I2@` is never defined.
//! assert!(parsed.has_errors());
//! ```

mod builder;
mod decode;
pub mod error;
mod lexer;
#[cfg(test)]
mod parser_tests;
mod records;

pub use builder::{build_graph, dangling_reference, duplicate_record};
pub use decode::{Decoded, Encoding, decode};
pub use ftree_core::span::Span;
pub use lexer::{Lexer, LineRecord, MAX_LEVEL, lex};
pub use records::{Record, RecordKind, RecordNode, RecordTreeBuilder, build_records};

use log::{debug, info};

use ftree_core::graph::FamilyGraph;

use error::{Diagnostic, DiagnosticCollector};

/// The result of reading one file: the graph plus everything noticed on the way.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub graph: FamilyGraph,
    /// Diagnostics in the order they were produced: decoding, lines, records,
    /// then references.
    pub diagnostics: Vec<Diagnostic>,
}

impl Parsed {
    /// Returns `true` if any error-severity diagnostic was produced.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity().is_error())
    }
}

/// Parse source text into a family graph.
///
/// This is the main entry point. It runs the whole pipeline:
///
/// 1. **Lex** - Split the text into line records
/// 2. **Structure** - Group lines into record trees by level
/// 3. **Build** - Map records to entities and resolve pointers
///
/// Malformed lines are skipped, misplaced lines are attached where they fit
/// best and dangling pointers are left out; each case adds a diagnostic.
pub fn parse(source: &str) -> Parsed {
    info!(bytes = source.len(); "Parsing records");
    let mut diagnostics = DiagnosticCollector::new();

    // Step 1 and 2: lex lazily straight into the tree builder
    let mut records = RecordTreeBuilder::new();
    for result in lex(source) {
        match result {
            Ok(line) => records.push(line, &mut diagnostics),
            Err(diagnostic) => diagnostics.emit(diagnostic),
        }
    }
    let records = records.finish();

    // Step 3: build the graph
    let graph = build_graph(&records, &mut diagnostics);

    debug!(diagnostics = diagnostics.len(); "Parsing finished");
    Parsed {
        graph,
        diagnostics: diagnostics.into_diagnostics(),
    }
}

/// Decode raw bytes (UTF-8, or UTF-16 with a byte-order mark) and parse them.
///
/// Decoding diagnostics come first in the result. Spans refer to the decoded
/// text, so callers that render source snippets should decode with
/// [`decode`] themselves and call [`parse`].
pub fn parse_bytes(bytes: &[u8]) -> Parsed {
    let decoded = decode(bytes);
    let mut parsed = parse(&decoded.text);
    let mut diagnostics = decoded.diagnostics;
    diagnostics.append(&mut parsed.diagnostics);
    parsed.diagnostics = diagnostics;
    parsed
}
