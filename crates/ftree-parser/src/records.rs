//! Groups lexed lines into top-level record trees.
//!
//! Each level 0 line starts a new [`Record`]. Deeper lines become children of
//! the nearest open line with a smaller level, so a record is a tree whose
//! shape follows the level numbers:
//!
//! ```text
//! 0 @I1@ INDI          Record (Individual)
//! 1 NAME Jane /Doe/    ├── NAME
//! 1 BIRT               └── BIRT
//! 2 DATE 1 JAN 1900        └── DATE
//! ```
//!
//! A line that jumps more than one level deeper than its parent is still
//! attached to the deepest open line, with a structure diagnostic, so no data
//! is dropped. Only nested lines that come before the first record are lost.

use log::debug;

use ftree_core::span::{LineSpan, Span};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    lexer::LineRecord,
};

/// The type of a top-level record, from its level 0 tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKind {
    Head,
    Individual,
    Family,
    Submitter,
    Trailer,
    /// Any other level 0 tag (`SOUR`, `NOTE`, `OBJE`, `REPO`, ...).
    Other(String),
}

impl RecordKind {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "HEAD" => Self::Head,
            "INDI" => Self::Individual,
            "FAM" => Self::Family,
            "SUBM" => Self::Submitter,
            "TRLR" => Self::Trailer,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A line together with the lines nested under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordNode<'a> {
    pub line: LineRecord<'a>,
    pub children: Vec<RecordNode<'a>>,
}

impl<'a> RecordNode<'a> {
    fn new(line: LineRecord<'a>) -> Self {
        Self {
            line,
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> &'a str {
        self.line.tag
    }

    /// The first child with the given tag.
    pub fn child(&self, tag: &str) -> Option<&RecordNode<'a>> {
        self.children.iter().find(|child| child.tag() == tag)
    }

    /// The value of the first child with the given tag.
    pub fn child_value(&self, tag: &str) -> Option<&'a str> {
        self.child(tag).and_then(|child| child.line.value)
    }
}

/// A top-level record tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<'a> {
    pub kind: RecordKind,
    pub root: RecordNode<'a>,
    /// First and last source line of the record.
    pub lines: LineSpan,
}

impl<'a> Record<'a> {
    /// Byte span of the record's level 0 line.
    pub fn span(&self) -> Span {
        self.root.line.span
    }
}

/// Incremental builder turning a stream of lines into records.
#[derive(Debug, Default)]
pub struct RecordTreeBuilder<'a> {
    records: Vec<Record<'a>>,
    /// Open lines, outermost first. The bottom entry is the current record root.
    stack: Vec<RecordNode<'a>>,
    lines: Option<LineSpan>,
    trailer_seen: bool,
    after_trailer_reported: bool,
}

impl<'a> RecordTreeBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the next line in source order.
    pub fn push(&mut self, line: LineRecord<'a>, diagnostics: &mut DiagnosticCollector) {
        if line.level == 0 {
            self.close_record();
            if self.trailer_seen && !self.after_trailer_reported {
                self.after_trailer_reported = true;
                diagnostics.emit(
                    Diagnostic::warning(format!("`{}` record after the trailer", line.tag))
                        .with_code(ErrorCode::E103)
                        .with_line(line.line)
                        .with_label(line.span, "record after `TRLR`")
                        .with_help("the trailer should be the last record of the file"),
                );
            }
            self.lines = Some(LineSpan::single(line.line));
            self.stack.push(RecordNode::new(line));
            return;
        }

        if self.stack.is_empty() {
            diagnostics.emit(
                Diagnostic::error(format!("`{}` line is not inside any record", line.tag))
                    .with_code(ErrorCode::E101)
                    .with_line(line.line)
                    .with_label(line.span, "dropped")
                    .with_help("records start with a level 0 line"),
            );
            return;
        }

        self.close_to_level(line.level);
        if let Some(parent) = self.stack.last() {
            let parent_level = parent.line.level;
            if line.level > parent_level + 1 {
                diagnostics.emit(
                    Diagnostic::warning(format!(
                        "level {} line nested under level {} line",
                        line.level, parent_level
                    ))
                    .with_code(ErrorCode::E100)
                    .with_line(line.line)
                    .with_label(line.span, "level skips ahead")
                    .with_secondary_label(parent.line.span, "attached here")
                    .with_help(format!("use level {}", parent_level + 1)),
                );
            }
        }
        if let Some(lines) = &mut self.lines {
            lines.extend_to(line.line);
        }
        self.stack.push(RecordNode::new(line));
    }

    /// Finish the last record and return all records in source order.
    pub fn finish(mut self) -> Vec<Record<'a>> {
        self.close_record();
        debug!(records = self.records.len(); "Record trees built");
        self.records
    }

    /// Close open lines at `level` or deeper, attaching each to its parent.
    /// The record root is never closed here.
    fn close_to_level(&mut self, level: u8) {
        while self.stack.len() > 1
            && self
                .stack
                .last()
                .is_some_and(|node| node.line.level >= level)
        {
            self.close_top();
        }
    }

    fn close_top(&mut self) {
        let Some(node) = self.stack.pop() else {
            return;
        };
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
        }
    }

    fn close_record(&mut self) {
        while self.stack.len() > 1 {
            self.close_top();
        }
        let Some(root) = self.stack.pop() else {
            return;
        };
        let kind = RecordKind::from_tag(root.line.tag);
        if kind == RecordKind::Trailer {
            self.trailer_seen = true;
        }
        let lines = self
            .lines
            .take()
            .unwrap_or_else(|| LineSpan::single(root.line.line));
        self.records.push(Record { kind, root, lines });
    }
}

/// Group `lines` into top-level records.
pub fn build_records<'a>(
    lines: impl IntoIterator<Item = LineRecord<'a>>,
    diagnostics: &mut DiagnosticCollector,
) -> Vec<Record<'a>> {
    let mut builder = RecordTreeBuilder::new();
    for line in lines {
        builder.push(line, diagnostics);
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn records(source: &str) -> (Vec<Record<'_>>, Vec<Diagnostic>) {
        let mut diagnostics = DiagnosticCollector::new();
        let lines = lex(source).filter_map(Result::ok);
        let records = build_records(lines, &mut diagnostics);
        (records, diagnostics.into_diagnostics())
    }

    #[test]
    fn test_groups_by_level() {
        let source = "0 HEAD\n1 CHAR UTF-8\n0 @I1@ INDI\n1 NAME Jane /Doe/\n1 BIRT\n2 DATE 1900\n2 PLAC Here\n1 SEX F\n0 TRLR\n";
        let (records, diagnostics) = records(source);

        assert!(diagnostics.is_empty());
        let kinds: Vec<&RecordKind> = records.iter().map(|r| &r.kind).collect();
        assert_eq!(
            kinds,
            vec![&RecordKind::Head, &RecordKind::Individual, &RecordKind::Trailer]
        );

        let indi = &records[1];
        let tags: Vec<&str> = indi.root.children.iter().map(|c| c.tag()).collect();
        assert_eq!(tags, vec!["NAME", "BIRT", "SEX"]);
        let birth = indi.root.child("BIRT").unwrap();
        assert_eq!(birth.child_value("DATE"), Some("1900"));
        assert_eq!(birth.child_value("PLAC"), Some("Here"));
        assert_eq!(indi.lines.first(), 3);
        assert_eq!(indi.lines.last(), 8);
    }

    #[test]
    fn test_level_skip_attaches_to_deepest_open_line() {
        let (records, diagnostics) = records("0 @I1@ INDI\n2 DATE 1900\n1 NAME A\n");

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E100));
        assert_eq!(diagnostics[0].line(), Some(2));

        let children: Vec<&str> = records[0].root.children.iter().map(|c| c.tag()).collect();
        assert_eq!(children, vec!["DATE", "NAME"]);
    }

    #[test]
    fn test_level_skip_under_nested_line() {
        let (records, diagnostics) = records("0 @I1@ INDI\n1 BIRT\n3 DATE 1900\n");

        assert_eq!(diagnostics.len(), 1);
        let birth = records[0].root.child("BIRT").unwrap();
        assert_eq!(birth.child_value("DATE"), Some("1900"));
    }

    #[test]
    fn test_line_before_first_record_is_dropped() {
        let (records, diagnostics) = records("1 NAME Lost\n0 HEAD\n");

        assert_eq!(records.len(), 1);
        assert!(records[0].root.children.is_empty());
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E101));
        assert!(diagnostics[0].severity().is_error());
    }

    #[test]
    fn test_content_after_trailer_is_reported_once() {
        let (records, diagnostics) = records("0 TRLR\n0 @I1@ INDI\n0 @I2@ INDI\n");

        assert_eq!(records.len(), 3);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E103));
        assert!(diagnostics[0].severity().is_warning());
    }

    #[test]
    fn test_unknown_record_kind() {
        let (records, _) = records("0 @S1@ SOUR\n1 TITL Census\n");
        assert_eq!(records[0].kind, RecordKind::Other("SOUR".to_string()));
        assert_eq!(records[0].root.line.xref, Some(ftree_core::identifier::Xref::new("S1")));
    }
}
