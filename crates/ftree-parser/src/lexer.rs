//! Line lexer for genealogy record text.
//!
//! Every non-blank line has the shape `LEVEL [@XREF@] TAG [VALUE]`. The
//! [`Lexer`] walks the source lazily, one line at a time, and yields a
//! [`LineRecord`] per good line or a [`Diagnostic`] per malformed one. A bad
//! line never stops the lexer: the next call simply moves on to the next line.
//!
//! Blank lines are skipped, leading and trailing whitespace is ignored, and a
//! byte-order mark at the start of a line is dropped. Lines may end in `\n`,
//! `\r\n` or a lone `\r`.

use winnow::{
    Parser as _,
    ascii::{space0, space1},
    error::{ContextError, ErrMode},
    token::{take_till, take_while},
};

use ftree_core::identifier::Xref;

use crate::{
    Span,
    error::{Diagnostic, ErrorCode},
};

/// Levels deeper than this are rejected as out of range.
pub const MAX_LEVEL: u8 = 99;

/// One lexed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord<'a> {
    pub level: u8,
    /// The id declared on this line (`0 @I1@ INDI`).
    pub xref: Option<Xref>,
    pub tag: &'a str,
    /// Everything after the tag, or `None` if nothing follows it.
    pub value: Option<&'a str>,
    /// The value read as a pointer, when the whole value is `@id@`-shaped.
    pub pointer: Option<Xref>,
    /// 1-based line number.
    pub line: usize,
    /// Byte range of the line content, without surrounding whitespace.
    pub span: Span,
}

impl LineRecord<'_> {
    /// The value, or the empty string.
    pub fn text(&self) -> &str {
        self.value.unwrap_or_default()
    }
}

/// Rich diagnostic information for a malformed line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
}

type IResult<O> = std::result::Result<O, ErrMode<ContextError<LexerDiagnostic>>>;

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn fail<O>(code: ErrorCode, message: &'static str, help: Option<&'static str>) -> IResult<O> {
    let mut error = ContextError::new();
    error.push(LexerDiagnostic {
        code,
        message,
        help,
    });
    Err(ErrMode::Cut(error))
}

/// Parse the level number at the start of a line.
fn level(input: &mut &str) -> IResult<u8> {
    let token: &str = take_till(0.., is_blank).parse_next(input)?;

    if !token.starts_with(|c: char| c.is_ascii_digit()) {
        return fail(
            ErrorCode::E001,
            "line does not start with a level number",
            Some("every line starts with a level such as `0`, `1` or `2`"),
        );
    }
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return fail(
            ErrorCode::E002,
            "level is not a number",
            Some("separate the level from the tag with a space"),
        );
    }
    match token.parse::<u8>() {
        Ok(level) if level <= MAX_LEVEL => Ok(level),
        _ => fail(ErrorCode::E005, "level is out of range", None),
    }
}

/// Parse an optional `@id@` token followed by whitespace.
fn xref(input: &mut &str) -> IResult<Option<Xref>> {
    if !input.starts_with('@') {
        return Ok(None);
    }
    let token: &str = take_till(1.., is_blank).parse_next(input)?;
    let Some(id) = Xref::from_pointer(token) else {
        return fail(
            ErrorCode::E004,
            "malformed cross-reference id",
            Some("ids are written between two `@`, for example `@I1@`"),
        );
    };
    if space1::<_, ErrMode<ContextError<LexerDiagnostic>>>
        .parse_next(input)
        .is_err()
    {
        return fail(ErrorCode::E003, "line has an id but no tag", None);
    }
    Ok(Some(id))
}

/// Parse the tag, which must be followed by whitespace or the end of the line.
fn tag<'a>(input: &mut &'a str) -> IResult<&'a str> {
    let tag: IResult<&'a str> = take_while(1.., is_tag_char).parse_next(input);
    let Ok(tag) = tag else {
        return fail(
            ErrorCode::E003,
            "line has no tag",
            Some("a tag such as `NAME` or `BIRT` follows the level"),
        );
    };
    if input.starts_with(|c: char| !is_blank(c)) {
        return fail(
            ErrorCode::E003,
            "tag contains invalid characters",
            Some("tags consist of letters, digits and underscores"),
        );
    }
    Ok(tag)
}

/// Parse one trimmed, non-empty line into its parts.
fn line_parts<'a>(
    input: &mut &'a str,
) -> IResult<(u8, Option<Xref>, &'a str, Option<&'a str>)> {
    let level = level(input)?;
    if space1::<_, ErrMode<ContextError<LexerDiagnostic>>>
        .parse_next(input)
        .is_err()
    {
        return fail(ErrorCode::E003, "line has a level but no tag", None);
    }
    let xref = xref(input)?;
    let tag = tag(input)?;
    space0.parse_next(input)?;
    let value = std::mem::take(input);
    Ok((level, xref, tag, (!value.is_empty()).then_some(value)))
}

/// Lazy line lexer over a whole source text.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    offset: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            line: 0,
        }
    }

    /// Split off the next physical line, returning its start offset and text.
    fn next_line(&mut self) -> Option<(usize, &'a str)> {
        if self.offset >= self.source.len() {
            return None;
        }
        let start = self.offset;
        let rest = &self.source[start..];
        let (text, consumed) = match rest.find(['\r', '\n']) {
            Some(idx) => {
                let terminator = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
                (&rest[..idx], idx + terminator)
            }
            None => (rest, rest.len()),
        };
        self.offset += consumed;
        self.line += 1;
        Some((start, text))
    }

    fn lex_line(&self, start: usize, raw: &'a str) -> Option<Result<LineRecord<'a>, Diagnostic>> {
        let without_bom = raw.trim_start_matches('\u{feff}');
        let leading = raw.len() - without_bom.trim_start().len();
        let content = without_bom.trim();
        if content.is_empty() {
            return None;
        }
        let span = Span::new(start + leading..start + leading + content.len());

        let mut input = content;
        let result = match line_parts(&mut input) {
            Ok((level, xref, tag, value)) => Ok(LineRecord {
                level,
                xref,
                tag,
                value,
                pointer: value.and_then(Xref::from_pointer),
                line: self.line,
                span,
            }),
            Err(err) => Err(convert_err_mode(err, span, self.line)),
        };
        Some(result)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<LineRecord<'a>, Diagnostic>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (start, raw) = self.next_line()?;
            if let Some(result) = self.lex_line(start, raw) {
                return Some(result);
            }
        }
    }
}

/// Convert a winnow error for a line into a diagnostic covering that line.
fn convert_err_mode(
    err: ErrMode<ContextError<LexerDiagnostic>>,
    span: Span,
    line: usize,
) -> Diagnostic {
    let context_error = match err {
        ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    let diagnostic = Diagnostic::error("malformed line")
        .with_code(ErrorCode::E003)
        .with_line(line);
    let Some(LexerDiagnostic {
        code,
        message,
        help,
    }) = context_error.context().next()
    else {
        return diagnostic.with_label(span, ErrorCode::E003.description());
    };

    let mut diag = Diagnostic::error(*message)
        .with_code(*code)
        .with_line(line)
        .with_label(span, code.description());
    if let Some(h) = help {
        diag = diag.with_help(*h);
    }
    diag
}

/// Lex `source` lazily, one line record (or diagnostic) per non-blank line.
pub fn lex(source: &str) -> Lexer<'_> {
    Lexer::new(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_ok(source: &str) -> Vec<LineRecord<'_>> {
        lex(source)
            .map(|result| result.expect("line should lex"))
            .collect()
    }

    fn lex_err(line: &str) -> Diagnostic {
        let mut results: Vec<_> = lex(line).collect();
        assert_eq!(results.len(), 1, "expected one result for {line:?}");
        results
            .remove(0)
            .expect_err(&format!("expected {line:?} to fail"))
    }

    #[test]
    fn test_record_line_with_xref() {
        let lines = lex_ok("0 @I1@ INDI");
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line.level, 0);
        assert_eq!(line.xref, Some(Xref::new("I1")));
        assert_eq!(line.tag, "INDI");
        assert_eq!(line.value, None);
        assert_eq!(line.line, 1);
    }

    #[test]
    fn test_value_and_pointer() {
        let lines = lex_ok("1 NAME Jane /Doe/\n1 FAMS @F1@\n");
        assert_eq!(lines[0].tag, "NAME");
        assert_eq!(lines[0].value, Some("Jane /Doe/"));
        assert_eq!(lines[0].pointer, None);

        assert_eq!(lines[1].value, Some("@F1@"));
        assert_eq!(lines[1].pointer, Some(Xref::new("F1")));
        assert_eq!(lines[1].line, 2);
    }

    #[test]
    fn test_blank_lines_and_whitespace() {
        let source = "\n0 HEAD  \r\n\r\n   \n  1 CHAR UTF-8\t\n";
        let lines = lex_ok(source);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].tag, "HEAD");
        assert_eq!(lines[0].line, 2);
        assert_eq!(lines[1].tag, "CHAR");
        assert_eq!(lines[1].value, Some("UTF-8"));
        assert_eq!(lines[1].line, 5);
    }

    #[test]
    fn test_lone_carriage_return_line_endings() {
        let lines = lex_ok("0 HEAD\r1 CHAR ANSEL\r0 TRLR");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2].line, 3);
    }

    #[test]
    fn test_span_covers_trimmed_content() {
        let source = "0 HEAD\n  1 SOUR ftree  \n";
        let lines = lex_ok(source);
        let span = lines[1].span;
        assert_eq!(&source[span.range()], "1 SOUR ftree");
    }

    #[test]
    fn test_byte_order_mark_is_stripped() {
        let lines = lex_ok("\u{feff}0 HEAD\n0 TRLR");
        assert_eq!(lines[0].tag, "HEAD");
        assert_eq!(lines[0].level, 0);
    }

    #[test]
    fn test_value_keeps_inner_spacing() {
        let lines = lex_ok("2 PLAC  Springfield,  Illinois");
        assert_eq!(lines[0].value, Some("Springfield,  Illinois"));
    }

    #[test]
    fn test_escaped_at_value_is_not_a_pointer() {
        let lines = lex_ok("1 NOTE mail me @ home");
        assert_eq!(lines[0].pointer, None);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(lex_err("NAME Jane").code(), Some(ErrorCode::E001));
        assert_eq!(lex_err("1x NAME Jane").code(), Some(ErrorCode::E002));
        assert_eq!(lex_err("1").code(), Some(ErrorCode::E003));
        assert_eq!(lex_err("1 @I1@").code(), Some(ErrorCode::E003));
        assert_eq!(lex_err("1 NA-ME x").code(), Some(ErrorCode::E003));
        assert_eq!(lex_err("0 @I1 INDI").code(), Some(ErrorCode::E004));
        assert_eq!(lex_err("0 @@ INDI").code(), Some(ErrorCode::E004));
        assert_eq!(lex_err("300 NAME x").code(), Some(ErrorCode::E005));
    }

    #[test]
    fn test_bad_line_does_not_stop_lexing() {
        let results: Vec<_> = lex("0 HEAD\nbroken line\n0 TRLR").collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        let err = results[1].as_ref().unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert_eq!(err.labels()[0].span(), Span::new(7..18));
        assert!(results[2].is_ok());
    }
}
