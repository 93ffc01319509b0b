//! Error codes for the ftree diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Input and line syntax errors
//! - `E1xx` - Record structure errors
//! - `E2xx` - Cross-reference errors
//! - `E3xx` - Lint findings

use std::fmt;

/// Error codes for categorizing diagnostics.
///
/// The [`description`](ErrorCode::description) of a code doubles as the
/// human-readable category of every diagnostic carrying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorCode {
    // =========================================================================
    // Syntax Errors (E0xx)
    // =========================================================================
    /// Missing level number.
    ///
    /// A line does not start with a level number.
    E001,

    /// Non-numeric level.
    ///
    /// The first token of a line starts with a digit but is not a number.
    E002,

    /// Missing or invalid tag.
    ///
    /// A line has a level (and maybe an id) but no tag, or the tag contains
    /// characters other than letters, digits and underscores.
    E003,

    /// Malformed cross-reference id.
    ///
    /// A token starting with `@` is not of the form `@id@`.
    E004,

    /// Level out of range.
    ///
    /// The level number is larger than any real file nests.
    E005,

    /// Undecodable input.
    ///
    /// Some bytes of the input were not valid in its detected encoding and
    /// were replaced.
    E006,

    // =========================================================================
    // Structure Errors (E1xx)
    // =========================================================================
    /// Level skip.
    ///
    /// A line is nested more than one level deeper than its parent. It is
    /// attached to the deepest open line.
    E100,

    /// Line outside of any record.
    ///
    /// A nested line appears before the first level 0 record and is dropped.
    E101,

    /// Record without id.
    ///
    /// An `INDI`, `FAM` or `SUBM` record has no cross-reference id and cannot
    /// be referenced.
    E102,

    /// Content after trailer.
    ///
    /// Records follow the `TRLR` record.
    E103,

    // =========================================================================
    // Reference Errors (E2xx)
    // =========================================================================
    /// Dangling reference.
    ///
    /// A pointer names an id that no record defines.
    E200,

    /// Duplicate id.
    ///
    /// Two records of the same type share an id. The later one wins.
    E201,

    /// Pointer expected.
    ///
    /// A link tag such as `HUSB` or `FAMC` carries a value that is not a pointer.
    E202,

    /// Duplicate link.
    ///
    /// The same link is declared twice and was collapsed into one.
    E203,

    /// One-sided link.
    ///
    /// A link was declared on only one of its two ends and the other end
    /// was completed.
    E204,

    /// Conflicting spouse link.
    ///
    /// A family's husband or wife slot is already held by someone else.
    E205,

    // =========================================================================
    // Lint Findings (E3xx)
    // =========================================================================
    /// Missing name.
    E300,

    /// Missing birth date.
    E301,

    /// Missing death date.
    ///
    /// The individual has a death event, or would be older than a plausible
    /// lifespan today, but no death date is recorded.
    E302,

    /// Empty family.
    ///
    /// A family has neither spouses nor children.
    E303,

    /// Ancestor cycle.
    ///
    /// An individual is their own ancestor through child-to-parent links.
    E304,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Syntax errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E005 => "E005",
            ErrorCode::E006 => "E006",
            // Structure errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            // Reference errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            // Lint findings
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            ErrorCode::E303 => "E303",
            ErrorCode::E304 => "E304",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Syntax errors
            ErrorCode::E001 => "missing level",
            ErrorCode::E002 => "non-numeric level",
            ErrorCode::E003 => "missing or invalid tag",
            ErrorCode::E004 => "malformed cross-reference id",
            ErrorCode::E005 => "level out of range",
            ErrorCode::E006 => "undecodable input",
            // Structure errors
            ErrorCode::E100 => "level skip",
            ErrorCode::E101 => "line outside of any record",
            ErrorCode::E102 => "record without id",
            ErrorCode::E103 => "content after trailer",
            // Reference errors
            ErrorCode::E200 => "dangling reference",
            ErrorCode::E201 => "duplicate id",
            ErrorCode::E202 => "pointer expected",
            ErrorCode::E203 => "duplicate link",
            ErrorCode::E204 => "one-sided link",
            ErrorCode::E205 => "conflicting spouse link",
            // Lint findings
            ErrorCode::E300 => "missing name",
            ErrorCode::E301 => "missing birth date",
            ErrorCode::E302 => "missing death date",
            ErrorCode::E303 => "empty family",
            ErrorCode::E304 => "ancestor cycle",
        }
    }

    /// Returns `true` for codes produced while reading lines and records.
    pub fn is_syntax_or_structure(&self) -> bool {
        self.as_str().starts_with("E0") || self.as_str().starts_with("E1")
    }

    /// Returns `true` for cross-reference codes.
    pub fn is_reference(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    /// Returns `true` for lint codes.
    pub fn is_lint(&self) -> bool {
        self.as_str().starts_with("E3")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E200.to_string(), "E200");
        assert_eq!(ErrorCode::E300.to_string(), "E300");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E001.description(), "missing level");
        assert_eq!(ErrorCode::E200.description(), "dangling reference");
        assert_eq!(ErrorCode::E301.description(), "missing birth date");
    }

    #[test]
    fn test_error_code_phases() {
        assert!(ErrorCode::E003.is_syntax_or_structure());
        assert!(ErrorCode::E103.is_syntax_or_structure());
        assert!(ErrorCode::E201.is_reference());
        assert!(!ErrorCode::E201.is_lint());
        assert!(ErrorCode::E304.is_lint());
    }

    #[test]
    fn test_codes_order_by_number() {
        assert!(ErrorCode::E001 < ErrorCode::E100);
        assert!(ErrorCode::E300 < ErrorCode::E304);
    }
}
