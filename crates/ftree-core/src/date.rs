//! Event dates.
//!
//! A date attached to an event is always in one of three states, modelled by
//! [`DateValue`]:
//!
//! - [`DateValue::Exact`]: a calendar date (day, month and year, or a coarser
//!   precision such as `MAR 1900` or `1900`).
//! - [`DateValue::Qualified`]: an approximate, ranged or free-text date
//!   (`ABT 1900`, `BET 1900 AND 1910`, `(about the war)`). Text that cannot be
//!   read as a date lands here as [`DateQualifier::Phrase`] with the raw text
//!   kept, so a date that failed to parse is never confused with no date.
//! - [`DateValue::Absent`]: the event carries no date at all.

use std::fmt;

use chrono::{Datelike, NaiveDate};

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// A Gregorian calendar date with optional day and month precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarDate {
    year: i32,
    month: Option<u8>,
    day: Option<u8>,
}

impl CalendarDate {
    /// Creates a year-precision date.
    pub fn year_only(year: i32) -> Self {
        Self {
            year,
            month: None,
            day: None,
        }
    }

    /// Creates a month-precision date. Returns `None` for months outside `1..=12`.
    pub fn year_month(year: i32, month: u8) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self {
            year,
            month: Some(month),
            day: None,
        })
    }

    /// Creates a full date. Returns `None` if the day does not exist in that month.
    pub fn ymd(year: i32, month: u8, day: u8) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, u32::from(month), u32::from(day))?;
        Some(Self {
            year,
            month: Some(month),
            day: Some(day),
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Option<u8> {
        self.month
    }

    pub fn day(&self) -> Option<u8> {
        self.day
    }

    /// Parses the `[[DAY] MONTH] YEAR` form, e.g. `2 JAN 1900`, `JAN 1900`, `1900`.
    fn parse(text: &str) -> Option<Self> {
        let parts: Vec<&str> = text.split_whitespace().collect();
        match parts.as_slice() {
            [year] => parse_year(year).map(Self::year_only),
            [month, year] => Self::year_month(parse_year(year)?, parse_month(month)?),
            [day, month, year] => {
                let day = day.parse::<u8>().ok()?;
                Self::ymd(parse_year(year)?, parse_month(month)?, day)
            }
            _ => None,
        }
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(day) = self.day {
            write!(f, "{day} ")?;
        }
        if let Some(month) = self.month {
            write!(f, "{} ", MONTHS[usize::from(month - 1)])?;
        }
        write!(f, "{}", self.year)
    }
}

fn parse_year(text: &str) -> Option<i32> {
    if text.is_empty() || text.len() > 4 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_month(text: &str) -> Option<u8> {
    let upper = text.to_ascii_uppercase();
    MONTHS
        .iter()
        .position(|month| *month == upper)
        .and_then(|idx| u8::try_from(idx + 1).ok())
}

/// How a non-exact date is qualified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateQualifier {
    /// `ABT`
    About,
    /// `CAL`
    Calculated,
    /// `EST`
    Estimated,
    /// `BEF`
    Before,
    /// `AFT`
    After,
    /// `BET .. AND ..`
    Between,
    /// `FROM .. [TO ..]` or `TO ..`
    Period,
    /// `INT .. (phrase)`
    Interpreted,
    /// Free text or unreadable date text.
    Phrase,
}

/// A date that is approximate, ranged, or free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedDate {
    qualifier: DateQualifier,
    date: Option<CalendarDate>,
    raw: String,
}

impl QualifiedDate {
    pub fn qualifier(&self) -> DateQualifier {
        self.qualifier
    }

    /// The first calendar date that could be read, if any.
    pub fn date(&self) -> Option<CalendarDate> {
        self.date
    }

    /// The original date text.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// The tri-state date of an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DateValue {
    Exact(CalendarDate),
    Qualified(QualifiedDate),
    #[default]
    Absent,
}

impl DateValue {
    /// Reads a date value. Never fails: empty text is [`DateValue::Absent`],
    /// anything unreadable becomes a [`DateQualifier::Phrase`].
    ///
    /// ```
    /// use ftree_core::date::{DateQualifier, DateValue};
    ///
    /// assert!(matches!(DateValue::parse("12 MAR 1900"), DateValue::Exact(_)));
    /// assert_eq!(DateValue::parse("ABT 1900").year(), Some(1900));
    /// assert_eq!(DateValue::parse("   "), DateValue::Absent);
    ///
    /// let DateValue::Qualified(q) = DateValue::parse("sometime in spring") else {
    ///     panic!("expected a qualified date");
    /// };
    /// assert_eq!(q.qualifier(), DateQualifier::Phrase);
    /// ```
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Self::Absent;
        }
        if let Some(date) = CalendarDate::parse(text) {
            return Self::Exact(date);
        }

        let (keyword, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
        let rest = rest.trim();
        let (qualifier, date) = match keyword.to_ascii_uppercase().as_str() {
            "ABT" => (DateQualifier::About, CalendarDate::parse(rest)),
            "CAL" => (DateQualifier::Calculated, CalendarDate::parse(rest)),
            "EST" => (DateQualifier::Estimated, CalendarDate::parse(rest)),
            "BEF" => (DateQualifier::Before, CalendarDate::parse(rest)),
            "AFT" => (DateQualifier::After, CalendarDate::parse(rest)),
            "BET" => (DateQualifier::Between, range_start(rest, "AND")),
            "FROM" => (DateQualifier::Period, range_start(rest, "TO")),
            "TO" => (DateQualifier::Period, CalendarDate::parse(rest)),
            "INT" => (
                DateQualifier::Interpreted,
                CalendarDate::parse(rest.split('(').next().unwrap_or_default()),
            ),
            _ => (DateQualifier::Phrase, None),
        };

        // A recognized keyword followed by unreadable text is still just a phrase.
        let qualifier = if date.is_none() && qualifier != DateQualifier::Interpreted {
            DateQualifier::Phrase
        } else {
            qualifier
        };

        Self::Qualified(QualifiedDate {
            qualifier,
            date,
            raw: text.to_string(),
        })
    }

    /// Returns `true` unless the value is [`DateValue::Absent`].
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    /// The year this value points at, when one can be read.
    pub fn year(&self) -> Option<i32> {
        match self {
            Self::Exact(date) => Some(date.year()),
            Self::Qualified(qualified) => qualified.date.map(|date| date.year()),
            Self::Absent => None,
        }
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(date) => write!(f, "{date}"),
            Self::Qualified(qualified) => f.write_str(&qualified.raw),
            Self::Absent => Ok(()),
        }
    }
}

fn range_start(text: &str, separator: &str) -> Option<CalendarDate> {
    let upper = text.to_ascii_uppercase();
    let needle = format!(" {separator} ");
    let start = match upper.find(&needle) {
        Some(idx) => &text[..idx],
        None => text,
    };
    CalendarDate::parse(start)
}

/// The current calendar year in local time.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_dates_at_each_precision() {
        assert_eq!(
            DateValue::parse("2 JAN 1900"),
            DateValue::Exact(CalendarDate::ymd(1900, 1, 2).unwrap())
        );
        assert_eq!(
            DateValue::parse("jan 1900"),
            DateValue::Exact(CalendarDate::year_month(1900, 1).unwrap())
        );
        assert_eq!(
            DateValue::parse("1900"),
            DateValue::Exact(CalendarDate::year_only(1900))
        );
    }

    #[test]
    fn test_impossible_day_is_a_phrase_not_absent() {
        let value = DateValue::parse("31 FEB 1900");
        assert!(value.is_present());
        match value {
            DateValue::Qualified(q) => {
                assert_eq!(q.qualifier(), DateQualifier::Phrase);
                assert_eq!(q.raw(), "31 FEB 1900");
                assert_eq!(q.date(), None);
            }
            other => panic!("expected phrase, got {other:?}"),
        }
    }

    #[test]
    fn test_qualifiers() {
        let cases = [
            ("ABT 1850", DateQualifier::About, Some(1850)),
            ("CAL 1850", DateQualifier::Calculated, Some(1850)),
            ("EST 1850", DateQualifier::Estimated, Some(1850)),
            ("BEF 3 MAR 1850", DateQualifier::Before, Some(1850)),
            ("AFT 1850", DateQualifier::After, Some(1850)),
            ("BET 1850 AND 1860", DateQualifier::Between, Some(1850)),
            ("FROM 1850 TO 1860", DateQualifier::Period, Some(1850)),
            ("TO 1860", DateQualifier::Period, Some(1860)),
            ("INT 1850 (family bible)", DateQualifier::Interpreted, Some(1850)),
            ("ABT sometime", DateQualifier::Phrase, None),
        ];

        for (text, qualifier, year) in cases {
            let value = DateValue::parse(text);
            let DateValue::Qualified(q) = &value else {
                panic!("expected qualified date for {text:?}, got {value:?}");
            };
            assert_eq!(q.qualifier(), qualifier, "qualifier for {text:?}");
            assert_eq!(value.year(), year, "year for {text:?}");
        }
    }

    #[test]
    fn test_absent() {
        assert_eq!(DateValue::parse(""), DateValue::Absent);
        assert!(!DateValue::Absent.is_present());
        assert_eq!(DateValue::Absent.year(), None);
    }

    #[test]
    fn test_display_round_trips_exact_dates() {
        assert_eq!(DateValue::parse("2 jan 1900").to_string(), "2 JAN 1900");
        assert_eq!(DateValue::parse("ABT 1900").to_string(), "ABT 1900");
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn check_exact_date_reparses(year: i32, month: u8, day: u8) -> Result<(), TestCaseError> {
        let Some(date) = CalendarDate::ymd(year, month, day) else {
            return Ok(());
        };
        let reparsed = DateValue::parse(&date.to_string());
        prop_assert_eq!(reparsed, DateValue::Exact(date));
        Ok(())
    }

    proptest! {
        #[test]
        fn any_text_parses_without_panicking(text in "\\PC{0,40}") {
            let value = DateValue::parse(&text);
            prop_assert_eq!(value.is_present(), !text.trim().is_empty());
        }

        #[test]
        fn exact_dates_reparse(year in 1i32..=9999, month in 1u8..=12, day in 1u8..=31) {
            check_exact_date_reparses(year, month, day)?;
        }
    }
}
