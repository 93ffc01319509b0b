//! Genealogy entities.
//!
//! The types here are plain data. They are produced by the graph builder in
//! `ftree-parser` and stored in a [`FamilyGraph`](crate::graph::FamilyGraph),
//! which owns every entity exactly once. Links between entities are [`Xref`]
//! ids, never owning pointers, so the graph may contain cycles.

use std::fmt;

use indexmap::IndexMap;

use crate::{date::DateValue, identifier::Xref, span::Span};

/// Sex of an individual. Unrecognized codes map to [`Sex::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sex {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Sex {
    /// Reads a `SEX` value. Anything other than `M`/`F` (any case) is unknown.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "M" | "m" => Self::Male,
            "F" | "f" => Self::Female,
            _ => Self::Unknown,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Unknown => "U",
        }
    }
}

/// A personal name split into given name and surname.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Name {
    pub given: Option<String>,
    pub surname: Option<String>,
    /// Text after the closing surname delimiter, e.g. `Jr.`.
    pub suffix: Option<String>,
}

impl Name {
    /// Splits a combined name on the slash surname delimiters.
    ///
    /// `Jane /Doe/` has given name `Jane` and surname `Doe`. Without any
    /// delimiter the whole text is the given name and the surname is absent.
    /// An unterminated delimiter (`Jane /Doe`) takes the rest as surname.
    ///
    /// ```
    /// use ftree_core::model::Name;
    ///
    /// let name = Name::parse("Jane /Doe/");
    /// assert_eq!(name.given.as_deref(), Some("Jane"));
    /// assert_eq!(name.surname.as_deref(), Some("Doe"));
    ///
    /// let name = Name::parse("Cher");
    /// assert_eq!(name.given.as_deref(), Some("Cher"));
    /// assert_eq!(name.surname, None);
    /// ```
    pub fn parse(raw: &str) -> Self {
        let Some((given, rest)) = raw.split_once('/') else {
            return Self {
                given: non_empty(raw),
                ..Self::default()
            };
        };
        let (surname, suffix) = rest.split_once('/').unwrap_or((rest, ""));
        Self {
            given: non_empty(given),
            surname: non_empty(surname),
            suffix: non_empty(suffix),
        }
    }

    /// Returns `true` if neither a given name nor a surname is known.
    pub fn is_empty(&self) -> bool {
        self.given.is_none() && self.surname.is_none()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [&self.given, &self.surname, &self.suffix]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .collect();
        f.write_str(&parts.join(" "))
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Recognized event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Birth,
    Christening,
    Death,
    Burial,
    Marriage,
    Engagement,
    Divorce,
}

impl EventKind {
    /// Event kinds recorded on individuals.
    pub fn individual_from_tag(tag: &str) -> Option<Self> {
        match tag {
            "BIRT" => Some(Self::Birth),
            "CHR" => Some(Self::Christening),
            "DEAT" => Some(Self::Death),
            "BURI" => Some(Self::Burial),
            _ => None,
        }
    }

    /// Event kinds recorded on families.
    pub fn family_from_tag(tag: &str) -> Option<Self> {
        match tag {
            "MARR" => Some(Self::Marriage),
            "ENGA" => Some(Self::Engagement),
            "DIV" => Some(Self::Divorce),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Birth => "BIRT",
            Self::Christening => "CHR",
            Self::Death => "DEAT",
            Self::Burial => "BURI",
            Self::Marriage => "MARR",
            Self::Engagement => "ENGA",
            Self::Divorce => "DIV",
        }
    }
}

/// A free-text location. Two places are the same place only if their text is
/// identical, including case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Place(String);

impl Place {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub date: DateValue,
    pub place: Option<Place>,
    /// Line the event tag appears on.
    pub line: usize,
}

impl Event {
    pub fn new(kind: EventKind, line: usize) -> Self {
        Self {
            kind,
            date: DateValue::Absent,
            place: None,
            line,
        }
    }
}

/// A reference to a media object, either inline (`FILE`) or a pointer to a
/// top-level object record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MediaRef {
    pub file: Option<String>,
    pub format: Option<String>,
    pub title: Option<String>,
    pub pointer: Option<Xref>,
}

/// Tags the builder does not model, kept in source order.
///
/// Keys are tag paths relative to the owning entity: a `_UID` line directly
/// under an individual is stored as `_UID`, a `SOUR` line under its `BIRT`
/// event as `BIRT.SOUR`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpaqueTags(IndexMap<String, Vec<String>>);

impl OpaqueTags {
    pub fn push(&mut self, path: impl Into<String>, value: impl Into<String>) {
        self.0.entry(path.into()).or_default().push(value.into());
    }

    /// All values stored under `path`, in source order.
    pub fn get(&self, path: &str) -> &[String] {
        self.0.get(path).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(path, values)| (path.as_str(), values.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Individual {
    pub id: Xref,
    pub name: Option<Name>,
    pub sex: Sex,
    pub events: Vec<Event>,
    /// Families this individual is a spouse in (`FAMS`), in declaration order.
    pub spouse_families: Vec<Xref>,
    /// Families this individual is a child of (`FAMC`). Normally at most one.
    pub child_families: Vec<Xref>,
    pub occupation: Option<String>,
    pub education: Option<String>,
    pub religion: Option<String>,
    pub notes: Vec<String>,
    pub media: Vec<MediaRef>,
    pub opaque: OpaqueTags,
    pub span: Span,
    /// Line of the `INDI` record.
    pub line: usize,
}

impl Individual {
    pub fn new(id: Xref, span: Span, line: usize) -> Self {
        Self {
            id,
            name: None,
            sex: Sex::Unknown,
            events: Vec::new(),
            spouse_families: Vec::new(),
            child_families: Vec::new(),
            occupation: None,
            education: None,
            religion: None,
            notes: Vec::new(),
            media: Vec::new(),
            opaque: OpaqueTags::default(),
            span,
            line,
        }
    }

    /// First event of the given kind.
    pub fn event(&self, kind: EventKind) -> Option<&Event> {
        self.events.iter().find(|event| event.kind == kind)
    }

    pub fn birth(&self) -> Option<&Event> {
        self.event(EventKind::Birth)
    }

    pub fn death(&self) -> Option<&Event> {
        self.event(EventKind::Death)
    }

    pub fn birth_year(&self) -> Option<i32> {
        self.birth().and_then(|event| event.date.year())
    }

    pub fn has_name(&self) -> bool {
        self.name.as_ref().is_some_and(|name| !name.is_empty())
    }

    /// Full name for display, falling back to the id.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.id.to_string(),
        }
    }

    /// Adds a spouse-family link unless already present.
    pub fn link_spouse_family(&mut self, family: Xref) -> bool {
        push_unique(&mut self.spouse_families, family)
    }

    /// Adds a child-family link unless already present.
    pub fn link_child_family(&mut self, family: Xref) -> bool {
        push_unique(&mut self.child_families, family)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Family {
    pub id: Xref,
    pub husband: Option<Xref>,
    pub wife: Option<Xref>,
    /// Children in declared birth order, without duplicates.
    pub children: Vec<Xref>,
    pub events: Vec<Event>,
    pub notes: Vec<String>,
    pub opaque: OpaqueTags,
    pub span: Span,
    /// Line of the `FAM` record.
    pub line: usize,
}

impl Family {
    pub fn new(id: Xref, span: Span, line: usize) -> Self {
        Self {
            id,
            husband: None,
            wife: None,
            children: Vec::new(),
            events: Vec::new(),
            notes: Vec::new(),
            opaque: OpaqueTags::default(),
            span,
            line,
        }
    }

    pub fn marriage(&self) -> Option<&Event> {
        self.events
            .iter()
            .find(|event| event.kind == EventKind::Marriage)
    }

    /// Husband then wife, skipping absent spouses. An individual in both
    /// slots is yielded once.
    pub fn spouses(&self) -> impl Iterator<Item = Xref> {
        let husband = self.husband;
        let wife = self.wife.filter(|wife| Some(*wife) != husband);
        husband.into_iter().chain(wife)
    }

    /// The other spouse of `partner`, if `partner` is a spouse here.
    ///
    /// Never returns `partner` itself.
    pub fn partner_of(&self, partner: Xref) -> Option<Xref> {
        let other = if self.husband == Some(partner) {
            self.wife
        } else if self.wife == Some(partner) {
            self.husband
        } else {
            None
        };
        other.filter(|other| *other != partner)
    }

    /// Adds a child unless already present. Returns `false` for a duplicate.
    pub fn add_child(&mut self, child: Xref) -> bool {
        push_unique(&mut self.children, child)
    }

    pub fn is_empty(&self) -> bool {
        self.husband.is_none() && self.wife.is_none() && self.children.is_empty()
    }
}

fn push_unique(list: &mut Vec<Xref>, id: Xref) -> bool {
    if list.contains(&id) {
        false
    } else {
        list.push(id);
        true
    }
}

/// Data from the `HEAD` record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    pub source: Option<String>,
    pub version: Option<String>,
    pub charset: Option<String>,
    pub submitter: Option<Xref>,
}

/// A `SUBM` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitter {
    pub id: Xref,
    pub name: Option<String>,
}

/// A top-level record of a type the graph does not model (`SOUR`, `NOTE`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherRecord {
    pub tag: String,
    pub id: Option<Xref>,
    pub line: usize,
}
