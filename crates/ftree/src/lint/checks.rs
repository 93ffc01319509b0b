//! Per-entity lint checks.

use ftree_core::{
    graph::FamilyGraph,
    model::{Family, Individual},
};
use ftree_parser::{
    dangling_reference, duplicate_record,
    error::{Diagnostic, ErrorCode},
};

use super::Check;

fn individual_finding(diagnostic: Diagnostic, person: &Individual, label: &str) -> Diagnostic {
    diagnostic
        .with_subject(person.id)
        .with_line(person.line)
        .with_label(person.span, label)
}

fn family_finding(diagnostic: Diagnostic, family: &Family, label: &str) -> Diagnostic {
    diagnostic
        .with_subject(family.id)
        .with_line(family.line)
        .with_label(family.span, label)
}

/// Pointers to ids no record defines.
pub struct DanglingReferences;

impl Check for DanglingReferences {
    fn name(&self) -> &'static str {
        "dangling-references"
    }

    fn run(&self, graph: &FamilyGraph, findings: &mut Vec<Diagnostic>) {
        findings.extend(graph.unresolved().iter().map(dangling_reference));
    }
}

/// Records that reuse an id.
pub struct DuplicateIds;

impl Check for DuplicateIds {
    fn name(&self) -> &'static str {
        "duplicate-ids"
    }

    fn run(&self, graph: &FamilyGraph, findings: &mut Vec<Diagnostic>) {
        findings.extend(graph.duplicates().iter().map(duplicate_record));
    }
}

pub struct MissingNames;

impl Check for MissingNames {
    fn name(&self) -> &'static str {
        "missing-names"
    }

    fn run(&self, graph: &FamilyGraph, findings: &mut Vec<Diagnostic>) {
        for person in graph.individuals().filter(|person| !person.has_name()) {
            findings.push(individual_finding(
                Diagnostic::warning(format!("{} has no name", person.id.pointer()))
                    .with_code(ErrorCode::E300),
                person,
                "individual without a name",
            ));
        }
    }
}

pub struct MissingBirthDates;

impl Check for MissingBirthDates {
    fn name(&self) -> &'static str {
        "missing-birth-dates"
    }

    fn run(&self, graph: &FamilyGraph, findings: &mut Vec<Diagnostic>) {
        for person in graph.individuals() {
            if person.birth().is_some_and(|birth| birth.date.is_present()) {
                continue;
            }
            findings.push(individual_finding(
                Diagnostic::warning(format!(
                    "{} ({}) has no birth date",
                    person.id.pointer(),
                    person.display_name()
                ))
                .with_code(ErrorCode::E301),
                person,
                "no dated BIRT record",
            ));
        }
    }
}

/// Missing death dates on individuals that are presumably deceased.
///
/// An individual counts as deceased if they have a death record, or if they
/// were born more than `plausible_lifespan` years before `reference_year`.
pub struct MissingDeathDates {
    plausible_lifespan: u32,
    reference_year: i32,
}

impl MissingDeathDates {
    pub fn new(plausible_lifespan: u32, reference_year: i32) -> Self {
        Self {
            plausible_lifespan,
            reference_year,
        }
    }

    /// Returns the reason `person` is assumed deceased, if any.
    fn deceased_reason(&self, person: &Individual) -> Option<String> {
        if person.death().is_some() {
            return Some("has a death record without a date".to_string());
        }
        let born = person.birth_year()?;
        let lifespan = i32::try_from(self.plausible_lifespan).unwrap_or(i32::MAX);
        if born.saturating_add(lifespan) < self.reference_year {
            Some(format!(
                "was born in {born}, more than {} years before {}, but has no death date",
                self.plausible_lifespan, self.reference_year
            ))
        } else {
            None
        }
    }
}

impl Check for MissingDeathDates {
    fn name(&self) -> &'static str {
        "missing-death-dates"
    }

    fn run(&self, graph: &FamilyGraph, findings: &mut Vec<Diagnostic>) {
        for person in graph.individuals() {
            if person.death().is_some_and(|death| death.date.is_present()) {
                continue;
            }
            let Some(reason) = self.deceased_reason(person) else {
                continue;
            };
            findings.push(individual_finding(
                Diagnostic::info(format!("{} {reason}", person.id.pointer()))
                    .with_code(ErrorCode::E302)
                    .with_help("add a DEAT record with a DATE, even an approximate one"),
                person,
                "presumably deceased",
            ));
        }
    }
}

/// Families with neither spouses nor children.
pub struct EmptyFamilies;

impl Check for EmptyFamilies {
    fn name(&self) -> &'static str {
        "empty-families"
    }

    fn run(&self, graph: &FamilyGraph, findings: &mut Vec<Diagnostic>) {
        for family in graph.families().filter(|family| family.is_empty()) {
            findings.push(family_finding(
                Diagnostic::warning(format!(
                    "{} has no spouses and no children",
                    family.id.pointer()
                ))
                .with_code(ErrorCode::E303)
                .with_help("remove the record or add HUSB, WIFE or CHIL lines"),
                family,
                "orphaned family record",
            ));
        }
    }
}
