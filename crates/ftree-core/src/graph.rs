//! Arena storage for a loaded family tree.
//!
//! [`FamilyGraph`] owns every [`Individual`] and [`Family`] keyed by its
//! [`Xref`]. Edges are the id lists on the entities themselves:
//!
//! - individual → family: `spouse_families` (`FAMS`), `child_families` (`FAMC`)
//! - family → individual: `husband`, `wife`, `children`
//!
//! Nothing here assumes acyclicity; traversals over the graph must guard
//! against revisiting ids themselves.
//!
//! Iteration order is file order, so anything derived from iterating the graph
//! is deterministic for a given input.

use indexmap::IndexMap;
use log::trace;

use crate::{
    identifier::Xref,
    model::{Family, Header, Individual, OtherRecord, Submitter},
    span::Span,
};

/// The kind of entity an id was registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Individual,
    Family,
}

impl EntityKind {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Individual => "INDI",
            Self::Family => "FAM",
        }
    }
}

/// A pointer whose target id is not registered in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedRef {
    /// Entity holding the pointer.
    pub source: Xref,
    /// Tag of the pointer line, e.g. `CHIL` or `FAMC`.
    pub tag: String,
    pub target: Xref,
    pub span: Span,
    pub line: usize,
}

/// A second record reusing an id already taken by an entity of the same kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRecord {
    pub id: Xref,
    pub kind: EntityKind,
    pub span: Span,
    pub line: usize,
    pub first_span: Span,
    pub first_line: usize,
}

/// The in-memory genealogical graph.
#[derive(Debug, Clone, Default)]
pub struct FamilyGraph {
    individuals: IndexMap<Xref, Individual>,
    families: IndexMap<Xref, Family>,
    header: Option<Header>,
    submitters: Vec<Submitter>,
    other_records: Vec<OtherRecord>,
    unresolved: Vec<UnresolvedRef>,
    duplicates: Vec<DuplicateRecord>,
}

impl FamilyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn individual(&self, id: Xref) -> Option<&Individual> {
        self.individuals.get(&id)
    }

    pub fn family(&self, id: Xref) -> Option<&Family> {
        self.families.get(&id)
    }

    /// All individuals in file order.
    pub fn individuals(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.values()
    }

    /// All families in file order.
    pub fn families(&self) -> impl Iterator<Item = &Family> {
        self.families.values()
    }

    pub fn individuals_count(&self) -> usize {
        self.individuals.len()
    }

    pub fn families_count(&self) -> usize {
        self.families.len()
    }

    pub fn contains_individual(&self, id: Xref) -> bool {
        self.individuals.contains_key(&id)
    }

    pub fn contains_family(&self, id: Xref) -> bool {
        self.families.contains_key(&id)
    }

    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    pub fn submitters(&self) -> &[Submitter] {
        &self.submitters
    }

    pub fn other_records(&self) -> &[OtherRecord] {
        &self.other_records
    }

    /// Pointers that could not be resolved while building the graph.
    pub fn unresolved(&self) -> &[UnresolvedRef] {
        &self.unresolved
    }

    /// Records that reused an already registered id.
    pub fn duplicates(&self) -> &[DuplicateRecord] {
        &self.duplicates
    }

    /// Parents of `id` across all of its child families, husband before wife.
    pub fn parents(&self, id: Xref) -> impl Iterator<Item = Xref> + '_ {
        self.individual(id)
            .into_iter()
            .flat_map(|person| person.child_families.iter())
            .filter_map(|family| self.family(*family))
            .flat_map(Family::spouses)
    }

    /// Children of `id` across all of its spouse families, in family then birth order.
    pub fn children(&self, id: Xref) -> impl Iterator<Item = Xref> + '_ {
        self.individual(id)
            .into_iter()
            .flat_map(|person| person.spouse_families.iter())
            .filter_map(|family| self.family(*family))
            .flat_map(|family| family.children.iter().copied())
    }

    /// Spouses of `id` across all of its spouse families.
    pub fn spouses(&self, id: Xref) -> impl Iterator<Item = Xref> + '_ {
        self.individual(id)
            .into_iter()
            .flat_map(|person| person.spouse_families.iter())
            .filter_map(|family| self.family(*family))
            .filter_map(move |family| family.partner_of(id))
    }

    /// Individuals with no family-as-child link, in file order.
    pub fn roots(&self) -> impl Iterator<Item = &Individual> {
        self.individuals
            .values()
            .filter(|person| person.child_families.is_empty())
    }

    /// Inserts an individual. A previous individual with the same id is
    /// replaced in place (keeping its position) and returned.
    pub fn insert_individual(&mut self, individual: Individual) -> Option<Individual> {
        trace!(id:% = individual.id; "Inserting individual");
        self.individuals.insert(individual.id, individual)
    }

    /// Inserts a family. A previous family with the same id is replaced in
    /// place (keeping its position) and returned.
    pub fn insert_family(&mut self, family: Family) -> Option<Family> {
        trace!(id:% = family.id; "Inserting family");
        self.families.insert(family.id, family)
    }

    pub fn individual_mut(&mut self, id: Xref) -> Option<&mut Individual> {
        self.individuals.get_mut(&id)
    }

    pub fn family_mut(&mut self, id: Xref) -> Option<&mut Family> {
        self.families.get_mut(&id)
    }

    pub fn set_header(&mut self, header: Header) {
        self.header = Some(header);
    }

    pub fn add_submitter(&mut self, submitter: Submitter) {
        self.submitters.push(submitter);
    }

    pub fn add_other_record(&mut self, record: OtherRecord) {
        self.other_records.push(record);
    }

    pub fn record_unresolved(&mut self, unresolved: UnresolvedRef) {
        self.unresolved.push(unresolved);
    }

    pub fn record_duplicate(&mut self, duplicate: DuplicateRecord) {
        self.duplicates.push(duplicate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: &str) -> Individual {
        Individual::new(Xref::new(id), Span::default(), 1)
    }

    fn family(id: &str, husband: Option<&str>, wife: Option<&str>, children: &[&str]) -> Family {
        let mut family = Family::new(Xref::new(id), Span::default(), 1);
        family.husband = husband.map(Xref::new);
        family.wife = wife.map(Xref::new);
        family.children = children.iter().map(|c| Xref::new(c)).collect();
        family
    }

    fn sample() -> FamilyGraph {
        let mut graph = FamilyGraph::new();
        let mut dad = person("G_DAD");
        dad.spouse_families.push(Xref::new("G_F1"));
        let mut mum = person("G_MUM");
        mum.spouse_families.push(Xref::new("G_F1"));
        let mut kid = person("G_KID");
        kid.child_families.push(Xref::new("G_F1"));
        graph.insert_individual(dad);
        graph.insert_individual(mum);
        graph.insert_individual(kid);
        graph.insert_family(family("G_F1", Some("G_DAD"), Some("G_MUM"), &["G_KID"]));
        graph
    }

    #[test]
    fn test_relationship_queries() {
        let graph = sample();
        let parents: Vec<Xref> = graph.parents(Xref::new("G_KID")).collect();
        assert_eq!(parents, vec![Xref::new("G_DAD"), Xref::new("G_MUM")]);

        let children: Vec<Xref> = graph.children(Xref::new("G_MUM")).collect();
        assert_eq!(children, vec![Xref::new("G_KID")]);

        let spouses: Vec<Xref> = graph.spouses(Xref::new("G_DAD")).collect();
        assert_eq!(spouses, vec![Xref::new("G_MUM")]);
    }

    #[test]
    fn test_roots_are_individuals_without_parents_family() {
        let graph = sample();
        let roots: Vec<Xref> = graph.roots().map(|p| p.id).collect();
        assert_eq!(roots, vec![Xref::new("G_DAD"), Xref::new("G_MUM")]);
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let mut graph = sample();
        let mut replacement = person("G_DAD");
        replacement.occupation = Some("Miller".to_string());
        let previous = graph.insert_individual(replacement);

        assert!(previous.is_some());
        assert_eq!(graph.individuals_count(), 3);
        let first = graph.individuals().next().unwrap();
        assert_eq!(first.id, Xref::new("G_DAD"));
        assert_eq!(first.occupation.as_deref(), Some("Miller"));
    }

    #[test]
    fn test_queries_on_missing_ids_are_empty() {
        let graph = sample();
        assert_eq!(graph.parents(Xref::new("G_NOBODY")).count(), 0);
        assert_eq!(graph.children(Xref::new("G_NOBODY")).count(), 0);
    }
}
