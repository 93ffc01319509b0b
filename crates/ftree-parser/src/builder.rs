//! Maps record trees into a [`FamilyGraph`].
//!
//! Building runs in three passes over the records:
//!
//! 1. **Register**: every `INDI` and `FAM` id is registered. A repeated id is
//!    a duplicate: the later record replaces the earlier one but keeps its
//!    position, so file order stays stable.
//! 2. **Wire**: each surviving record becomes an entity. Pointers are
//!    resolved against the registered ids, so forward references work.
//!    A pointer to an unknown id is recorded as dangling and left out.
//! 3. **Reconcile**: links declared on only one end (a `FAMC` without the
//!    matching `CHIL`, a `HUSB` without the matching `FAMS`, ...) are
//!    completed, so every edge can be walked from both ends.
//!
//! Tags the model has no field for are kept on the entity as opaque,
//! path-qualified values (see [`OpaqueTags`]).

use indexmap::IndexMap;
use log::{debug, info};

use ftree_core::{
    date::DateValue,
    graph::{DuplicateRecord, EntityKind, FamilyGraph, UnresolvedRef},
    identifier::Xref,
    model::{
        Event, EventKind, Family, Header, Individual, MediaRef, Name, OpaqueTags, OtherRecord,
        Place, Sex, Submitter,
    },
    span::Span,
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    records::{Record, RecordKind, RecordNode},
};

/// Build the diagnostic for a pointer that names an undefined record.
pub fn dangling_reference(unresolved: &UnresolvedRef) -> Diagnostic {
    let target_kind = match unresolved.tag.as_str() {
        "FAMS" | "FAMC" => "family",
        _ => "individual",
    };
    Diagnostic::error(format!(
        "{} {} points to undefined {} {}",
        unresolved.source.pointer(),
        unresolved.tag,
        target_kind,
        unresolved.target.pointer()
    ))
    .with_code(ErrorCode::E200)
    .with_subject(unresolved.source)
    .with_line(unresolved.line)
    .with_label(unresolved.span, "no record with this id")
    .with_help("define the record or remove the link")
}

/// Build the diagnostic for a record reusing an id.
pub fn duplicate_record(duplicate: &DuplicateRecord) -> Diagnostic {
    Diagnostic::error(format!(
        "duplicate {} id {}",
        duplicate.kind.tag(),
        duplicate.id.pointer()
    ))
    .with_code(ErrorCode::E201)
    .with_subject(duplicate.id)
    .with_line(duplicate.line)
    .with_label(duplicate.span, "duplicate record")
    .with_secondary_label(duplicate.first_span, "first defined here")
    .with_help(format!(
        "the record on line {} replaces the one on line {}",
        duplicate.line, duplicate.first_line
    ))
}

/// Records that survived registration, keyed by id in file order.
#[derive(Debug, Default)]
struct Registry<'r, 'a> {
    individuals: IndexMap<Xref, &'r Record<'a>>,
    families: IndexMap<Xref, &'r Record<'a>>,
}

struct GraphBuilder<'d> {
    graph: FamilyGraph,
    diagnostics: &'d mut DiagnosticCollector,
}

impl<'d> GraphBuilder<'d> {
    fn new(diagnostics: &'d mut DiagnosticCollector) -> Self {
        Self {
            graph: FamilyGraph::new(),
            diagnostics,
        }
    }

    // =========================================================================
    // Pass 1: register ids
    // =========================================================================

    fn register<'r, 'a>(&mut self, records: &'r [Record<'a>]) -> Registry<'r, 'a> {
        let mut registry = Registry::default();

        for record in records {
            let id = record.root.line.xref;
            match (&record.kind, id) {
                (RecordKind::Individual, Some(id)) => {
                    self.register_entity(
                        &mut registry.individuals,
                        EntityKind::Individual,
                        id,
                        record,
                    );
                }
                (RecordKind::Family, Some(id)) => {
                    self.register_entity(&mut registry.families, EntityKind::Family, id, record);
                }
                (RecordKind::Submitter, Some(id)) => {
                    self.graph.add_submitter(Submitter {
                        id,
                        name: record.root.child_value("NAME").map(str::to_string),
                    });
                }
                (RecordKind::Individual | RecordKind::Family | RecordKind::Submitter, None) => {
                    self.diagnostics.emit(
                        Diagnostic::warning(format!("`{}` record has no id", record.root.tag()))
                            .with_code(ErrorCode::E102)
                            .with_line(record.lines.first())
                            .with_label(record.span(), "cannot be referenced")
                            .with_help("give the record an id such as `@I1@`"),
                    );
                }
                (RecordKind::Head, _) => self.graph.set_header(header(&record.root)),
                (RecordKind::Other(tag), id) => self.graph.add_other_record(OtherRecord {
                    tag: tag.clone(),
                    id,
                    line: record.lines.first(),
                }),
                (RecordKind::Trailer, _) => {}
            }
        }

        debug!(
            individuals = registry.individuals.len(),
            families = registry.families.len();
            "Ids registered"
        );
        registry
    }

    fn register_entity<'r, 'a>(
        &mut self,
        registered: &mut IndexMap<Xref, &'r Record<'a>>,
        kind: EntityKind,
        id: Xref,
        record: &'r Record<'a>,
    ) {
        if let Some(previous) = registered.insert(id, record) {
            let duplicate = DuplicateRecord {
                id,
                kind,
                span: record.span(),
                line: record.lines.first(),
                first_span: previous.span(),
                first_line: previous.lines.first(),
            };
            self.diagnostics.emit(duplicate_record(&duplicate));
            self.graph.record_duplicate(duplicate);
        }
    }

    // =========================================================================
    // Pass 2: build entities and wire pointers
    // =========================================================================

    fn wire(&mut self, registry: &Registry<'_, '_>) {
        for (&id, record) in &registry.individuals {
            let individual = self.individual(registry, id, record);
            self.graph.insert_individual(individual);
        }
        for (&id, record) in &registry.families {
            let family = self.family(registry, id, record);
            self.graph.insert_family(family);
        }
    }

    fn individual(
        &mut self,
        registry: &Registry<'_, '_>,
        id: Xref,
        record: &Record<'_>,
    ) -> Individual {
        let mut person = Individual::new(id, record.span(), record.lines.first());

        for node in &record.root.children {
            match node.tag() {
                "NAME" if person.name.is_none() => {
                    person.name = Some(name(node, &mut person.opaque));
                }
                "SEX" => person.sex = Sex::from_code(node.line.text()),
                "FAMS" => {
                    if let Some(family) = self.resolve(id, node, &registry.families) {
                        if !person.link_spouse_family(family) {
                            self.duplicate_link(id, node);
                        }
                    }
                }
                "FAMC" => {
                    if let Some(family) = self.resolve(id, node, &registry.families) {
                        if !person.link_child_family(family) {
                            self.duplicate_link(id, node);
                        }
                    }
                }
                "OCCU" if person.occupation.is_none() => {
                    person.occupation = Some(node.line.text().to_string());
                }
                "EDUC" if person.education.is_none() => {
                    person.education = Some(node.line.text().to_string());
                }
                "RELI" if person.religion.is_none() => {
                    person.religion = Some(node.line.text().to_string());
                }
                "NOTE" => {
                    person.notes.push(node.line.text().to_string());
                    collect_children(&mut person.opaque, "NOTE", node);
                }
                "OBJE" => person.media.push(media(node, &mut person.opaque)),
                tag => match EventKind::individual_from_tag(tag) {
                    Some(kind) => person.events.push(event(kind, node, &mut person.opaque)),
                    None => collect_opaque(&mut person.opaque, "", node),
                },
            }
        }

        person
    }

    fn family(&mut self, registry: &Registry<'_, '_>, id: Xref, record: &Record<'_>) -> Family {
        let mut family = Family::new(id, record.span(), record.lines.first());

        for node in &record.root.children {
            match node.tag() {
                "HUSB" => {
                    if let Some(husband) = self.resolve(id, node, &registry.individuals) {
                        self.fill_spouse(&mut family.husband, family.wife, husband, id, node);
                    }
                }
                "WIFE" => {
                    if let Some(wife) = self.resolve(id, node, &registry.individuals) {
                        self.fill_spouse(&mut family.wife, family.husband, wife, id, node);
                    }
                }
                "CHIL" => {
                    if let Some(child) = self.resolve(id, node, &registry.individuals) {
                        if !family.add_child(child) {
                            self.duplicate_link(id, node);
                        }
                    }
                }
                "NOTE" => {
                    family.notes.push(node.line.text().to_string());
                    collect_children(&mut family.opaque, "NOTE", node);
                }
                tag => match EventKind::family_from_tag(tag) {
                    Some(kind) => family.events.push(event(kind, node, &mut family.opaque)),
                    None => collect_opaque(&mut family.opaque, "", node),
                },
            }
        }

        family
    }

    /// Resolve the pointer on `node` against `known` ids.
    fn resolve(
        &mut self,
        source: Xref,
        node: &RecordNode<'_>,
        known: &IndexMap<Xref, &Record<'_>>,
    ) -> Option<Xref> {
        let Some(target) = node.line.pointer else {
            self.diagnostics.emit(
                Diagnostic::warning(format!(
                    "{} {} does not hold a pointer",
                    source.pointer(),
                    node.tag()
                ))
                .with_code(ErrorCode::E202)
                .with_subject(source)
                .with_line(node.line.line)
                .with_label(node.line.span, "expected an id such as `@I1@`"),
            );
            return None;
        };

        if known.contains_key(&target) {
            return Some(target);
        }

        let unresolved = UnresolvedRef {
            source,
            tag: node.tag().to_string(),
            target,
            span: node.line.span,
            line: node.line.line,
        };
        self.diagnostics.emit(dangling_reference(&unresolved));
        self.graph.record_unresolved(unresolved);
        None
    }

    /// Put `spouse` in `slot`. `other` is the family's opposite spouse slot;
    /// one individual cannot fill both.
    fn fill_spouse(
        &mut self,
        slot: &mut Option<Xref>,
        other: Option<Xref>,
        spouse: Xref,
        family: Xref,
        node: &RecordNode<'_>,
    ) {
        if other == Some(spouse) {
            self.diagnostics.emit(
                Diagnostic::warning(format!(
                    "{} is already the other spouse of {}; {} {} ignored",
                    spouse.pointer(),
                    family.pointer(),
                    node.tag(),
                    spouse.pointer()
                ))
                .with_code(ErrorCode::E205)
                .with_subject(family)
                .with_line(node.line.line)
                .with_label(node.line.span, "same individual in both spouse slots"),
            );
            return;
        }
        match *slot {
            None => *slot = Some(spouse),
            Some(existing) if existing == spouse => self.duplicate_link(family, node),
            Some(existing) => self.diagnostics.emit(
                Diagnostic::warning(format!(
                    "{} already has {} {}; {} ignored",
                    family.pointer(),
                    node.tag(),
                    existing.pointer(),
                    spouse.pointer()
                ))
                .with_code(ErrorCode::E205)
                .with_subject(family)
                .with_line(node.line.line)
                .with_label(node.line.span, "second spouse in the same slot"),
            ),
        }
    }

    fn duplicate_link(&mut self, source: Xref, node: &RecordNode<'_>) {
        self.diagnostics.emit(
            Diagnostic::warning(format!(
                "{} repeats {} {}",
                source.pointer(),
                node.tag(),
                node.line.text()
            ))
            .with_code(ErrorCode::E203)
            .with_subject(source)
            .with_line(node.line.line)
            .with_label(node.line.span, "duplicate link collapsed"),
        );
    }

    // =========================================================================
    // Pass 3: reconcile one-sided links
    // =========================================================================

    fn reconcile(&mut self) {
        self.mirror_family_links();
        self.mirror_individual_links();
    }

    /// Make every family's spouses and children point back at the family.
    fn mirror_family_links(&mut self) {
        let links: Vec<(Xref, Vec<(Xref, &'static str)>)> = self
            .graph
            .families()
            .map(|family| {
                let members = family
                    .husband
                    .map(|h| (h, "HUSB"))
                    .into_iter()
                    .chain(family.wife.map(|w| (w, "WIFE")))
                    .chain(family.children.iter().map(|&c| (c, "CHIL")))
                    .collect();
                (family.id, members)
            })
            .collect();

        for (family, members) in links {
            for (member, role) in members {
                let Some(person) = self.graph.individual_mut(member) else {
                    continue;
                };
                let (added, tag) = if role == "CHIL" {
                    (person.link_child_family(family), "FAMC")
                } else {
                    (person.link_spouse_family(family), "FAMS")
                };
                if added {
                    let (span, line) = (person.span, person.line);
                    let message = format!(
                        "added {tag} {} to {} to match {} {role}",
                        family.pointer(),
                        member.pointer(),
                        family.pointer()
                    );
                    self.repaired(member, span, line, message);
                }
            }
        }
    }

    /// Make every individual's family links show up on the family side.
    fn mirror_individual_links(&mut self) {
        let people: Vec<(Xref, Sex, Vec<Xref>, Vec<Xref>, Span, usize)> = self
            .graph
            .individuals()
            .map(|p| {
                (
                    p.id,
                    p.sex,
                    p.spouse_families.clone(),
                    p.child_families.clone(),
                    p.span,
                    p.line,
                )
            })
            .collect();

        for (id, sex, spouse_families, child_families, span, line) in people {
            let mut dropped = Vec::new();

            for family_id in spouse_families {
                let Some(family) = self.graph.family_mut(family_id) else {
                    continue;
                };
                if family.husband == Some(id) || family.wife == Some(id) {
                    continue;
                }
                let as_husband = match sex {
                    Sex::Male => true,
                    Sex::Female => false,
                    Sex::Unknown => family.husband.is_none(),
                };
                let (slot, role) = if as_husband {
                    (&mut family.husband, "HUSB")
                } else {
                    (&mut family.wife, "WIFE")
                };

                match *slot {
                    None => {
                        *slot = Some(id);
                        let message = format!(
                            "added {role} {} to {} to match {} FAMS",
                            id.pointer(),
                            family_id.pointer(),
                            id.pointer()
                        );
                        self.repaired(id, span, line, message);
                    }
                    Some(holder) => {
                        dropped.push(family_id);
                        self.diagnostics.emit(
                            Diagnostic::warning(format!(
                                "{} FAMS {} dropped: the family's {role} is {}",
                                id.pointer(),
                                family_id.pointer(),
                                holder.pointer()
                            ))
                            .with_code(ErrorCode::E205)
                            .with_subject(id)
                            .with_line(line)
                            .with_label(span, "conflicting spouse link"),
                        );
                    }
                }
            }

            for family_id in child_families {
                let Some(family) = self.graph.family_mut(family_id) else {
                    continue;
                };
                if family.add_child(id) {
                    let message = format!(
                        "added CHIL {} to {} to match {} FAMC",
                        id.pointer(),
                        family_id.pointer(),
                        id.pointer()
                    );
                    self.repaired(id, span, line, message);
                }
            }

            if dropped.is_empty() {
                continue;
            }
            if let Some(person) = self.graph.individual_mut(id) {
                person
                    .spouse_families
                    .retain(|family| !dropped.contains(family));
            }
        }
    }

    fn repaired(&mut self, subject: Xref, span: Span, line: usize, message: String) {
        self.diagnostics.emit(
            Diagnostic::info(message)
                .with_code(ErrorCode::E204)
                .with_subject(subject)
                .with_line(line)
                .with_label(span, "link completed"),
        );
    }

    fn finish(self) -> FamilyGraph {
        info!(
            individuals = self.graph.individuals_count(),
            families = self.graph.families_count(),
            unresolved = self.graph.unresolved().len(),
            duplicates = self.graph.duplicates().len();
            "Graph built"
        );
        self.graph
    }
}

// =============================================================================
// Record field helpers
// =============================================================================

fn header(root: &RecordNode<'_>) -> Header {
    Header {
        source: root.child_value("SOUR").map(str::to_string),
        version: root
            .child("GEDC")
            .and_then(|gedc| gedc.child_value("VERS"))
            .map(str::to_string),
        charset: root.child_value("CHAR").map(str::to_string),
        submitter: root.child("SUBM").and_then(|subm| subm.line.pointer),
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Read a `NAME` line. Structured `GIVN`/`SURN`/`NSFX` parts take precedence
/// over the slash-delimited value.
fn name(node: &RecordNode<'_>, opaque: &mut OpaqueTags) -> Name {
    let mut name = Name::parse(node.line.text());
    for child in &node.children {
        let part = non_empty(child.line.text());
        match child.tag() {
            "GIVN" if part.is_some() => name.given = part,
            "SURN" if part.is_some() => name.surname = part,
            "NSFX" if part.is_some() => name.suffix = part,
            _ => collect_opaque(opaque, "NAME", child),
        }
    }
    name
}

fn event(kind: EventKind, node: &RecordNode<'_>, opaque: &mut OpaqueTags) -> Event {
    let mut event = Event::new(kind, node.line.line);
    for child in &node.children {
        match child.tag() {
            "DATE" if !event.date.is_present() => {
                event.date = DateValue::parse(child.line.text());
            }
            "PLAC" if event.place.is_none() => {
                event.place = non_empty(child.line.text()).map(Place::new);
            }
            _ => collect_opaque(opaque, kind.tag(), child),
        }
    }
    event
}

fn media(node: &RecordNode<'_>, opaque: &mut OpaqueTags) -> MediaRef {
    let mut media = MediaRef {
        pointer: node.line.pointer,
        ..MediaRef::default()
    };
    for child in &node.children {
        match child.tag() {
            "FILE" => {
                media.file = non_empty(child.line.text());
                for detail in &child.children {
                    match detail.tag() {
                        "FORM" => media.format = non_empty(detail.line.text()),
                        "TITL" => media.title = non_empty(detail.line.text()),
                        _ => collect_opaque(opaque, "OBJE.FILE", detail),
                    }
                }
            }
            "FORM" => media.format = non_empty(child.line.text()),
            "TITL" => media.title = non_empty(child.line.text()),
            _ => collect_opaque(opaque, "OBJE", child),
        }
    }
    media
}

/// Store `node` and everything under it as opaque tags below `prefix`.
fn collect_opaque(opaque: &mut OpaqueTags, prefix: &str, node: &RecordNode<'_>) {
    let path = if prefix.is_empty() {
        node.tag().to_string()
    } else {
        format!("{prefix}.{}", node.tag())
    };
    opaque.push(path.as_str(), node.line.text());
    collect_children(opaque, &path, node);
}

fn collect_children(opaque: &mut OpaqueTags, path: &str, node: &RecordNode<'_>) {
    for child in &node.children {
        collect_opaque(opaque, path, child);
    }
}

/// Build the entity graph from record trees, reporting reference problems.
pub fn build_graph(records: &[Record<'_>], diagnostics: &mut DiagnosticCollector) -> FamilyGraph {
    let mut builder = GraphBuilder::new(diagnostics);
    let registry = builder.register(records);
    builder.wire(&registry);
    builder.reconcile();
    builder.finish()
}
