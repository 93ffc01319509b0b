//! End-to-end tests for the parsing pipeline
//!
//! These tests run source text through lexing, record structuring and graph
//! building, and check both the resulting graph and the diagnostics.

use ftree_core::{
    date::{DateQualifier, DateValue},
    graph::{EntityKind, FamilyGraph},
    identifier::Xref,
    model::{EventKind, Sex},
};

use crate::{
    error::{Diagnostic, ErrorCode, Severity},
    parse, parse_bytes,
};

fn id(text: &str) -> Xref {
    Xref::new(text)
}

/// Codes of all diagnostics, in emission order
fn codes(diagnostics: &[Diagnostic]) -> Vec<ErrorCode> {
    diagnostics.iter().filter_map(Diagnostic::code).collect()
}

/// Diagnostics of one code
fn with_code(diagnostics: &[Diagnostic], code: ErrorCode) -> Vec<&Diagnostic> {
    diagnostics.iter().filter(|d| d.code() == Some(code)).collect()
}

/// Every link must be walkable from both of its ends
fn assert_links_consistent(graph: &FamilyGraph) {
    for family in graph.families() {
        for spouse in family.spouses() {
            let person = graph.individual(spouse).expect("spouse exists");
            assert!(
                person.spouse_families.contains(&family.id),
                "{spouse} is a spouse in {} but has no FAMS for it",
                family.id
            );
        }
        for &child in &family.children {
            let person = graph.individual(child).expect("child exists");
            assert!(
                person.child_families.contains(&family.id),
                "{child} is a child in {} but has no FAMC for it",
                family.id
            );
        }
    }
    for person in graph.individuals() {
        for &family_id in &person.spouse_families {
            let family = graph.family(family_id).expect("family exists");
            assert!(
                family.husband == Some(person.id) || family.wife == Some(person.id),
                "{} has FAMS {family_id} but is not a spouse there",
                person.id
            );
        }
        for &family_id in &person.child_families {
            let family = graph.family(family_id).expect("family exists");
            assert!(
                family.children.contains(&person.id),
                "{} has FAMC {family_id} but is not a child there",
                person.id
            );
        }
    }
}

// =============================================================================
// Graph construction
// =============================================================================

#[test]
fn test_dangling_child_reference() {
    let source = "\
0 HEAD
0 @I1@ INDI
1 NAME Jane /Doe/
0 @F1@ FAM
1 HUSB @I1@
1 CHIL @I2@
0 TRLR
";
    let parsed = parse(source);
    let graph = &parsed.graph;

    assert!(graph.individual(id("I1")).is_some());
    let family = graph.family(id("F1")).expect("F1 is built");
    assert_eq!(family.husband, Some(id("I1")));
    assert!(family.children.is_empty());

    let dangling = with_code(&parsed.diagnostics, ErrorCode::E200);
    assert_eq!(dangling.len(), 1);
    assert_eq!(dangling[0].severity(), Severity::Error);
    assert_eq!(dangling[0].subject(), Some(id("F1")));
    assert_eq!(dangling[0].line(), Some(6));
    assert!(dangling[0].message().contains("@I2@"));

    assert_eq!(graph.unresolved().len(), 1);
    let unresolved = &graph.unresolved()[0];
    assert_eq!(unresolved.source, id("F1"));
    assert_eq!(unresolved.tag, "CHIL");
    assert_eq!(unresolved.target, id("I2"));
    assert!(parsed.has_errors());
}

#[test]
fn test_one_entity_per_record() {
    let source = "\
0 HEAD
0 @I1@ INDI
0 @I2@ INDI
0 @I3@ INDI
0 @F1@ FAM
0 @F2@ FAM
0 TRLR
";
    let parsed = parse(source);
    assert_eq!(parsed.graph.individuals_count(), 3);
    assert_eq!(parsed.graph.families_count(), 2);
    let ids: Vec<String> = parsed
        .graph
        .individuals()
        .map(|p| p.id.to_string())
        .collect();
    assert_eq!(ids, vec!["I1", "I2", "I3"]);
}

#[test]
fn test_forward_references_resolve() {
    let source = "\
0 @I1@ INDI
1 FAMS @F1@
0 @I2@ INDI
1 FAMC @F1@
0 @F1@ FAM
1 HUSB @I1@
1 CHIL @I2@
";
    let parsed = parse(source);

    assert!(
        parsed.diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        parsed.diagnostics
    );
    let child = parsed.graph.individual(id("I2")).unwrap();
    assert_eq!(child.child_families, vec![id("F1")]);
    assert_links_consistent(&parsed.graph);
}

#[test]
fn test_children_keep_declared_order() {
    let source = "\
0 @F1@ FAM
1 CHIL @C3@
1 CHIL @C1@
1 CHIL @C2@
0 @C1@ INDI
0 @C2@ INDI
0 @C3@ INDI
";
    let parsed = parse(source);
    let family = parsed.graph.family(id("F1")).unwrap();
    assert_eq!(family.children, vec![id("C3"), id("C1"), id("C2")]);
}

#[test]
fn test_duplicate_id_later_record_wins() {
    let source = "\
0 @I1@ INDI
1 NAME First /One/
0 @I2@ INDI
1 NAME Other /Person/
0 @I1@ INDI
1 NAME Second /One/
";
    let parsed = parse(source);
    let graph = &parsed.graph;

    assert_eq!(graph.individuals_count(), 2);
    let first = graph.individuals().next().unwrap();
    assert_eq!(first.id, id("I1"));
    assert_eq!(first.display_name(), "Second One");
    assert_eq!(first.line, 5);

    assert_eq!(graph.duplicates().len(), 1);
    let duplicate = &graph.duplicates()[0];
    assert_eq!(duplicate.kind, EntityKind::Individual);
    assert_eq!(duplicate.first_line, 1);
    assert_eq!(duplicate.line, 5);

    let diagnostics = with_code(&parsed.diagnostics, ErrorCode::E201);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].labels().len(), 2);
    assert!(diagnostics[0].labels()[1].is_secondary());
}

#[test]
fn test_same_id_on_different_entity_types_is_not_a_duplicate() {
    let parsed = parse("0 @X1@ INDI\n0 @X1@ FAM\n");
    assert!(parsed.graph.duplicates().is_empty());
    assert!(parsed.graph.individual(id("X1")).is_some());
    assert!(parsed.graph.family(id("X1")).is_some());
}

// =============================================================================
// Link reconciliation
// =============================================================================

#[test]
fn test_one_sided_links_are_completed() {
    let source = "\
0 @I1@ INDI
1 SEX M
0 @I2@ INDI
1 SEX F
1 FAMS @F1@
0 @I3@ INDI
1 FAMC @F1@
0 @F1@ FAM
1 HUSB @I1@
";
    let parsed = parse(source);
    let graph = &parsed.graph;

    let family = graph.family(id("F1")).unwrap();
    assert_eq!(family.husband, Some(id("I1")));
    assert_eq!(family.wife, Some(id("I2")));
    assert_eq!(family.children, vec![id("I3")]);
    assert_eq!(
        graph.individual(id("I1")).unwrap().spouse_families,
        vec![id("F1")]
    );

    let repairs = with_code(&parsed.diagnostics, ErrorCode::E204);
    assert_eq!(repairs.len(), 3);
    assert!(repairs.iter().all(|d| d.severity().is_info()));
    assert!(!parsed.has_errors());
    assert_links_consistent(graph);
}

#[test]
fn test_conflicting_spouse_link_is_dropped() {
    let source = "\
0 @I1@ INDI
1 SEX M
1 FAMS @F1@
0 @I2@ INDI
1 SEX M
1 FAMS @F1@
0 @F1@ FAM
1 HUSB @I1@
";
    let parsed = parse(source);

    let conflicts = with_code(&parsed.diagnostics, ErrorCode::E205);
    assert_eq!(conflicts.len(), 1);
    assert!(conflicts[0].severity().is_warning());
    assert_eq!(conflicts[0].subject(), Some(id("I2")));
    assert!(
        parsed
            .graph
            .individual(id("I2"))
            .unwrap()
            .spouse_families
            .is_empty()
    );
    assert_links_consistent(&parsed.graph);
}

#[test]
fn test_second_husband_line_is_ignored() {
    let source = "\
0 @I1@ INDI
0 @I2@ INDI
0 @F1@ FAM
1 HUSB @I1@
1 HUSB @I2@
";
    let parsed = parse(source);
    assert_eq!(parsed.graph.family(id("F1")).unwrap().husband, Some(id("I1")));
    assert_eq!(with_code(&parsed.diagnostics, ErrorCode::E205).len(), 1);
    assert_links_consistent(&parsed.graph);
}

#[test]
fn test_same_individual_as_husband_and_wife_is_rejected() {
    let source = "\
0 @A@ INDI
0 @B@ INDI
0 @F1@ FAM
1 HUSB @A@
1 WIFE @A@
1 CHIL @B@
";
    let parsed = parse(source);
    let graph = &parsed.graph;

    let conflicts = with_code(&parsed.diagnostics, ErrorCode::E205);
    assert_eq!(conflicts.len(), 1);
    assert!(conflicts[0].severity().is_warning());
    assert_eq!(conflicts[0].subject(), Some(id("F1")));
    assert_eq!(conflicts[0].line(), Some(5));

    let family = graph.family(id("F1")).unwrap();
    assert_eq!(family.husband, Some(id("A")));
    assert_eq!(family.wife, None);
    assert_eq!(family.partner_of(id("A")), None);
    assert_eq!(graph.parents(id("B")).collect::<Vec<_>>(), vec![id("A")]);
    assert_eq!(graph.individual(id("A")).unwrap().spouse_families, vec![id("F1")]);
    assert_links_consistent(graph);
}

#[test]
fn test_duplicate_child_is_collapsed() {
    let source = "\
0 @I1@ INDI
0 @F1@ FAM
1 CHIL @I1@
1 CHIL @I1@
";
    let parsed = parse(source);
    assert_eq!(parsed.graph.family(id("F1")).unwrap().children, vec![id("I1")]);
    let duplicates = with_code(&parsed.diagnostics, ErrorCode::E203);
    assert_eq!(duplicates.len(), 1);
    assert!(duplicates[0].severity().is_warning());
    assert_links_consistent(&parsed.graph);
}

#[test]
fn test_link_without_pointer() {
    let source = "\
0 @I1@ INDI
0 @F1@ FAM
1 HUSB John Smith
";
    let parsed = parse(source);
    assert_eq!(parsed.graph.family(id("F1")).unwrap().husband, None);
    assert_eq!(codes(&parsed.diagnostics), vec![ErrorCode::E202]);
}

// =============================================================================
// Field mapping
// =============================================================================

#[test]
fn test_structured_name_parts_take_precedence() {
    let source = "\
0 @I1@ INDI
1 NAME Jane /Doe/
2 GIVN Janet
2 SURN Doe-Smith
2 NPFX Dr.
";
    let parsed = parse(source);
    let person = parsed.graph.individual(id("I1")).unwrap();
    let name = person.name.as_ref().unwrap();
    assert_eq!(name.given.as_deref(), Some("Janet"));
    assert_eq!(name.surname.as_deref(), Some("Doe-Smith"));
    assert_eq!(person.opaque.get("NAME.NPFX"), ["Dr."]);
}

#[test]
fn test_name_without_delimiters() {
    let parsed = parse("0 @I1@ INDI\n1 NAME Cher\n");
    let name = parsed
        .graph
        .individual(id("I1"))
        .unwrap()
        .name
        .clone()
        .unwrap();
    assert_eq!(name.given.as_deref(), Some("Cher"));
    assert_eq!(name.surname, None);
    assert!(parsed.diagnostics.is_empty());
}

#[test]
fn test_sex_values() {
    let source = "\
0 @I1@ INDI
1 SEX M
0 @I2@ INDI
1 SEX F
0 @I3@ INDI
1 SEX X
0 @I4@ INDI
";
    let parsed = parse(source);
    let sexes: Vec<Sex> = parsed.graph.individuals().map(|p| p.sex).collect();
    assert_eq!(sexes, vec![Sex::Male, Sex::Female, Sex::Unknown, Sex::Unknown]);
    assert!(parsed.diagnostics.is_empty());
}

#[test]
fn test_event_dates_are_tri_state() {
    let source = "\
0 @I1@ INDI
1 BIRT
2 PLAC Springfield
1 DEAT
2 DATE sometime in winter
1 CHR
2 DATE 3 MAR 1901
1 BURI
2 DATE ABT 1980
";
    let parsed = parse(source);
    let person = parsed.graph.individual(id("I1")).unwrap();

    let birth = person.birth().unwrap();
    assert_eq!(birth.date, DateValue::Absent);
    assert_eq!(birth.place.as_ref().map(|p| p.as_str()), Some("Springfield"));

    let DateValue::Qualified(death) = &person.death().unwrap().date else {
        panic!("expected a qualified death date");
    };
    assert_eq!(death.qualifier(), DateQualifier::Phrase);
    assert_eq!(death.raw(), "sometime in winter");

    let christening = person.event(EventKind::Christening).unwrap();
    assert!(matches!(christening.date, DateValue::Exact(_)));

    let burial = person.event(EventKind::Burial).unwrap();
    assert_eq!(burial.date.year(), Some(1980));
}

#[test]
fn test_unknown_tags_are_kept_opaque() {
    let source = "\
0 @I1@ INDI
1 _UID 1234
1 BIRT
2 DATE 1900
2 SOUR @S1@
3 PAGE p. 4
1 NOTE First line
2 CONT second line
2 CONC  continued
";
    let parsed = parse(source);
    let person = parsed.graph.individual(id("I1")).unwrap();

    assert_eq!(person.opaque.get("_UID"), ["1234"]);
    assert_eq!(person.opaque.get("BIRT.SOUR"), ["@S1@"]);
    assert_eq!(person.opaque.get("BIRT.SOUR.PAGE"), ["p. 4"]);
    assert_eq!(person.opaque.get("NOTE.CONT"), ["second line"]);
    assert_eq!(person.opaque.get("NOTE.CONC"), ["continued"]);
    assert_eq!(person.notes, vec!["First line"]);
    assert_eq!(person.birth_year(), Some(1900));
}

#[test]
fn test_attributes_and_family_events() {
    let source = "\
0 @I1@ INDI
1 OCCU Miller
1 EDUC Grammar school
1 RELI Quaker
0 @F1@ FAM
1 HUSB @I1@
1 ENGA
2 DATE 1920
1 MARR
2 DATE 12 JUN 1921
2 PLAC Leeds
1 DIV
";
    let parsed = parse(source);
    let person = parsed.graph.individual(id("I1")).unwrap();
    assert_eq!(person.occupation.as_deref(), Some("Miller"));
    assert_eq!(person.education.as_deref(), Some("Grammar school"));
    assert_eq!(person.religion.as_deref(), Some("Quaker"));

    let family = parsed.graph.family(id("F1")).unwrap();
    let kinds: Vec<EventKind> = family.events.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![EventKind::Engagement, EventKind::Marriage, EventKind::Divorce]
    );
    let marriage = family.marriage().unwrap();
    assert_eq!(marriage.place.as_ref().map(|p| p.as_str()), Some("Leeds"));
    assert_eq!(marriage.date.year(), Some(1921));
}

#[test]
fn test_media_references() {
    let source = "\
0 @I1@ INDI
1 OBJE
2 FILE photos/jane.jpg
3 FORM jpg
3 TITL Jane at the fair
1 OBJE @M1@
0 @M1@ OBJE
1 FILE photos/portrait.png
";
    let parsed = parse(source);
    let person = parsed.graph.individual(id("I1")).unwrap();

    assert_eq!(person.media.len(), 2);
    assert_eq!(person.media[0].file.as_deref(), Some("photos/jane.jpg"));
    assert_eq!(person.media[0].format.as_deref(), Some("jpg"));
    assert_eq!(person.media[0].title.as_deref(), Some("Jane at the fair"));
    assert_eq!(person.media[1].pointer, Some(id("M1")));

    let other = parsed.graph.other_records();
    assert_eq!(other.len(), 1);
    assert_eq!(other[0].tag, "OBJE");
    assert_eq!(other[0].id, Some(id("M1")));
}

#[test]
fn test_header_and_submitter() {
    let source = "\
0 HEAD
1 SOUR ftree
1 GEDC
2 VERS 5.5.1
1 CHAR UTF-8
1 SUBM @U1@
0 @U1@ SUBM
1 NAME Archivist
0 TRLR
";
    let parsed = parse(source);
    let header = parsed.graph.header().unwrap();
    assert_eq!(header.source.as_deref(), Some("ftree"));
    assert_eq!(header.version.as_deref(), Some("5.5.1"));
    assert_eq!(header.charset.as_deref(), Some("UTF-8"));
    assert_eq!(header.submitter, Some(id("U1")));

    let submitters = parsed.graph.submitters();
    assert_eq!(submitters.len(), 1);
    assert_eq!(submitters[0].name.as_deref(), Some("Archivist"));
    assert!(parsed.diagnostics.is_empty());
}

// =============================================================================
// Recovery
// =============================================================================

#[test]
fn test_malformed_line_is_skipped() {
    let source = "\
0 @I1@ INDI
1 NAME Jane /Doe/
this is junk
1 SEX F
";
    let parsed = parse(source);
    let person = parsed.graph.individual(id("I1")).unwrap();
    assert_eq!(person.sex, Sex::Female);
    assert!(person.has_name());

    assert_eq!(codes(&parsed.diagnostics), vec![ErrorCode::E001]);
    assert_eq!(parsed.diagnostics[0].line(), Some(3));
}

#[test]
fn test_record_without_id() {
    let parsed = parse("0 INDI\n1 NAME Nobody\n0 TRLR\n");
    assert_eq!(parsed.graph.individuals_count(), 0);
    assert_eq!(codes(&parsed.diagnostics), vec![ErrorCode::E102]);
}

#[test]
fn test_level_skip_keeps_data() {
    let source = "\
0 @I1@ INDI
1 BIRT
3 DATE 1 JAN 1900
";
    let parsed = parse(source);
    let person = parsed.graph.individual(id("I1")).unwrap();
    assert_eq!(person.birth_year(), Some(1900));
    assert_eq!(codes(&parsed.diagnostics), vec![ErrorCode::E100]);
}

#[test]
fn test_empty_input() {
    let parsed = parse("");
    assert_eq!(parsed.graph.individuals_count(), 0);
    assert!(parsed.diagnostics.is_empty());
}

#[test]
fn test_parse_bytes_utf16() {
    let source = "0 @I1@ INDI\r\n1 NAME Zoë /Brontë/\r\n";
    let mut bytes = vec![0xFF, 0xFE];
    for unit in source.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }

    let parsed = parse_bytes(&bytes);
    let person = parsed.graph.individual(id("I1")).unwrap();
    assert_eq!(person.display_name(), "Zoë Brontë");
    assert!(parsed.diagnostics.is_empty());
}

#[test]
fn test_parse_bytes_reports_decoding_first() {
    let parsed = parse_bytes(b"0 @I1@ INDI\n1 NAME Jos\xE9\nbad\n");
    assert_eq!(codes(&parsed.diagnostics), vec![ErrorCode::E006, ErrorCode::E001]);
}
