//! Summary statistics and structural queries over a family graph.

use std::{collections::HashSet, fmt};

use serde::Serialize;

use ftree_core::{
    graph::FamilyGraph,
    model::{Event, Family, Individual},
};

fn dated(event: Option<&Event>) -> bool {
    event.is_some_and(|event| event.date.is_present())
}

/// Counts shown by `ftree check`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub individuals: usize,
    pub families: usize,
    pub missing_names: usize,
    pub missing_birth_dates: usize,
    pub missing_death_dates: usize,
    /// Distinct place texts across all events, compared case-sensitively.
    pub distinct_places: usize,
}

impl Statistics {
    pub fn collect(graph: &FamilyGraph) -> Self {
        let mut stats = Self {
            individuals: graph.individuals_count(),
            families: graph.families_count(),
            ..Self::default()
        };
        for person in graph.individuals() {
            stats.missing_names += usize::from(!person.has_name());
            stats.missing_birth_dates += usize::from(!dated(person.birth()));
            stats.missing_death_dates += usize::from(!dated(person.death()));
        }

        let places: HashSet<&str> = graph
            .individuals()
            .flat_map(|person| person.events.iter())
            .chain(graph.families().flat_map(|family| family.events.iter()))
            .filter_map(|event| event.place.as_ref())
            .map(|place| place.as_str())
            .collect();
        stats.distinct_places = places.len();

        stats
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Individuals: {}", self.individuals)?;
        writeln!(f, "Families: {}", self.families)?;
        writeln!(f, "Distinct places: {}", self.distinct_places)?;
        writeln!(f, "Missing names: {}", self.missing_names)?;
        writeln!(f, "Missing birth dates: {}", self.missing_birth_dates)?;
        write!(f, "Missing death dates: {}", self.missing_death_dates)
    }
}

/// Families where at least one spouse has no parents, in file order.
///
/// These are the natural starting points for drawing a whole file.
pub fn root_families(graph: &FamilyGraph) -> Vec<&Family> {
    graph
        .families()
        .filter(|family| {
            family.spouses().any(|spouse| {
                graph
                    .individual(spouse)
                    .is_some_and(|person| person.child_families.is_empty())
            })
        })
        .collect()
}

/// Individuals no family refers to, sorted by display name and then id.
pub fn unconnected_individuals(graph: &FamilyGraph) -> Vec<&Individual> {
    let mut people: Vec<(String, &Individual)> = graph
        .individuals()
        .filter(|person| person.spouse_families.is_empty() && person.child_families.is_empty())
        .map(|person| (person.display_name(), person))
        .collect();
    people.sort_by(|(a_name, a), (b_name, b)| a_name.cmp(b_name).then_with(|| a.id.cmp(&b.id)));
    people.into_iter().map(|(_, person)| person).collect()
}

#[cfg(test)]
mod tests {
    use ftree_parser::parse;

    use super::*;

    const SOURCE: &str = "\
0 @I1@ INDI
1 NAME John /Smith/
1 BIRT
2 DATE 1900
2 PLAC Leeds
1 DEAT
2 DATE 1970
2 PLAC leeds
0 @I2@ INDI
1 NAME Mary /Jones/
1 BIRT
2 PLAC Leeds
0 @I3@ INDI
1 NAME Tom /Smith/
0 @I4@ INDI
1 NAME Zed
0 @I5@ INDI
0 @I6@ INDI
1 NAME Anna
0 @F1@ FAM
1 HUSB @I1@
1 WIFE @I2@
1 CHIL @I3@
1 MARR
2 PLAC York
0 @F2@ FAM
1 HUSB @I3@
";

    #[test]
    fn test_statistics() {
        let parsed = parse(SOURCE);
        let stats = Statistics::collect(&parsed.graph);
        assert_eq!(
            stats,
            Statistics {
                individuals: 6,
                families: 2,
                missing_names: 1,
                missing_birth_dates: 5,
                missing_death_dates: 5,
                distinct_places: 3,
            }
        );
        assert!(stats.to_string().starts_with("Individuals: 6\nFamilies: 2\n"));
    }

    #[test]
    fn test_root_families() {
        let parsed = parse(SOURCE);
        let roots: Vec<String> = root_families(&parsed.graph)
            .iter()
            .map(|family| family.id.to_string())
            .collect();
        // F2's only spouse has parents.
        assert_eq!(roots, vec!["F1"]);
    }

    #[test]
    fn test_unconnected_individuals() {
        let parsed = parse(SOURCE);
        let names: Vec<String> = unconnected_individuals(&parsed.graph)
            .iter()
            .map(|person| person.display_name())
            .collect();
        // I5 has no name and sorts under its id.
        assert_eq!(names, vec!["Anna", "I5", "Zed"]);
    }

    #[test]
    fn test_roots() {
        let parsed = parse(SOURCE);
        let roots: Vec<String> = parsed.graph.roots().map(|p| p.id.to_string()).collect();
        assert_eq!(roots, vec!["I1", "I2", "I4", "I5", "I6"]);
    }
}
