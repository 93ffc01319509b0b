//! Positioned output of the layout engine.
//!
//! A [`PositionedTree`] is renderer-agnostic: it carries no coordinates, only
//! the generation each individual belongs to and the order of family units
//! within each generation. Every entry is a graph id, so renderers look up
//! names and dates in the [`FamilyGraph`](ftree_core::graph::FamilyGraph)
//! they laid out.

use serde::Serialize;

use ftree_core::identifier::Xref;

use super::ViewMode;

/// A couple or a single individual, plus the couple's children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FamilyUnit {
    /// The family this unit stands for; `None` for an individual shown alone.
    pub family: Option<Xref>,
    /// Individuals placed in this unit's generation by this unit. Across a
    /// whole tree every placed individual is a member of exactly one unit.
    pub members: Vec<Xref>,
    /// Partners in this family that were placed by another unit.
    pub linked: Vec<Xref>,
    /// The family's children present in the layout, in declared order.
    pub children: Vec<Xref>,
}

impl FamilyUnit {
    pub(super) fn for_family(family: Xref) -> Self {
        Self {
            family: Some(family),
            ..Self::default()
        }
    }

    pub(super) fn single(individual: Xref) -> Self {
        Self {
            members: vec![individual],
            ..Self::default()
        }
    }

    /// Everyone this unit shows as a partner, placed here or elsewhere.
    pub fn partners(&self) -> impl Iterator<Item = Xref> + '_ {
        self.members.iter().chain(&self.linked).copied()
    }
}

/// One generation of a layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generation {
    /// Distance from the root: negative for ancestors, positive for descendants.
    number: i32,
    units: Vec<FamilyUnit>,
}

impl Generation {
    pub(super) fn new(number: i32, units: Vec<FamilyUnit>) -> Self {
        Self { number, units }
    }

    pub fn number(&self) -> i32 {
        self.number
    }

    /// Family units in discovery order.
    pub fn units(&self) -> &[FamilyUnit] {
        &self.units
    }

    /// Individuals placed in this generation, unit by unit.
    pub fn members(&self) -> impl Iterator<Item = Xref> + '_ {
        self.units.iter().flat_map(|unit| unit.members.iter().copied())
    }
}

/// The result of laying out a family graph around one root individual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionedTree {
    root: Xref,
    mode: ViewMode,
    /// Sorted by ascending generation number.
    generations: Vec<Generation>,
}

impl PositionedTree {
    pub(super) fn new(root: Xref, mode: ViewMode, generations: Vec<Generation>) -> Self {
        Self {
            root,
            mode,
            generations,
        }
    }

    pub fn root(&self) -> Xref {
        self.root
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn generations(&self) -> &[Generation] {
        &self.generations
    }

    /// Returns the generation with the given number, if the tree has one.
    pub fn generation(&self, number: i32) -> Option<&Generation> {
        self.generations.iter().find(|g| g.number == number)
    }

    /// Returns the generation number an individual was placed in.
    pub fn generation_of(&self, individual: Xref) -> Option<i32> {
        self.generations
            .iter()
            .find(|g| g.members().any(|member| member == individual))
            .map(Generation::number)
    }

    /// Returns `true` if the individual is placed in this tree.
    pub fn contains(&self, individual: Xref) -> bool {
        self.generation_of(individual).is_some()
    }

    /// All family units, generation by generation.
    pub fn units(&self) -> impl Iterator<Item = &FamilyUnit> {
        self.generations.iter().flat_map(|g| g.units.iter())
    }

    /// Number of placed individuals.
    pub fn len(&self) -> usize {
        self.units().map(|unit| unit.members.len()).sum()
    }

    /// Always `false`: a tree holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PositionedTree {
        let mut parents = FamilyUnit::for_family(Xref::new("F1"));
        parents.members = vec![Xref::new("I2"), Xref::new("I3")];
        parents.children = vec![Xref::new("I1")];

        PositionedTree::new(
            Xref::new("I1"),
            ViewMode::Pedigree,
            vec![
                Generation::new(-1, vec![parents]),
                Generation::new(0, vec![FamilyUnit::single(Xref::new("I1"))]),
            ],
        )
    }

    #[test]
    fn test_lookups() {
        let tree = sample();
        assert_eq!(tree.len(), 3);
        assert!(!tree.is_empty());
        assert_eq!(tree.generation_of(Xref::new("I3")), Some(-1));
        assert_eq!(tree.generation_of(Xref::new("I1")), Some(0));
        assert!(!tree.contains(Xref::new("I4")));
        assert!(tree.generation(1).is_none());
    }

    #[test]
    fn test_serializes_ids_as_text() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["root"], "I1");
        assert_eq!(json["mode"], "pedigree");
        assert_eq!(json["generations"][0]["number"], -1);
        assert_eq!(json["generations"][0]["units"][0]["family"], "F1");
        assert_eq!(json["generations"][1]["units"][0]["family"], serde_json::Value::Null);
    }
}
