//! Layout engine
//!
//! The engine walks the graph breadth-first from the root, towards parents
//! (`FAMC` then the family's spouses) and/or towards children (`FAMS` then the
//! family's children). Every individual and every family is expanded at most
//! once, so the walk terminates on cyclic data; reaching an already placed
//! individual again only adds a link to the unit being built.
//!
//! Generation numbers follow the walk: one step up is `-1`, one step down is
//! `+1`, spouses share their partner's generation. Since the walk is
//! breadth-first, an individual reachable along several paths gets the
//! shortest one.
//!
//! Blood relatives win over spouses: a descendant who married another
//! descendant is placed by their own parents' family, at their own
//! generation, and is only linked from the marriage. Every child within the
//! depth is expanded, including one that was already placed.
//!
//! With `include_spouses` set, the root's own spouse units appear at
//! generation `0` in every mode; a pedigree shows the partners but none of
//! their children.

use std::collections::{BTreeMap, HashSet, VecDeque};

use indexmap::IndexMap;
use log::{debug, info, trace};

use ftree_core::{graph::FamilyGraph, identifier::Xref};

use super::{FamilyUnit, Generation, LayoutError, PositionedTree, ViewMode};
use crate::config::LayoutConfig;

/// Per-request layout options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    max_depth: usize,
    include_spouses: bool,
}

impl LayoutOptions {
    /// Create options with the given depth and spouse setting.
    ///
    /// # Arguments
    ///
    /// * `max_depth` - Number of generations to include on each side of the root
    /// * `include_spouses` - Whether spouses of the root and of descendants are
    ///   placed next to them
    pub fn new(max_depth: usize, include_spouses: bool) -> Self {
        Self {
            max_depth,
            include_spouses,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn include_spouses(&self) -> bool {
        self.include_spouses
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_include_spouses(mut self, include_spouses: bool) -> Self {
        self.include_spouses = include_spouses;
        self
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self::from(&LayoutConfig::default())
    }
}

impl From<&LayoutConfig> for LayoutOptions {
    fn from(config: &LayoutConfig) -> Self {
        Self::new(config.max_depth(), config.include_spouses())
    }
}

/// Builder for creating and configuring a layout [`Engine`].
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    depth_limit: usize,
    node_budget: Option<usize>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        let config = LayoutConfig::default();
        Self {
            depth_limit: config.depth_limit(),
            node_budget: config.node_budget(),
        }
    }
}

impl EngineBuilder {
    /// Create a new engine builder with the default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the largest `max_depth` a request may ask for
    pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    /// Set the maximum number of individuals a layout may place
    pub fn with_node_budget(mut self, node_budget: Option<usize>) -> Self {
        self.node_budget = node_budget;
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            depth_limit: self.depth_limit,
            node_budget: self.node_budget,
        }
    }
}

/// Generational layout engine.
///
/// An engine holds only limits, so one engine can lay out any number of
/// graphs, from any number of threads.
#[derive(Debug, Clone)]
pub struct Engine {
    depth_limit: usize,
    node_budget: Option<usize>,
}

impl Default for Engine {
    fn default() -> Self {
        EngineBuilder::new().build()
    }
}

impl Engine {
    /// Lay out `graph` around `root`.
    ///
    /// # Errors
    ///
    /// - [`LayoutError::RootNotFound`] if `root` is not an individual in `graph`
    /// - [`LayoutError::DepthExceeded`] if `options` ask for more generations
    ///   than the engine's depth limit
    /// - [`LayoutError::BudgetExceeded`] if more individuals would be placed
    ///   than the engine's node budget
    pub fn layout(
        &self,
        graph: &FamilyGraph,
        root: Xref,
        mode: ViewMode,
        options: &LayoutOptions,
    ) -> Result<PositionedTree, LayoutError> {
        info!(root:% = root, mode:% = mode, max_depth = options.max_depth(); "Calculating layout");

        if options.max_depth() > self.depth_limit {
            return Err(LayoutError::DepthExceeded {
                requested: options.max_depth(),
                limit: self.depth_limit,
            });
        }
        if !graph.contains_individual(root) {
            return Err(LayoutError::RootNotFound(root));
        }

        let mut traversal = Traversal::new(graph, options, self.node_budget);
        traversal.place(root, 0)?;

        if mode.includes_ancestors() {
            traversal.ancestors(root)?;
        }
        if mode.includes_descendants() {
            traversal.descendants(root, options.max_depth())?;
        } else if options.include_spouses() {
            traversal.descendants(root, 0)?;
        } else {
            traversal.push_unit(0, FamilyUnit::single(root));
        }

        let tree = traversal.finish(root, mode);
        info!(
            generations = tree.generations().len(),
            individuals = tree.len();
            "Layout calculated"
        );
        Ok(tree)
    }
}

/// Lay out `graph` around `root` with a default [`Engine`].
///
/// # Errors
///
/// See [`Engine::layout`].
pub fn layout(
    graph: &FamilyGraph,
    root: Xref,
    mode: ViewMode,
    options: &LayoutOptions,
) -> Result<PositionedTree, LayoutError> {
    Engine::default().layout(graph, root, mode, options)
}

/// State of one layout request.
struct Traversal<'g> {
    graph: &'g FamilyGraph,
    max_depth: usize,
    include_spouses: bool,
    node_budget: Option<usize>,
    /// Placed individuals and their generation, in placement order.
    placed: IndexMap<Xref, i32>,
    /// Families that already have a unit.
    families: HashSet<Xref>,
    /// Individuals that are a member of some unit.
    members: HashSet<Xref>,
    generations: BTreeMap<i32, Vec<FamilyUnit>>,
}

impl<'g> Traversal<'g> {
    fn new(graph: &'g FamilyGraph, options: &LayoutOptions, node_budget: Option<usize>) -> Self {
        Self {
            graph,
            max_depth: options.max_depth(),
            include_spouses: options.include_spouses(),
            node_budget,
            placed: IndexMap::new(),
            families: HashSet::new(),
            members: HashSet::new(),
            generations: BTreeMap::new(),
        }
    }

    /// Place an individual unless already placed. Returns `true` if placed now.
    fn place(&mut self, individual: Xref, generation: i32) -> Result<bool, LayoutError> {
        if self.placed.contains_key(&individual) {
            trace!(individual:% = individual; "Already placed, linking only");
            return Ok(false);
        }
        if let Some(budget) = self.node_budget {
            if self.placed.len() >= budget {
                return Err(LayoutError::BudgetExceeded { budget });
            }
        }
        self.placed.insert(individual, generation);
        Ok(true)
    }

    fn push_unit(&mut self, generation: i32, unit: FamilyUnit) {
        self.generations.entry(generation).or_default().push(unit);
    }

    /// Walk up through child-of families, one unit per parent couple.
    fn ancestors(&mut self, root: Xref) -> Result<(), LayoutError> {
        let graph = self.graph;
        let mut queue = VecDeque::from([(root, 0i32, 0usize)]);

        while let Some((person, generation, depth)) = queue.pop_front() {
            if depth >= self.max_depth {
                continue;
            }
            let Some(individual) = graph.individual(person) else {
                continue;
            };

            for &family_id in &individual.child_families {
                let Some(family) = graph.family(family_id) else {
                    continue;
                };
                if family.husband.is_none() && family.wife.is_none() {
                    continue;
                }
                if !self.families.insert(family_id) {
                    continue;
                }

                let parents_generation = generation - 1;
                let mut unit = FamilyUnit::for_family(family_id);
                for parent in family.spouses() {
                    if self.place(parent, parents_generation)? {
                        unit.members.push(parent);
                        self.members.insert(parent);
                        queue.push_back((parent, parents_generation, depth + 1));
                    } else {
                        unit.linked.push(parent);
                    }
                }
                self.push_unit(parents_generation, unit);
            }
        }

        debug!(placed = self.placed.len(); "Ancestors laid out");
        Ok(())
    }

    /// Root and its descendants up to `max_depth` generations down.
    fn blood_line(&self, root: Xref, max_depth: usize) -> HashSet<Xref> {
        let mut blood = HashSet::from([root]);
        let mut frontier = vec![root];
        for _ in 0..max_depth {
            let mut next = Vec::new();
            for person in frontier {
                for child in self.graph.children(person) {
                    if blood.insert(child) {
                        next.push(child);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        blood
    }

    /// Walk down through spouse-of families, one unit per family.
    fn descendants(&mut self, root: Xref, max_depth: usize) -> Result<(), LayoutError> {
        let graph = self.graph;
        let blood = self.blood_line(root, max_depth);
        let mut queued = HashSet::from([root]);
        let mut queue = VecDeque::from([(root, 0i32, 0usize)]);

        while let Some((person, generation, depth)) = queue.pop_front() {
            let Some(individual) = graph.individual(person) else {
                continue;
            };
            let mut is_member = self.members.contains(&person);

            for &family_id in &individual.spouse_families {
                let Some(family) = graph.family(family_id) else {
                    continue;
                };

                // Children are expanded even when the family was reached
                // through the other spouse first.
                if depth < max_depth {
                    for &child in &family.children {
                        self.place(child, generation + 1)?;
                        if queued.insert(child) {
                            queue.push_back((child, generation + 1, depth + 1));
                        }
                    }
                }

                if !self.families.insert(family_id) {
                    continue;
                }

                let mut unit = FamilyUnit::for_family(family_id);
                if is_member {
                    unit.linked.push(person);
                } else {
                    unit.members.push(person);
                    self.members.insert(person);
                    is_member = true;
                }

                if let Some(partner) = family.partner_of(person) {
                    if blood.contains(&partner) || self.placed.contains_key(&partner) {
                        unit.linked.push(partner);
                    } else if self.include_spouses && self.place(partner, generation)? {
                        unit.members.push(partner);
                        self.members.insert(partner);
                    }
                }

                self.push_unit(generation, unit);
            }

            if !is_member {
                self.push_unit(generation, FamilyUnit::single(person));
                self.members.insert(person);
            }
        }

        debug!(placed = self.placed.len(); "Descendants laid out");
        Ok(())
    }

    /// Fill in each family unit's children and collect the generations.
    fn finish(self, root: Xref, mode: ViewMode) -> PositionedTree {
        let Self {
            graph,
            placed,
            generations,
            ..
        } = self;

        let generations = generations
            .into_iter()
            .map(|(number, mut units)| {
                for unit in &mut units {
                    let Some(family) = unit.family.and_then(|id| graph.family(id)) else {
                        continue;
                    };
                    unit.children = family
                        .children
                        .iter()
                        .copied()
                        .filter(|child| placed.contains_key(child))
                        .collect();
                }
                Generation::new(number, units)
            })
            .collect();

        PositionedTree::new(root, mode, generations)
    }
}
