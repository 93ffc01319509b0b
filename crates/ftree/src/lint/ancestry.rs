//! Cycle detection over the ancestor relation.
//!
//! The child → parent edges of the family graph are loaded into a petgraph
//! [`DiGraph`] and split into strongly connected components. A component with
//! more than one individual, or an individual that is its own parent, is a
//! cycle: everyone in it is their own ancestor.

use std::collections::HashMap;

use log::debug;
use petgraph::{
    algo::tarjan_scc,
    graph::{DiGraph, NodeIndex},
};

use ftree_core::{graph::FamilyGraph, identifier::Xref};
use ftree_parser::error::{Diagnostic, ErrorCode};

use super::Check;

/// Individuals that are their own ancestors.
pub struct AncestorCycles;

impl AncestorCycles {
    /// Returns each cycle as its members sorted by id, cycles sorted by their
    /// smallest member.
    pub fn cycles(graph: &FamilyGraph) -> Vec<Vec<Xref>> {
        let mut ancestry = DiGraph::<Xref, ()>::new();
        let nodes: HashMap<Xref, NodeIndex> = graph
            .individuals()
            .map(|person| (person.id, ancestry.add_node(person.id)))
            .collect();

        for person in graph.individuals() {
            let Some(&child) = nodes.get(&person.id) else {
                continue;
            };
            for parent in graph.parents(person.id) {
                if let Some(&parent) = nodes.get(&parent) {
                    ancestry.update_edge(child, parent, ());
                }
            }
        }
        debug!(
            individuals = ancestry.node_count(),
            edges = ancestry.edge_count();
            "Ancestry graph built"
        );

        let mut cycles: Vec<Vec<Xref>> = tarjan_scc(&ancestry)
            .into_iter()
            .filter(|component| {
                component.len() > 1 || ancestry.contains_edge(component[0], component[0])
            })
            .map(|component| {
                let mut members: Vec<Xref> = component.iter().map(|&n| ancestry[n]).collect();
                members.sort();
                members
            })
            .collect();
        cycles.sort();
        cycles
    }
}

impl Check for AncestorCycles {
    fn name(&self) -> &'static str {
        "ancestor-cycles"
    }

    fn run(&self, graph: &FamilyGraph, findings: &mut Vec<Diagnostic>) {
        for members in Self::cycles(graph) {
            let Some(person) = members.first().and_then(|&id| graph.individual(id)) else {
                continue;
            };
            let listed: Vec<String> = members.iter().map(Xref::pointer).collect();
            let message = if members.len() == 1 {
                format!("{} is listed as their own parent", person.id.pointer())
            } else {
                format!(
                    "{} are each other's ancestors: {}",
                    members.len(),
                    listed.join(", ")
                )
            };

            let mut diagnostic = Diagnostic::error(message)
                .with_code(ErrorCode::E304)
                .with_subject(person.id)
                .with_line(person.line)
                .with_label(person.span, "part of an ancestor cycle")
                .with_help("check the FAMC and CHIL links of these individuals");
            for other in members.iter().skip(1).filter_map(|&id| graph.individual(id)) {
                diagnostic = diagnostic.with_secondary_label(other.span, "also in the cycle");
            }
            findings.push(diagnostic);
        }
    }
}
