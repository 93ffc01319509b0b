//! Generational layout of a family graph.
//!
//! This module turns a [`FamilyGraph`](ftree_core::graph::FamilyGraph) and a
//! chosen root individual into a [`PositionedTree`]: generation buckets of
//! family units that a renderer can draw without walking the graph itself.
//!
//! # Pipeline Position
//!
//! ```text
//! Source text
//!     ↓ ftree_parser
//! FamilyGraph
//!     ↓ layout (this module)
//! PositionedTree
//!     ↓ external renderer
//! Output
//! ```
//!
//! # Submodules
//!
//! - `engine` - Cycle-safe breadth-first traversal and generation assignment
//! - `tree` - The positioned output structures
//!
//! # Re-exports
//!
//! - [`EngineBuilder`] - Builder for configuring a layout [`Engine`]
//! - [`layout`] - Lay out with a default engine

mod engine;
mod tree;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ftree_core::identifier::Xref;

pub use engine::{Engine, EngineBuilder, LayoutOptions, layout};
pub use tree::{FamilyUnit, Generation, PositionedTree};

/// Which relatives of the root a layout includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// The root and their ancestors.
    #[default]
    Pedigree,
    /// The root and their descendants.
    Descendant,
    /// Ancestors and descendants, with the root in the middle.
    Hourglass,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pedigree => "pedigree",
            Self::Descendant => "descendant",
            Self::Hourglass => "hourglass",
        }
    }

    /// Returns `true` if this mode walks towards ancestors.
    pub fn includes_ancestors(&self) -> bool {
        matches!(self, Self::Pedigree | Self::Hourglass)
    }

    /// Returns `true` if this mode walks towards descendants.
    pub fn includes_descendants(&self) -> bool {
        matches!(self, Self::Descendant | Self::Hourglass)
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pedigree" => Ok(Self::Pedigree),
            "descendant" | "descendants" => Ok(Self::Descendant),
            "hourglass" => Ok(Self::Hourglass),
            _ => Err(format!(
                "unknown view mode `{s}` (expected pedigree, descendant or hourglass)"
            )),
        }
    }
}

/// Conditions under which no layout can be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("root individual {} not found", .0.pointer())]
    RootNotFound(Xref),

    #[error("requested depth {requested} exceeds the limit of {limit}")]
    DepthExceeded { requested: usize, limit: usize },

    #[error("layout exceeds the budget of {budget} individuals")]
    BudgetExceeded { budget: usize },
}
