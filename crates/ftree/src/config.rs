//! Configuration types for validation and layout.
//!
//! This module provides configuration structures that control how a loaded
//! tree is checked and laid out. All types implement [`serde::Deserialize`]
//! for loading from external sources such as a TOML file.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining lint and layout settings.
//! - [`LintConfig`] - Thresholds used by the lint checks.
//! - [`LayoutConfig`] - Default view mode, depth and limits of the layout engine.
//!
//! # Example
//!
//! ```
//! # use ftree::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.lint().plausible_lifespan(), 120);
//! assert_eq!(config.layout().max_depth(), 4);
//! ```

use serde::Deserialize;

use ftree_core::date;

use crate::layout::ViewMode;

const DEFAULT_PLAUSIBLE_LIFESPAN: u32 = 120;
const DEFAULT_MAX_DEPTH: usize = 4;
const DEFAULT_DEPTH_LIMIT: usize = 64;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Lint configuration section.
    #[serde(default)]
    lint: LintConfig,

    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(lint: LintConfig, layout: LayoutConfig) -> Self {
        Self { lint, layout }
    }

    /// Returns the lint configuration.
    pub fn lint(&self) -> &LintConfig {
        &self.lint
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }
}

/// Settings for the lint checks.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Age in years past which an individual without a death record is
    /// assumed deceased.
    plausible_lifespan: u32,

    /// Year ages are computed against. Defaults to the current year.
    reference_year: Option<i32>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            plausible_lifespan: DEFAULT_PLAUSIBLE_LIFESPAN,
            reference_year: None,
        }
    }
}

impl LintConfig {
    pub fn new(plausible_lifespan: u32, reference_year: Option<i32>) -> Self {
        Self {
            plausible_lifespan,
            reference_year,
        }
    }

    pub fn plausible_lifespan(&self) -> u32 {
        self.plausible_lifespan
    }

    /// Returns the configured reference year, or the current calendar year.
    pub fn reference_year(&self) -> i32 {
        self.reference_year.unwrap_or_else(date::current_year)
    }
}

/// Defaults for the layout engine.
///
/// `max_depth` and `include_spouses` are per-request defaults that callers
/// may override; `depth_limit` and `node_budget` bound every request.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    mode: ViewMode,
    max_depth: usize,
    include_spouses: bool,
    depth_limit: usize,
    node_budget: Option<usize>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            mode: ViewMode::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            include_spouses: true,
            depth_limit: DEFAULT_DEPTH_LIMIT,
            node_budget: None,
        }
    }
}

impl LayoutConfig {
    /// Returns the default [`ViewMode`].
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Returns the default number of generations to include.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns whether spouses are placed next to blood relatives by default.
    pub fn include_spouses(&self) -> bool {
        self.include_spouses
    }

    /// Returns the largest `max_depth` any request may ask for.
    pub fn depth_limit(&self) -> usize {
        self.depth_limit
    }

    /// Returns the maximum number of individuals a layout may place, if any.
    pub fn node_budget(&self) -> Option<usize> {
        self.node_budget
    }

    pub fn with_mode(mut self, mode: ViewMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_include_spouses(mut self, include_spouses: bool) -> Self {
        self.include_spouses = include_spouses;
        self
    }

    pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    pub fn with_node_budget(mut self, node_budget: Option<usize>) -> Self {
        self.node_budget = node_budget;
        self
    }
}
