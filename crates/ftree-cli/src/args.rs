//! Command-line argument definitions for the ftree CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. A subcommand selects between checking a file and laying
//! out a tree; the global flags select the configuration file and logging
//! verbosity.

use clap::{Parser, Subcommand};

use ftree::layout::ViewMode;

/// Command-line arguments for the ftree genealogy tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a file and print statistics and diagnostics
    Check(CheckArgs),

    /// Lay out a tree around one individual and write it as JSON
    Layout(LayoutArgs),
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Path to the input file
    pub input: String,
}

#[derive(clap::Args, Debug)]
pub struct LayoutArgs {
    /// Path to the input file
    pub input: String,

    /// Id of the root individual, with or without `@` markers
    #[arg(short, long)]
    pub root: String,

    /// View mode (pedigree, descendant, hourglass); defaults to the configured mode
    #[arg(short, long)]
    pub mode: Option<ViewMode>,

    /// Number of generations to include in each direction
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Leave spouses out of the layout
    #[arg(long)]
    pub no_spouses: bool,

    /// Path to the output JSON file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<String>,
}
