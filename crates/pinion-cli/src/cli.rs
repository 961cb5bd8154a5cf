//! CLI argument definitions for pinion.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pinion_core::config::Objective;

#[derive(Parser, Debug)]
#[command(
    name = "pinion",
    version,
    about = "Resolve package version constraints to one version per package",
    long_about = "Pinion builds the graph of every candidate version reachable from a set of \
                  requests, drops redundant candidates, and picks an optimal consistent set."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve requests and print the selected packages in install order
    Resolve {
        /// Package requests, e.g. "numpy >=1.20"
        #[arg(required = true)]
        requests: Vec<String>,
        /// Repodata JSON file
        #[arg(short, long)]
        repodata: PathBuf,
        /// Config file (defaults to ~/.pinion/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Selection objective: newest or fewest-packages
        #[arg(long)]
        objective: Option<Objective>,
        /// Skip removal of redundant candidates
        #[arg(long)]
        no_reduce: bool,
        /// Write a lockfile
        #[arg(long)]
        lock: Option<PathBuf>,
        /// Write the selection problem in CPLEX LP format
        #[arg(long)]
        emit_lp: Option<PathBuf>,
    },

    /// Show the candidate graph for a set of requests
    Graph {
        /// Package requests, e.g. "numpy >=1.20"
        #[arg(required = true)]
        requests: Vec<String>,
        /// Repodata JSON file
        #[arg(short, long)]
        repodata: PathBuf,
        /// Config file (defaults to ~/.pinion/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Skip removal of redundant candidates
        #[arg(long)]
        no_reduce: bool,
        /// Maximum depth to display
        #[arg(short, long)]
        depth: Option<usize>,
    },
}

/// Parse command-line arguments into a [`Cli`] struct.
pub fn parse() -> Cli {
    Cli::parse()
}
