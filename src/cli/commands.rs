//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - optimize: run generate/score/refine rounds (default)
//! - generate: one round of copy generation only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// copytune - iteratively refine a marketing-copy prompt template
#[derive(Parser, Debug)]
#[command(name = "copytune")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Refine the prompt template over several rounds
    Optimize {
        /// Product to write copy for
        product: Option<String>,

        /// Number of rounds
        #[arg(short, long)]
        rounds: Option<u32>,

        /// Copies generated per round
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Starting template, with {product} and {n} slots
        #[arg(short, long)]
        template: Option<String>,

        /// Print the full run as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate copies once without refining
    Generate {
        /// Product to write copy for
        product: Option<String>,

        /// Number of copies
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Template, with {product} and {n} slots
        #[arg(short, long)]
        template: Option<String>,
    },
}
