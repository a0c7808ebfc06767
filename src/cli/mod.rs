//! CLI module for Delve.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Delve - Automated Web Research
///
/// Researches a topic on the web with a language model and writes a markdown report.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Research a single topic and print the report
    Research {
        /// The topic or question to research
        topic: String,

        /// Strategy to use (see 'delve strategies')
        #[arg(short, long)]
        strategy: Option<String>,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        /// Print the report with its metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// Research every topic in a JSONL file
    Batch {
        /// Input file with {"id": ..., "prompt": ...} lines
        #[arg(short, long)]
        input: Option<String>,

        /// Directory for <strategy>.jsonl output
        #[arg(short, long)]
        output_dir: Option<String>,

        /// Strategy to use (see 'delve strategies')
        #[arg(short, long)]
        strategy: Option<String>,

        /// Number of topics researched at the same time
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// List the available research strategies
    Strategies,

    /// Check configuration and credentials
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "agent.max_iterations")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
