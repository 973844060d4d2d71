//! Command-line interface definition for Sift
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for running a labeling session and inspecting the
//! configured rules and data sources.

use crate::session::UserLabel;
use clap::{Parser, Subcommand};

/// Sift - sample labeling and simulated AI data cleaning
///
/// Label a handful of samples for a query, then watch the simulated
/// cleaning run apply them to the whole dataset.
#[derive(Parser, Debug, Clone)]
#[command(name = "sift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Sift
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a labeling session through to the end of processing
    Clean {
        /// Search query the samples are generated for
        #[arg(short, long)]
        query: String,

        /// Labels for the samples in order (keep, remove, skip);
        /// unlabeled samples follow the AI prediction
        #[arg(short, long, value_delimiter = ',')]
        labels: Vec<UserLabel>,

        /// Override the number of samples
        #[arg(long)]
        count: Option<usize>,

        /// Seed the random predictor for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Override the processing tick interval (milliseconds)
        #[arg(long)]
        tick_ms: Option<u64>,

        /// Override the training delay (milliseconds)
        #[arg(long)]
        training_delay_ms: Option<u64>,

        /// Print the final session as JSON
        #[arg(long)]
        json: bool,
    },

    /// List manual cleaning rules
    Rules {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List data sources
    Sources {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            command: Commands::Sources { json: false },
        }
    }
}
