//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ReportPilot: weekly reporting pipeline for tabular data
#[derive(Parser)]
#[command(name = "reportpilot")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean a data file and write the cleaned table
    Clean {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Pipeline configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output path for the cleaned table (default: <file>_cleaned.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compute weekly summaries without cleaning
    Summarize {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Pipeline configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output path for the summaries (default: <file>.summary.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Clean, summarize and print a digest
    Run {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Pipeline configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the cleaning report and summaries as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
