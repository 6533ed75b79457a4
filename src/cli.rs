//! Command-line interface definitions using the clap derive API.
//!
//! One operation, so a flat argument struct instead of subcommands.
//!
//! # Example
//!
//! ```bash
//! # Estimate every file listed in files.csv with llama3
//! grokbench -i files.csv -o estimates.csv -m llama3
//!
//! # Three attempts per file against a non-default Ollama host
//! grokbench -i files.csv -o estimates.csv -m llama3 -r 3 \
//!     --endpoint http://10.0.0.5:11434/api/generate
//! ```

use clap::Parser;
use std::path::PathBuf;

use crate::ollama::DEFAULT_ENDPOINT;

/// Batch-estimate how long a junior developer needs to understand each
/// source file listed in a CSV, by repeatedly asking a local Ollama model.
#[derive(Debug, Parser)]
#[command(name = "grokbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to input CSV with file_path and measures columns
    #[arg(short, long, value_name = "PATH")]
    pub input_csv: PathBuf,

    /// Path to output CSV receiving one row per input row
    #[arg(short, long, value_name = "PATH")]
    pub output_csv: PathBuf,

    /// Model identifier to pass to the inference service
    #[arg(short, long)]
    pub model: String,

    /// Per-request timeout in seconds
    #[arg(short, long, value_name = "SECONDS", default_value_t = 180)]
    pub timeout: u64,

    /// Directory holding the pre-fetched source code cache
    #[arg(short, long, value_name = "DIR", default_value = "./code_cache")]
    pub cache_dir: PathBuf,

    /// Number of times to ask the model per file
    #[arg(short = 'r', long, value_name = "N", default_value_t = 5)]
    pub ask_repeats: usize,

    /// Generate endpoint of the inference service
    #[arg(long, value_name = "URL", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output and all logging except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
