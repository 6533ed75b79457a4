//! grokbench - LLM-based code comprehension time estimator
//!
//! Batch driver that asks a local Ollama model, several times per file, how
//! many seconds a junior developer would need to understand cached source
//! code, and writes the answers next to a human baseline measurement.

pub mod batch;
pub mod cache;
pub mod cli;
pub mod error;
pub mod logging;
pub mod ollama;
pub mod progress;
pub mod prompt;
pub mod signal;

use std::time::Duration;

use crate::batch::{BatchConfig, BatchError};
use crate::cli::Cli;
use crate::error::ExitCode;
use crate::ollama::OllamaClient;
use crate::progress::Progress;

/// Run the application with parsed CLI arguments.
///
/// Returns the exit code to terminate with; interruption is a regular
/// outcome here, not an error.
///
/// # Errors
///
/// Returns an error for any fatal batch failure: unreadable input table,
/// unwritable output table, or a missing cache entry.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let shutdown = signal::install_handler();
    let client = OllamaClient::new(&cli.endpoint, &cli.model, Duration::from_secs(cli.timeout))?;
    let progress = Progress::new(cli.quiet);
    let config = BatchConfig {
        input_csv: cli.input_csv,
        output_csv: cli.output_csv,
        cache_dir: cli.cache_dir,
        ask_repeats: cli.ask_repeats,
    };

    log::info!("querying {} via {}", cli.model, cli.endpoint);
    log::info!("the first request may take a while while the model initializes");

    match batch::run(&config, &client, &shutdown, &progress) {
        Ok(_) => Ok(ExitCode::Success),
        Err(BatchError::Interrupted) => Ok(ExitCode::Interrupted),
        Err(err) => Err(err.into()),
    }
}
