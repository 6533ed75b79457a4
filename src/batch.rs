//! Row processing and batch orchestration.
//!
//! # Overview
//!
//! The batch driver walks the input table one row at a time:
//! 1. Resolve the row's cached source text (fatal on failure)
//! 2. Ask the model `ask_repeats` times with the same prompt
//! 3. Write one output line and flush it before moving on
//!
//! Attempt failures are data, not errors: each failed request or unparsable
//! reply is recorded as the sentinel `-1` in the output table and the run
//! continues. Everything else (unreadable tables, missing cache entries,
//! operator interruption) aborts the whole batch.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::cache::{self, CacheError};
use crate::ollama::Generator;
use crate::progress::ProgressCallback;
use crate::prompt;
use crate::signal::ShutdownHandler;

/// Column value written for a failed attempt.
pub const FAILED_ATTEMPT: i64 = -1;

/// One row of the input table.
///
/// Extra columns are ignored; `measures` is the human baseline estimate,
/// carried through to the output as opaque text.
#[derive(Debug, Clone, Deserialize)]
pub struct InputRow {
    /// Opaque file identifier, also the cache lookup key.
    pub file_path: String,
    /// Baseline measurement, passed through unmodified.
    pub measures: String,
}

/// The only reply shape the model is allowed to produce.
#[derive(Debug, Deserialize)]
struct SecondsReply {
    seconds: i64,
}

/// Why a single attempt failed. Collapsed to [`FAILED_ATTEMPT`] at the
/// serialization boundary; the reason itself only reaches the log.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// The inference request itself failed (transport, HTTP status, timeout).
    #[error("inference request failed: {0:#}")]
    Request(anyhow::Error),

    /// The model's reply was not a valid `{"seconds": <integer>}` object.
    #[error("unexpected model output: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Outcome of one attempt: a parsed estimate or the failure reason.
pub type Attempt = Result<i64, AttemptError>;

/// Integer written to the output table for an attempt.
#[must_use]
pub fn attempt_value(attempt: &Attempt) -> i64 {
    match attempt {
        Ok(seconds) => *seconds,
        Err(_) => FAILED_ATTEMPT,
    }
}

/// Fatal, batch-level errors.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The input table could not be read or deserialized.
    #[error("failed to read input table {path}: {source}")]
    Input {
        /// Path of the input table.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// The output table could not be created or written.
    #[error("failed to write output table {path}: {source}")]
    Output {
        /// Path of the output table.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// A row's cached source text was unreadable.
    #[error("while processing {file_path}: {source}")]
    Cache {
        /// File identifier of the row being processed.
        file_path: String,
        /// The resolver failure.
        source: CacheError,
    },

    /// The run was interrupted by the operator.
    #[error("batch interrupted by user")]
    Interrupted,
}

/// Configuration for one batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Source table with `file_path` and `measures` columns.
    pub input_csv: PathBuf,
    /// Destination table, truncated and rewritten from scratch.
    pub output_csv: PathBuf,
    /// Directory holding the pre-fetched source text cache.
    pub cache_dir: PathBuf,
    /// Attempts per row.
    pub ask_repeats: usize,
}

/// Counters reported after a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Rows processed and written.
    pub rows: usize,
    /// Attempts that failed and were recorded as the sentinel.
    pub failed_attempts: usize,
}

fn ask_once(generator: &dyn Generator, prompt: &str) -> Attempt {
    let raw = generator.generate(prompt).map_err(AttemptError::Request)?;
    let reply: SecondsReply = serde_json::from_str(raw.trim())?;
    Ok(reply.seconds)
}

/// Process one row: resolve its source text once, then run `ask_repeats`
/// independent attempts against the same prompt.
///
/// Always returns exactly `ask_repeats` attempt outcomes, in request order,
/// when content resolution succeeds.
///
/// # Errors
///
/// Returns [`CacheError`] if the row's cached source text cannot be read.
/// Attempt failures never surface here; they are captured per attempt.
pub fn process_row(
    row: &InputRow,
    generator: &dyn Generator,
    cache_dir: &Path,
    ask_repeats: usize,
) -> Result<Vec<Attempt>, CacheError> {
    let code = cache::resolve(&row.file_path, cache_dir)?;
    let prompt = prompt::build(&code);

    let mut attempts = Vec::with_capacity(ask_repeats);
    for attempt in 0..ask_repeats {
        match ask_once(generator, &prompt) {
            Ok(seconds) => attempts.push(Ok(seconds)),
            Err(err) => {
                log::warn!(
                    "attempt {}/{} failed for {}: {}",
                    attempt + 1,
                    ask_repeats,
                    row.file_path,
                    err
                );
                attempts.push(Err(err));
            }
        }
    }
    Ok(attempts)
}

fn input_error(path: &Path, source: csv::Error) -> BatchError {
    BatchError::Input {
        path: path.to_path_buf(),
        source,
    }
}

fn output_error(path: &Path, source: csv::Error) -> BatchError {
    BatchError::Output {
        path: path.to_path_buf(),
        source,
    }
}

fn read_input(path: &Path) -> Result<Vec<InputRow>, BatchError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| input_error(path, e))?;
    reader
        .deserialize()
        .collect::<Result<Vec<InputRow>, csv::Error>>()
        .map_err(|e| input_error(path, e))
}

fn header(ask_repeats: usize) -> Vec<String> {
    let mut columns = vec!["file_path".to_string(), "our_seconds".to_string()];
    columns.extend((0..ask_repeats).map(|i| format!("llm_seconds_{i}")));
    columns
}

/// Run the full batch: load the input table, then process and write rows
/// until done, interrupted, or a fatal error occurs.
///
/// Each data row is flushed before the next row starts, so everything
/// written so far survives a later abort.
///
/// # Errors
///
/// Returns [`BatchError`] on unreadable input, unwritable output, a missing
/// cache entry, or operator interruption. Rows already written stay on disk.
pub fn run(
    config: &BatchConfig,
    generator: &dyn Generator,
    shutdown: &ShutdownHandler,
    progress: &dyn ProgressCallback,
) -> Result<RunSummary, BatchError> {
    let rows = read_input(&config.input_csv)?;
    log::info!(
        "loaded {} rows from {}",
        rows.len(),
        config.input_csv.display()
    );

    let out = config.output_csv.as_path();
    let mut writer = csv::Writer::from_path(out).map_err(|e| output_error(out, e))?;
    writer
        .write_record(header(config.ask_repeats))
        .map_err(|e| output_error(out, e))?;
    writer.flush().map_err(|e| output_error(out, e.into()))?;

    progress.on_start(rows.len());
    let mut summary = RunSummary::default();

    for (idx, row) in rows.iter().enumerate() {
        if shutdown.is_shutdown_requested() {
            log::info!("interrupted before processing {}", row.file_path);
            return Err(BatchError::Interrupted);
        }
        progress.on_row(idx + 1, &row.file_path);

        let attempts = process_row(row, generator, &config.cache_dir, config.ask_repeats)
            .map_err(|source| {
                log::error!("aborting batch at {}: {}", row.file_path, source);
                BatchError::Cache {
                    file_path: row.file_path.clone(),
                    source,
                }
            })?;
        summary.failed_attempts += attempts.iter().filter(|a| a.is_err()).count();

        let mut record = vec![row.file_path.clone(), row.measures.clone()];
        record.extend(attempts.iter().map(|a| attempt_value(a).to_string()));
        writer.write_record(&record).map_err(|e| output_error(out, e))?;
        writer.flush().map_err(|e| output_error(out, e.into()))?;
        summary.rows += 1;
    }

    progress.on_finish();
    log::info!(
        "processed {} rows ({} failed attempts)",
        summary.rows,
        summary.failed_attempts
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    struct FixedGenerator(&'static str);

    impl Generator for FixedGenerator {
        fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingGenerator;

    impl Generator for FailingGenerator {
        fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
            bail!("connection refused")
        }
    }

    #[test]
    fn test_ask_once_parses_seconds() {
        let attempt = ask_once(&FixedGenerator(r#"{"seconds": 42}"#), "p");
        assert_eq!(attempt.unwrap(), 42);
    }

    #[test]
    fn test_ask_once_trims_whitespace() {
        let attempt = ask_once(&FixedGenerator("  {\"seconds\": 7}\n"), "p");
        assert_eq!(attempt.unwrap(), 7);
    }

    #[test]
    fn test_ask_once_malformed_json_is_decode_error() {
        let attempt = ask_once(&FixedGenerator("not json"), "p");
        assert!(matches!(attempt, Err(AttemptError::Decode(_))));
    }

    #[test]
    fn test_ask_once_missing_field_is_decode_error() {
        let attempt = ask_once(&FixedGenerator(r#"{"minutes": 2}"#), "p");
        assert!(matches!(attempt, Err(AttemptError::Decode(_))));
    }

    #[test]
    fn test_ask_once_non_integer_field_is_decode_error() {
        let attempt = ask_once(&FixedGenerator(r#"{"seconds": "ten"}"#), "p");
        assert!(matches!(attempt, Err(AttemptError::Decode(_))));
    }

    #[test]
    fn test_ask_once_request_failure_is_request_error() {
        let attempt = ask_once(&FailingGenerator, "p");
        assert!(matches!(attempt, Err(AttemptError::Request(_))));
    }

    #[test]
    fn test_attempt_value_collapses_failures_to_sentinel() {
        assert_eq!(attempt_value(&Ok(10)), 10);
        let failed: Attempt = ask_once(&FailingGenerator, "p");
        assert_eq!(attempt_value(&failed), FAILED_ATTEMPT);
    }

    #[test]
    fn test_header_labels_one_column_per_repeat() {
        assert_eq!(
            header(3),
            vec![
                "file_path",
                "our_seconds",
                "llm_seconds_0",
                "llm_seconds_1",
                "llm_seconds_2"
            ]
        );
    }

    #[test]
    fn test_header_with_zero_repeats() {
        assert_eq!(header(0), vec!["file_path", "our_seconds"]);
    }
}
