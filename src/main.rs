//! grokbench - LLM-based code comprehension time estimator
//!
//! Entry point for the grokbench CLI application.

use clap::Parser;
use grokbench::{cli::Cli, error::ExitCode};

fn main() {
    let cli = Cli::parse();

    match grokbench::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = ExitCode::GeneralError;
            eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err);
            std::process::exit(exit_code.as_i32());
        }
    }
}
