//! stampfmt CLI: format changed files under DIR; use --dry-run to only report them.

use anyhow::Result;
use clap::Parser;
use stampfmt::engine::arg_parser::Cli;
use stampfmt::engine::handle_run;
use std::process::ExitCode;
use std::time::Instant;

fn main() -> Result<ExitCode> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    let summary = handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(if summary.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
