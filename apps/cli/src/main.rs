//! nbreport CLI: execute every notebook in a tree and publish HTML reports.
//!
//! Discovers notebooks, runs each through the converter, and writes one
//! report per notebook plus an `index.html` summarizing success and failure.

mod commands;

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
