//! LitScout CLI — adaptive literature discovery for genomic foundation
//! models in plant science.
//!
//! Each run searches the configured sources, scores and filters what comes
//! back, and tunes its own parameters from the run history.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
