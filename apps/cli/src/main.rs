//! featuredoc CLI: turn a merged pull request into a feature document.
//!
//! Reads the PR from GitHub, has an LLM write the narrative, and files the
//! result as a page in a Notion database.

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
