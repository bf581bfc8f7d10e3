//! hcmdoc CLI: Oracle HCM data-model documentation scraper.
//!
//! Turns the documentation's table of contents into a link list, then into
//! structured table and view metadata.

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
