mod cli;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use crate::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    config.logging.init();
    debug!(command = ?cli.command, "dietcqm starting");

    cli::execute(&cli, &config)
}
