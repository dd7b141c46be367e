//! Main entry point for the unzipx CLI application.

use anyhow::Result;
use clap::Parser;

use unzipx::{Cli, TerminalInteraction, ZipReader};

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let ui = TerminalInteraction::new(cli.yes);
    let outcome = match unzipx::run(&ZipReader, &ui, cli.archive.clone(), cli.options()) {
        Ok(Some(outcome)) => outcome,
        // cancelled at the prompt
        Ok(None) => return Ok(()),
        // already reported to the user
        Err(_) => std::process::exit(1),
    };

    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
