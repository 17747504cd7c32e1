//! Main entry point for the speechwire CLI

use clap::Parser;
use speechwire_cli::logging::{parse_log_level, setup_logging, LoggingConfig};
use speechwire_cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = parse_log_level(&cli.log_level)?;
    setup_logging(LoggingConfig::new(level))?;

    if let Some(summary) = cli.execute()? {
        println!("{}", summary);
    }
    Ok(())
}
