//! colmap CLI
//!
//! Builds SQL SET clauses, column lists and parameter lists from JSON records.

use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use colmap_cli::{run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let output = run(&cli)?;
    println!("{output}");
    Ok(())
}
