#![warn(rust_2024_compatibility, clippy::all)]

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use plumb::census::run_census;
use plumb::cli::{Args, Command};
use plumb::lint::run_once;
use plumb::occupy::run_occupy;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Lint(lint) => {
            let code = run_once(lint)?;
            std::process::exit(code);
        }
        Command::Census(census) => run_census(census),
        Command::Occupy(occupy) => run_occupy(occupy),
    }
}
