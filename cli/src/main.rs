mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{inspect, legend, render};
use tracing_subscriber::EnvFilter;

/// Log to stderr. RUST_LOG wins; otherwise -v raises the level from warn.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match &cli.command {
        Commands::Legend(args) => legend::run(&cli, args),
        Commands::Inspect(args) => inspect::run(&cli, args),
        Commands::Render(args) => render::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
