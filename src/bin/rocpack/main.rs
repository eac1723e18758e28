//! rocpack CLI - Debian and RPM packaging for ROCm releases

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.global.verbose {
        EnvFilter::new("rocpack=debug")
    } else if cli.global.quiet {
        EnvFilter::new("rocpack=error")
    } else {
        EnvFilter::new("rocpack=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    let global = &cli.global;
    match cli.command {
        Commands::Package(args) => commands::package::execute(args, global),
        Commands::Fetch(args) => commands::fetch::execute(args, global),
        Commands::Resolve(args) => commands::resolve::execute(args, global),
        Commands::Select(args) => commands::select::execute(args, global),
        Commands::Clean(args) => commands::clean::execute(args, global),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
