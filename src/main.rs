//! pinledger - dependency pin ledger
//!
//! A command line tool that reads the declarative surface of Conan-style
//! manifests without executing them, lints it, compares revisions across git
//! history and records pins in a lock file.

use clap::Parser;
use miette::Diagnostic;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod error;
mod git;
mod hash;
mod lockfile;
mod manifest;
mod revision;
mod ui;

use cli::{Cli, Commands};
use commands::Context;

/// Environment variable holding a tracing filter directive
const LOG_ENV: &str = "PINLEDGER_LOG";

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A second initialization only happens in tests; ignore it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = Context {
        config: cli.config,
        format: cli.format,
    };

    let result = match cli.command {
        Commands::Check(args) => commands::check::run(&ctx, args),
        Commands::Show(args) => commands::show::run(&ctx, args),
        Commands::Diff(args) => commands::diff::run(&ctx, args),
        Commands::History(args) => commands::history::run(&ctx, args),
        Commands::Lock(args) => commands::lock::run(&ctx, args),
        Commands::Version => commands::version::run(&ctx),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        if let Some(help) = e.help() {
            eprintln!("  help: {help}");
        }
        std::process::exit(1);
    }
}
