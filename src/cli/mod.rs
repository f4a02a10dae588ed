//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - check: Check command arguments
//! - show: Show command arguments
//! - diff: Diff command arguments
//! - history: History command arguments
//! - lock: Lock command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod check;
pub mod completions;
pub mod diff;
pub mod history;
pub mod lock;
pub mod show;

pub use check::CheckArgs;
pub use completions::CompletionsArgs;
pub use diff::DiffArgs;
pub use history::HistoryArgs;
pub use lock::LockArgs;
pub use show::ShowArgs;

/// pinledger - dependency pin ledger for Conan-style manifests
///
/// Read, lint, diff and lock the declarative surface of a conanfile.py without executing it.
#[derive(Parser, Debug)]
#[command(
    name = "pinledger",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Inspect, lint, diff and lock the dependency pins of Conan-style manifests",
    long_about = "pinledger reads the declarative surface of Conan-style manifests (name, version, \
                  settings, generators, requires, default_options of a conanfile.py) without \
                  executing them, lints them, \
                  compares revisions and records pins in a lock file.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  pinledger check                        \x1b[90m# Lint ./conanfile.py\x1b[0m\n   \
                  pinledger check --locked               \x1b[90m# Lint and verify pinledger.lock\x1b[0m\n   \
                  pinledger show --format json           \x1b[90m# Print the parsed manifest as JSON\x1b[0m\n   \
                  pinledger diff --git HEAD~1            \x1b[90m# Pins changed since the previous commit\x1b[0m\n   \
                  pinledger history --package glfw       \x1b[90m# Timeline of one package\x1b[0m\n   \
                  pinledger lock --frozen                \x1b[90m# Fail if the lock would change\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Configuration file (defaults to .pinledger.yaml next to the manifest)
    #[arg(long, short = 'c', global = true, env = "PINLEDGER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    /// Only supported by `show`
    Yaml,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse and lint a manifest
    Check(CheckArgs),

    /// Print the parsed manifest
    Show(ShowArgs),

    /// Compare two manifest revisions
    Diff(DiffArgs),

    /// Walk the git history of a manifest
    History(HistoryArgs),

    /// Record current pins in the lock file
    Lock(LockArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
