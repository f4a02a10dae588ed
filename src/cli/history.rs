use clap::Parser;
use std::path::PathBuf;

/// Arguments for the history command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show how pins changed across commits:\n    pinledger history\n\n\
                  Show the timeline of selected packages:\n    pinledger history --package glfw --package entt\n\n\
                  Only look at the last 50 commits:\n    pinledger history --max-count 50\n\n\
                  Use snapshot files instead of git:\n    pinledger history --files v1.py v2.py v3.py")]
pub struct HistoryArgs {
    /// Manifest file or directory containing it (defaults to the current directory)
    #[arg(env = "PINLEDGER_MANIFEST")]
    pub path: Option<PathBuf>,

    /// Print the timeline of this package (repeatable)
    #[arg(long, short = 'p')]
    pub package: Vec<String>,

    /// Maximum number of commits to examine
    #[arg(long, short = 'n')]
    pub max_count: Option<usize>,

    /// Read revisions from these files, oldest first, instead of git
    #[arg(long, num_args = 1.., conflicts_with = "path")]
    pub files: Vec<PathBuf>,
}
