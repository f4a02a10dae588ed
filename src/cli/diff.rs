use clap::Parser;
use std::path::PathBuf;

/// Arguments for the diff command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Compare two manifest files:\n    pinledger diff old/conanfile.py conanfile.py\n\n\
                  Compare the previous commit with the working tree:\n    pinledger diff --git HEAD~1\n\n\
                  Compare two revisions:\n    pinledger diff --git v0.1.0 main")]
pub struct DiffArgs {
    /// Old manifest file, or old revision with --git
    pub old: String,

    /// New manifest file, or new revision with --git (defaults to the working tree)
    #[arg(required_unless_present = "git")]
    pub new: Option<String>,

    /// Treat OLD and NEW as git revisions of the manifest
    #[arg(long)]
    pub git: bool,

    /// Fail when a pin moved backwards
    #[arg(long)]
    pub check: bool,

    /// Manifest file or directory used with --git (defaults to the current directory)
    #[arg(long, short = 'm', env = "PINLEDGER_MANIFEST")]
    pub manifest: Option<PathBuf>,
}
