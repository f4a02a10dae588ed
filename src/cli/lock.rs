use clap::Parser;
use std::path::PathBuf;

/// Arguments for the lock command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Write pinledger.lock next to the manifest:\n    pinledger lock\n\n\
                  Fail instead of writing when pins drifted:\n    pinledger lock --frozen")]
pub struct LockArgs {
    /// Manifest file or directory containing it (defaults to the current directory)
    #[arg(env = "PINLEDGER_MANIFEST")]
    pub path: Option<PathBuf>,

    /// Fail if the lock is missing or would change
    #[arg(long)]
    pub frozen: bool,
}
