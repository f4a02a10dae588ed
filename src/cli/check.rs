use clap::Parser;
use std::path::PathBuf;

/// Arguments for the check command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Check the manifest in the current directory:\n    pinledger check\n\n\
                  Check a specific manifest:\n    pinledger check engine/conanfile.py\n\n\
                  Check every manifest below a directory:\n    pinledger check packages --recursive\n\n\
                  Also verify the pin lock:\n    pinledger check --locked")]
pub struct CheckArgs {
    /// Manifest file or directory containing it (defaults to the current directory)
    #[arg(env = "PINLEDGER_MANIFEST")]
    pub path: Option<PathBuf>,

    /// Verify the manifest against its pin lock
    #[arg(long)]
    pub locked: bool,

    /// Check every manifest found below the directory
    #[arg(long, short = 'r')]
    pub recursive: bool,
}
