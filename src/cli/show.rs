use clap::Parser;
use std::path::PathBuf;

/// Arguments for the show command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show the manifest in the current directory:\n    pinledger show\n\n\
                  Show as JSON:\n    pinledger show --format json\n\n\
                  Show as YAML:\n    pinledger show engine/conanfile.py --format yaml")]
pub struct ShowArgs {
    /// Manifest file or directory containing it (defaults to the current directory)
    #[arg(env = "PINLEDGER_MANIFEST")]
    pub path: Option<PathBuf>,
}
