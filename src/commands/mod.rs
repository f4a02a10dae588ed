//! Command implementations for pinledger CLI

pub mod check;
pub mod completions;
pub mod diff;
pub mod helpers;
pub mod history;
pub mod lock;
pub mod show;
pub mod version;

use std::path::PathBuf;

use crate::cli::OutputFormat;

/// Global options shared by every command
#[derive(Debug, Clone)]
pub struct Context {
    /// Explicit configuration file
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
}

impl Context {
    pub fn config_path(&self) -> Option<&std::path::Path> {
        self.config.as_deref()
    }
}
