//! Version command implementation
//!
//! Prints the tool version alongside the configuration that commands run
//! from the current directory would pick up.

use super::Context;
use crate::config;
use crate::error::Result;

pub fn run(ctx: &Context) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let loaded = config::resolve(ctx.config_path(), &cwd)?;
    let (major, minor, patch) = git2::Version::get().libgit2_version();

    println!("pinledger {}", env!("CARGO_PKG_VERSION"));
    println!("  libgit2: {major}.{minor}.{patch}");
    println!("  config: {}", loaded.describe());
    println!("  manifest: {}", loaded.config.manifest_name());
    println!("  lock: {}", loaded.config.lockfile_name());
    Ok(())
}
