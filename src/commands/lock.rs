//! Lock command implementation
//!
//! Writes the pin lock next to the manifest, or with `--frozen` only checks
//! that the existing lock still matches.

use console::Style;
use tracing::info;

use super::Context;
use super::helpers::resolve_manifest;
use crate::cli::{LockArgs, OutputFormat};
use crate::error::{Result, config as config_error};
use crate::lockfile::PinLock;
use crate::manifest::Manifest;

pub fn run(ctx: &Context, args: LockArgs) -> Result<()> {
    if ctx.format == OutputFormat::Yaml {
        return Err(config_error::invalid("lock supports text and json output only"));
    }

    let target = resolve_manifest(args.path, ctx.config_path())?;
    let source = target.read_source()?;
    let manifest = Manifest::parse_named(&source, &target.label())?;
    let current = PinLock::from_manifest(&manifest, &source, target.file_name());
    let lock_path = target.lockfile_path();
    let lock_label = lock_path.display().to_string();

    let status = if args.frozen {
        let existing = PinLock::load(&lock_path)?;
        existing.verify(&current)?;
        if existing.hash_only_change(&current) {
            info!(lock = %lock_label, "manifest source changed without pin changes");
            "up to date (manifest formatting changed)"
        } else {
            "up to date"
        }
    } else {
        let existing = if lock_path.is_file() {
            Some(PinLock::load(&lock_path)?)
        } else {
            None
        };
        if existing.as_ref() == Some(&current) {
            "up to date"
        } else {
            current.save(&lock_path)?;
            "written"
        }
    };

    match ctx.format {
        OutputFormat::Json => print!("{}", current.to_json()?),
        _ => println!(
            "{} {lock_label}: {} pin(s), {} option(s)",
            Style::new().green().apply_to(status),
            current.requires.len() + current.build_requires.len(),
            current.options.len()
        ),
    }
    Ok(())
}
