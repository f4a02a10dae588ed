//! Diff command implementation
//!
//! Compares two manifest files, or two git revisions of one manifest.

use std::path::Path;

use super::Context;
use super::helpers::resolve_manifest;
use crate::cli::{DiffArgs, OutputFormat};
use crate::error::{Result, config as config_error, lint as lint_error};
use crate::git;
use crate::manifest::Manifest;
use crate::revision::ManifestDiff;
use crate::ui::display;

pub fn run(ctx: &Context, args: DiffArgs) -> Result<()> {
    let (old, new) = if args.git {
        load_revisions(ctx, &args)?
    } else {
        let new = args
            .new
            .as_deref()
            .ok_or_else(|| config_error::invalid("diff needs two manifest files without --git"))?;
        (
            Manifest::load(Path::new(&args.old))?,
            Manifest::load(Path::new(new))?,
        )
    };

    let diff = ManifestDiff::between(&old, &new);
    match ctx.format {
        OutputFormat::Text => print!("{}", display::diff(&diff)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&diff)?),
        OutputFormat::Yaml => {
            return Err(config_error::invalid("diff supports text and json output only"));
        }
    }

    let violations = diff.violations().len();
    if args.check && violations > 0 {
        return Err(lint_error::violations(violations));
    }
    Ok(())
}

/// Read OLD and NEW revisions of the manifest; a missing NEW means the working tree
fn load_revisions(ctx: &Context, args: &DiffArgs) -> Result<(Manifest, Manifest)> {
    let target = resolve_manifest(args.manifest.clone(), ctx.config_path())?;
    let repo = git::discover(&target.path)?;
    let relative = git::relative_path(&repo, &target.path)?;

    let read = |revision: &str| -> Result<Manifest> {
        let source = git::read_at_revision(&repo, revision, &relative)?;
        Manifest::parse_named(&source, &format!("{revision}:{}", relative.display()))
    };

    let old = read(&args.old)?;
    let new = match &args.new {
        Some(revision) => read(revision)?,
        None => Manifest::parse_named(&target.read_source()?, &target.label())?,
    };
    Ok((old, new))
}
