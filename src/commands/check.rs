//! Check command implementation
//!
//! Parses one or more manifests, runs the lint rules and optionally verifies
//! each manifest against its pin lock.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use super::Context;
use super::helpers::{ManifestTarget, resolve_manifest, resolve_path};
use crate::cli::{CheckArgs, OutputFormat};
use crate::config;
use crate::error::{Result, config as config_error, lint as lint_error, manifest as manifest_error};
use crate::lockfile::PinLock;
use crate::manifest::Manifest;
use crate::manifest::lint::{self, Finding};
use crate::ui::display;

/// Result of checking one manifest
#[derive(Debug, Serialize)]
struct CheckReport {
    manifest: String,
    requirements: usize,
    options: usize,
    findings: Vec<Finding>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    locked: bool,
}

pub fn run(ctx: &Context, args: CheckArgs) -> Result<()> {
    if ctx.format == OutputFormat::Yaml {
        return Err(config_error::invalid("check supports text and json output only"));
    }

    let targets = if args.recursive {
        discover_targets(&resolve_path(args.path)?, ctx.config_path())?
    } else {
        vec![resolve_manifest(args.path, ctx.config_path())?]
    };

    let mut reports = Vec::with_capacity(targets.len());
    let mut denied = 0;
    for target in &targets {
        let source = target.read_source()?;
        let label = target.label();
        let manifest = Manifest::parse_named(&source, &label)?;
        let findings = lint::lint(&manifest, &target.config.lint_settings()?);
        denied += lint::denied_count(&findings);

        if ctx.format == OutputFormat::Text {
            print!("{}", display::findings(&label, &findings));
            println!("{}", display::check_summary(&label, &manifest, &findings));
        }

        if args.locked {
            verify_lock(target, &manifest, &source)?;
        }

        reports.push(CheckReport {
            manifest: label,
            requirements: manifest.all_requirements().count(),
            options: manifest.default_options.len(),
            findings,
            locked: args.locked,
        });
    }

    if ctx.format == OutputFormat::Json {
        let json = if args.recursive {
            serde_json::to_string_pretty(&reports)?
        } else {
            serde_json::to_string_pretty(&reports[0])?
        };
        println!("{json}");
    }

    if denied > 0 {
        return Err(lint_error::failed(denied));
    }
    Ok(())
}

fn verify_lock(target: &ManifestTarget, manifest: &Manifest, source: &str) -> Result<()> {
    let lock = PinLock::load(&target.lockfile_path())?;
    lock.verify(&PinLock::from_manifest(manifest, source, target.file_name()))?;
    debug!(manifest = %target.label(), "pin lock verified");
    Ok(())
}

/// Find every manifest below `root`, skipping hidden directories
fn discover_targets(root: &Path, config_path: Option<&Path>) -> Result<Vec<ManifestTarget>> {
    let root_config = config::resolve(config_path, root)?;
    let manifest_name = root_config.config.manifest_name().to_string();

    let paths: Vec<PathBuf> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || !entry.file_name().to_string_lossy().starts_with('.')
        })
        .filter_map(std::result::Result::ok)
        .filter(|entry| {
            entry.file_type().is_file() && entry.file_name().to_string_lossy() == manifest_name
        })
        .map(walkdir::DirEntry::into_path)
        .collect();

    if paths.is_empty() {
        return Err(manifest_error::not_found(
            root.join(&manifest_name).display().to_string(),
        ));
    }
    debug!(count = paths.len(), root = %root.display(), "discovered manifests");

    paths
        .into_iter()
        .map(|path| resolve_manifest(Some(path), config_path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discover_targets_skips_hidden_directories() {
        let temp = TempDir::new().unwrap();
        for dir in ["engine", "tools/editor", ".cache/pkg"] {
            std::fs::create_dir_all(temp.path().join(dir)).unwrap();
            std::fs::write(temp.path().join(dir).join("conanfile.py"), "").unwrap();
        }

        let targets = discover_targets(temp.path(), None).unwrap();
        let found: Vec<PathBuf> = targets
            .iter()
            .map(|t| t.path.strip_prefix(temp.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            found,
            vec![
                PathBuf::from("engine/conanfile.py"),
                PathBuf::from("tools/editor/conanfile.py"),
            ]
        );
    }

    #[test]
    fn test_discover_targets_none_found() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            discover_targets(temp.path(), None).unwrap_err(),
            crate::error::PinledgerError::ManifestNotFound { .. }
        ));
    }
}
