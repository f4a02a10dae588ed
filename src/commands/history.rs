//! History command implementation
//!
//! Loads every revision of the manifest (from git or snapshot files), prints
//! the changes or per-package timelines and fails when a pin moved backwards.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use super::Context;
use super::helpers::resolve_manifest;
use crate::cli::{HistoryArgs, OutputFormat};
use crate::error::{Result, config as config_error, lint as lint_error};
use crate::git;
use crate::revision::history::TimelineEntry;
use crate::revision::{Change, ManifestHistory, Revision, Violation};
use crate::ui::{self, display};

#[derive(Debug, Serialize)]
struct RevisionChanges<'a> {
    revision: &'a str,
    changes: Vec<Change>,
}

#[derive(Debug, Serialize)]
struct HistoryReport<'a> {
    revisions: &'a [Revision],
    changes: Vec<RevisionChanges<'a>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    timelines: BTreeMap<&'a str, Vec<TimelineEntry>>,
    violations: &'a [Violation],
}

pub fn run(ctx: &Context, args: HistoryArgs) -> Result<()> {
    if ctx.format == OutputFormat::Yaml {
        return Err(config_error::invalid("history supports text and json output only"));
    }

    let history = if args.files.is_empty() {
        load_git_history(ctx, &args)?
    } else {
        ManifestHistory::from_files(&args.files)?
    };

    let known = history.packages();
    for package in &args.package {
        if !known.contains(&package.as_str()) {
            warn!(package = %package, "package never appears in the manifest history");
        }
    }

    let violations = history.violations();
    match ctx.format {
        OutputFormat::Json => {
            let report = HistoryReport {
                revisions: &history.revisions,
                changes: history
                    .diffs()
                    .map(|(revision, diff)| RevisionChanges {
                        revision: &revision.label,
                        changes: diff
                            .changes
                            .into_iter()
                            .filter(|change| selected(&args.package, change))
                            .collect(),
                    })
                    .collect(),
                timelines: args
                    .package
                    .iter()
                    .map(|p| (p.as_str(), history.timeline(p)))
                    .collect(),
                violations: &violations,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            if args.package.is_empty() {
                print!("{}", display::history(&history));
            } else {
                for package in &args.package {
                    print!("{}", display::timeline(package, &history.timeline(package)));
                }
            }
            print!("{}", display::violations(&violations));
        }
    }

    if !violations.is_empty() {
        return Err(lint_error::violations(violations.len()));
    }
    Ok(())
}

/// Whether a change concerns one of the `--package` selections (all when none given)
fn selected(packages: &[String], change: &Change) -> bool {
    packages.is_empty()
        || change
            .package()
            .is_some_and(|name| packages.iter().any(|p| p == name))
}

fn load_git_history(ctx: &Context, args: &HistoryArgs) -> Result<ManifestHistory> {
    let target = resolve_manifest(args.path.clone(), ctx.config_path())?;
    let repo = git::discover(&target.path)?;

    let progress = ui::reporter(&format!("Reading history of {}", target.label()));
    let history = ManifestHistory::from_git(&repo, &target.path, args.max_count);
    progress.finish();
    history
}
