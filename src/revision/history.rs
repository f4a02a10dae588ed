//! Manifest history
//!
//! A history is a list of parsed revisions, oldest first. Revisions come from
//! explicit files or from the first-parent git history of the manifest.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use git2::Repository;
use serde::Serialize;
use tracing::debug;

use super::diff::{Change, ManifestDiff};
use super::version;
use crate::error::{Result, git as git_error};
use crate::git;
use crate::manifest::{Manifest, PackageReference};

/// One parsed revision of the manifest
#[derive(Debug, Clone, Serialize)]
pub struct Revision {
    /// Commit id or file name
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Commit time, seconds since the epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(skip)]
    pub manifest: Manifest,
}

/// Kinds of backwards pin movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Downgrade,
    /// Removed, then added back lower than the last version seen
    ReaddedLower,
}

/// A pin that moved backwards at `revision`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub revision: String,
    pub kind: ViolationKind,
    pub from: PackageReference,
    pub to: PackageReference,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ViolationKind::Downgrade => write!(
                f,
                "{}: downgraded {} {} -> {}",
                self.revision, self.to.name, self.from.version, self.to.version
            ),
            ViolationKind::ReaddedLower => write!(
                f,
                "{}: re-added {} at {}, below {} seen before removal",
                self.revision, self.to.name, self.to.version, self.from.version
            ),
        }
    }
}

/// A package's pin at one revision
#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry {
    pub revision: String,
    pub reference: Option<PackageReference>,
}

/// Revisions of one manifest, oldest first
#[derive(Debug, Clone, Default)]
pub struct ManifestHistory {
    pub revisions: Vec<Revision>,
}

impl ManifestHistory {
    /// Read revisions from files, in the given order
    pub fn from_files(paths: &[PathBuf]) -> Result<Self> {
        let revisions = paths
            .iter()
            .map(|path| {
                Ok(Revision {
                    label: path.display().to_string(),
                    summary: None,
                    time: None,
                    manifest: Manifest::load(path)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { revisions })
    }

    /// Read the first-parent git history of `manifest_path`
    ///
    /// Only commits that changed the manifest contribute a revision.
    pub fn from_git(
        repo: &Repository,
        manifest_path: &Path,
        max_count: Option<usize>,
    ) -> Result<Self> {
        let relative = git::relative_path(repo, manifest_path)?;
        let blobs = git::manifest_blobs(repo, &relative, max_count)?;
        if blobs.is_empty() {
            return Err(git_error::history_empty(relative.display().to_string()));
        }

        let mut revisions = Vec::with_capacity(blobs.len());
        for blob in blobs {
            let origin = format!("{}:{}", blob.short_id(), relative.display());
            let manifest = Manifest::parse_named(&blob.content, &origin)?;
            revisions.push(Revision {
                label: blob.short_id().to_string(),
                summary: blob.summary,
                time: Some(blob.time),
                manifest,
            });
        }
        debug!(count = revisions.len(), "loaded manifest history");
        Ok(Self { revisions })
    }

    /// Every package name that appears in any revision, in first-seen order
    pub fn packages(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for revision in &self.revisions {
            for name in revision.manifest.package_names() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// The package's pin at every revision
    pub fn timeline(&self, package: &str) -> Vec<TimelineEntry> {
        self.revisions
            .iter()
            .map(|revision| TimelineEntry {
                revision: revision.label.clone(),
                reference: revision
                    .manifest
                    .requirement(package)
                    .map(|r| r.reference.clone()),
            })
            .collect()
    }

    /// Diffs between consecutive revisions, paired with the newer revision
    pub fn diffs(&self) -> impl Iterator<Item = (&Revision, ManifestDiff)> {
        self.revisions
            .windows(2)
            .map(|pair| (&pair[1], ManifestDiff::between(&pair[0].manifest, &pair[1].manifest)))
    }

    /// Backwards pin movement across the whole history
    pub fn violations(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        // Last reference seen for each package, kept after removal.
        let mut last_seen: HashMap<String, PackageReference> = HashMap::new();
        if let Some(first) = self.revisions.first() {
            for requirement in first.manifest.all_requirements() {
                last_seen.insert(requirement.name().to_string(), requirement.reference.clone());
            }
        }

        for (revision, diff) in self.diffs() {
            for change in diff.changes {
                match change {
                    Change::Downgraded { from, to } => violations.push(Violation {
                        revision: revision.label.clone(),
                        kind: ViolationKind::Downgrade,
                        from,
                        to,
                    }),
                    Change::Added { reference } => {
                        if let Some(previous) = last_seen.get(&reference.name) {
                            if version::compare(&previous.version, &reference.version)
                                == Some(Ordering::Greater)
                            {
                                violations.push(Violation {
                                    revision: revision.label.clone(),
                                    kind: ViolationKind::ReaddedLower,
                                    from: previous.clone(),
                                    to: reference.clone(),
                                });
                            }
                        }
                    }
                    _ => {}
                }
            }
            for requirement in revision.manifest.all_requirements() {
                last_seen.insert(requirement.name().to_string(), requirement.reference.clone());
            }
        }
        violations
    }
}
