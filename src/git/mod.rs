//! Git access for manifest history
//!
//! This module handles:
//! - Discovering the repository that contains a manifest
//! - Resolving revisions (branches, tags, SHA prefixes, revspecs) to commits
//! - Reading a manifest blob at a revision
//! - Walking first-parent history and collecting each distinct manifest blob

use std::path::{Path, PathBuf};

use git2::{ErrorCode, Oid, Repository, Sort};
use tracing::debug;

use crate::error::{Result, git as git_error};

/// A manifest blob as it existed in one commit
#[derive(Debug, Clone)]
pub struct CommitBlob {
    /// Full commit SHA
    pub commit: String,
    /// First line of the commit message
    pub summary: Option<String>,
    /// Commit time, seconds since the epoch
    pub time: i64,
    pub content: String,
}

impl CommitBlob {
    /// Abbreviated commit id used as a revision label
    pub fn short_id(&self) -> &str {
        &self.commit[..self.commit.len().min(8)]
    }
}

/// Discover the repository containing `path`
pub fn discover(path: &Path) -> Result<Repository> {
    let start = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(path)
    };
    let start = if start.as_os_str().is_empty() {
        Path::new(".")
    } else {
        start
    };
    Repository::discover(start)
        .map_err(|e| git_error::open_failed(start.display().to_string(), e.message()))
}

/// Path of `manifest` relative to the repository's working directory, with `/` separators
pub fn relative_path(repo: &Repository, manifest: &Path) -> Result<PathBuf> {
    let Some(workdir) = repo.workdir() else {
        return Err(git_error::operation_failed(
            "bare repositories are not supported",
        ));
    };
    let workdir = workdir.canonicalize()?;
    let absolute = absolute_manifest_path(manifest)?;
    let relative = absolute.strip_prefix(&workdir).map_err(|_| {
        git_error::open_failed(
            workdir.display().to_string(),
            format!("{} is outside the repository", manifest.display()),
        )
    })?;
    Ok(relative.to_path_buf())
}

/// Canonical path of a manifest that may no longer exist in the working tree
fn absolute_manifest_path(manifest: &Path) -> Result<PathBuf> {
    if let Ok(path) = manifest.canonicalize() {
        return Ok(path);
    }
    let parent = match manifest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = manifest.file_name().ok_or_else(|| {
        git_error::operation_failed(format!("{} is not a file path", manifest.display()))
    })?;
    Ok(parent.canonicalize()?.join(file_name))
}

/// Resolve a revision name to a commit
pub fn resolve_commit<'a>(repo: &'a Repository, revision: &str) -> Result<git2::Commit<'a>> {
    let candidates = [
        revision.to_string(),
        format!("refs/heads/{revision}"),
        format!("refs/tags/{revision}"),
    ];
    for candidate in &candidates {
        if let Ok(reference) = repo.find_reference(candidate) {
            if let Ok(commit) = reference.peel_to_commit() {
                return Ok(commit);
            }
        }
    }

    repo.revparse_single(revision)
        .and_then(|object| object.peel_to_commit())
        .map_err(|e| git_error::revision_not_found(revision, e.message()))
}

/// Read the manifest at `relative` as of `revision`
pub fn read_at_revision(repo: &Repository, revision: &str, relative: &Path) -> Result<String> {
    let commit = resolve_commit(repo, revision)?;
    let tree = commit.tree()?;
    let entry = tree.get_path(relative).map_err(|e| {
        if e.code() == ErrorCode::NotFound {
            git_error::not_in_revision(revision, relative.display().to_string())
        } else {
            e.into()
        }
    })?;
    let blob = repo.find_blob(entry.id())?;
    blob_text(&blob, revision)
}

fn blob_text(blob: &git2::Blob<'_>, revision: &str) -> Result<String> {
    String::from_utf8(blob.content().to_vec()).map_err(|_| {
        git_error::operation_failed(format!("manifest at {revision} is not valid UTF-8"))
    })
}

/// Walk first-parent history from HEAD and return each distinct manifest blob, oldest first
///
/// A blob is attributed to the oldest commit of the run that carries it, so the
/// label is the commit that introduced that content. Commits without the manifest
/// are skipped. `max_count` limits how many commits are examined.
pub fn manifest_blobs(
    repo: &Repository,
    relative: &Path,
    max_count: Option<usize>,
) -> Result<Vec<CommitBlob>> {
    let mut walk = repo.revwalk()?;
    walk.push_head()?;
    walk.simplify_first_parent()?;
    walk.set_sorting(Sort::TOPOLOGICAL)?;

    // Newest first as walked.
    let mut walked: Vec<(Oid, Oid)> = Vec::new();
    for oid in walk.take(max_count.unwrap_or(usize::MAX)) {
        let oid = oid?;
        let commit = repo.find_commit(oid)?;
        match commit.tree()?.get_path(relative) {
            Ok(entry) => walked.push((oid, entry.id())),
            Err(e) if e.code() == ErrorCode::NotFound => {
                debug!(commit = %oid, "manifest absent, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let mut blobs: Vec<CommitBlob> = Vec::new();
    let mut last_blob: Option<Oid> = None;
    for (commit_id, blob_id) in walked.into_iter().rev() {
        if last_blob == Some(blob_id) {
            continue;
        }
        last_blob = Some(blob_id);

        let commit = repo.find_commit(commit_id)?;
        let label = commit_id.to_string();
        let blob = repo.find_blob(blob_id)?;
        debug!(commit = %label, blob = %blob_id, "manifest revision");
        blobs.push(CommitBlob {
            content: blob_text(&blob, &label)?,
            summary: commit.summary().map(str::to_string),
            time: commit.time().seconds(),
            commit: label,
        });
    }
    Ok(blobs)
}
