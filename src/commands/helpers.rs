//! Command helper utilities

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{self, ToolConfig};
use crate::error::{Result, fs as fs_error};

/// A manifest located on disk together with its configuration
#[derive(Debug)]
pub struct ManifestTarget {
    /// Manifest file path as the user will see it
    pub path: PathBuf,
    /// Directory holding the manifest and its lock file
    pub dir: PathBuf,
    pub config: ToolConfig,
}

impl ManifestTarget {
    /// Path of the lock file next to the manifest
    pub fn lockfile_path(&self) -> PathBuf {
        self.dir.join(self.config.lockfile_name())
    }

    /// Label used for the manifest in output and errors
    pub fn label(&self) -> String {
        self.path.display().to_string()
    }

    /// File name recorded in the lock
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.label(), |name| name.to_string_lossy().into_owned())
    }

    /// Read the manifest source text
    pub fn read_source(&self) -> Result<String> {
        if !self.path.is_file() {
            return Err(crate::error::manifest::not_found(self.label()));
        }
        std::fs::read_to_string(&self.path)
            .map_err(|e| fs_error::read_failed(self.label(), e.to_string()))
    }
}

/// Resolve a path argument from optional argument
///
/// If a path is provided, use it. Otherwise,
/// resolve to the current directory.
pub fn resolve_path(path: Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path),
        None => std::env::current_dir()
            .map_err(|e| fs_error::io_error(format!("Failed to get current directory: {e}"))),
    }
}

/// Locate the manifest for a file or directory argument and load its configuration
///
/// A directory is searched for the configured manifest file name.
pub fn resolve_manifest(path: Option<PathBuf>, config_path: Option<&Path>) -> Result<ManifestTarget> {
    let path = resolve_path(path)?;
    if path.is_dir() {
        let loaded = config::resolve(config_path, &path)?;
        let manifest = path.join(loaded.config.manifest_name());
        debug!(manifest = %manifest.display(), "resolved manifest in directory");
        return Ok(ManifestTarget {
            path: manifest,
            dir: path,
            config: loaded.config,
        });
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let loaded = config::resolve(config_path, &dir)?;
    Ok(ManifestTarget {
        path,
        dir,
        config: loaded.config,
    })
}
