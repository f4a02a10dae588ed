//! Tool configuration (.pinledger.yaml)
//!
//! Lookup order, first match wins:
//! 1. `--config` / `PINLEDGER_CONFIG`
//! 2. `.pinledger.yaml` next to the manifest
//! 3. `<config dir>/pinledger/config.yaml`
//!
//! No file at all means defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, config as config_error};
use crate::lockfile::LOCKFILE_NAME;
use crate::manifest::lint::{DEFAULT_KNOWN_SETTINGS, LintCode, LintLevel, LintSettings};

/// Manifest file name used when none is configured
pub const DEFAULT_MANIFEST_NAME: &str = "conanfile.py";

/// Per-project configuration file name
pub const PROJECT_CONFIG_NAME: &str = ".pinledger.yaml";

/// Tool configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    /// Manifest file name looked up in directories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,

    /// Lock file name, relative to the manifest's directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lockfile: Option<String>,

    /// Accepted `settings` entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_settings: Option<Vec<String>>,

    /// Lint code to level
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub lints: BTreeMap<String, LintLevel>,
}

impl ToolConfig {
    /// Parse configuration from YAML, naming `origin` in errors
    pub fn from_yaml(yaml: &str, origin: &str) -> Result<Self> {
        // An empty file is a valid, empty configuration.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| config_error::parse_failed(origin, e.to_string()))
    }

    /// Read a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| config_error::read_failed(path.display().to_string(), e.to_string()))?;
        Self::from_yaml(&yaml, &path.display().to_string())
    }

    pub fn manifest_name(&self) -> &str {
        self.manifest.as_deref().unwrap_or(DEFAULT_MANIFEST_NAME)
    }

    pub fn lockfile_name(&self) -> &str {
        self.lockfile.as_deref().unwrap_or(LOCKFILE_NAME)
    }

    /// Lint levels and known settings, rejecting unknown lint codes
    pub fn lint_settings(&self) -> Result<LintSettings> {
        let mut settings = LintSettings::default();
        for (code, level) in &self.lints {
            let Some(parsed) = LintCode::parse(code) else {
                let known: Vec<&str> = LintCode::ALL.iter().map(|c| c.as_str()).collect();
                return Err(config_error::invalid(format!(
                    "unknown lint code '{code}' (known: {})",
                    known.join(", ")
                )));
            };
            settings.levels.insert(parsed, *level);
        }
        if let Some(known) = &self.known_settings {
            settings.known_settings = known.clone();
        }
        Ok(settings)
    }
}

/// A configuration together with the file it came from
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: ToolConfig,
    pub source: Option<PathBuf>,
}

impl LoadedConfig {
    /// Path of the configuration file, or `defaults` when none was found
    pub fn describe(&self) -> String {
        match &self.source {
            Some(path) => path.display().to_string(),
            None => "defaults".to_string(),
        }
    }
}

/// Find and load the configuration for a manifest in `manifest_dir`
pub fn resolve(explicit: Option<&Path>, manifest_dir: &Path) -> Result<LoadedConfig> {
    let user_dir = dirs::config_dir().map(|dir| dir.join("pinledger"));
    resolve_with(explicit, manifest_dir, user_dir.as_deref())
}

fn resolve_with(
    explicit: Option<&Path>,
    manifest_dir: &Path,
    user_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        // An explicitly named file must exist.
        return Ok(LoadedConfig {
            config: ToolConfig::load(path)?,
            source: Some(path.to_path_buf()),
        });
    }

    let candidates = [
        Some(manifest_dir.join(PROJECT_CONFIG_NAME)),
        user_dir.map(|dir| dir.join("config.yaml")),
    ];
    for path in candidates.into_iter().flatten() {
        if path.is_file() {
            debug!(path = %path.display(), "using configuration");
            return Ok(LoadedConfig {
                config: ToolConfig::load(&path)?,
                source: Some(path),
            });
        }
    }

    debug!(
        defaults = ?DEFAULT_KNOWN_SETTINGS,
        "no configuration file, using defaults"
    );
    Ok(LoadedConfig::default())
}
