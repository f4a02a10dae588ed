//! Pin lock (pinledger.lock) data structures
//!
//! The pin lock records the requirements and option overrides a manifest
//! declared, plus a BLAKE3 hash of the manifest source it was taken from.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, fs as fs_error, lockfile as lock_error};
use crate::hash;
use crate::manifest::{Manifest, OptionOverride, PackageReference, RequireModifier, Requirement};

/// Default lock file name
pub const LOCKFILE_NAME: &str = "pinledger.lock";

/// Pin lock structure (pinledger.lock)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinLock {
    /// Manifest file the lock was taken from
    pub manifest: String,

    /// BLAKE3 hash of the manifest source
    pub hash: String,

    /// Runtime requirements in declaration order
    pub requires: Vec<LockedPin>,

    /// Build and tool requirements in declaration order
    #[serde(default)]
    pub build_requires: Vec<LockedPin>,

    /// Option overrides in declaration order
    #[serde(default)]
    pub options: Vec<OptionOverride>,
}

/// A locked requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedPin {
    pub name: String,
    pub version: String,
    /// Full reference including channel and revision
    pub reference: PackageReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<RequireModifier>,
}

impl From<&Requirement> for LockedPin {
    fn from(requirement: &Requirement) -> Self {
        Self {
            name: requirement.reference.name.clone(),
            version: requirement.reference.version.clone(),
            reference: requirement.reference.clone(),
            modifier: requirement.modifier,
        }
    }
}

impl PinLock {
    /// Record the pins of `manifest`, hashing `source`
    pub fn from_manifest(manifest: &Manifest, source: &str, label: impl Into<String>) -> Self {
        Self {
            manifest: label.into(),
            hash: hash::hash_bytes(source.as_bytes()),
            requires: manifest.requires.iter().map(LockedPin::from).collect(),
            build_requires: manifest.build_requires.iter().map(LockedPin::from).collect(),
            options: manifest.default_options.clone(),
        }
    }

    /// Parse lock from JSON string
    pub fn from_json(json: &str, origin: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| lock_error::parse_failed(origin, e.to_string()))
    }

    /// Serialize lock to JSON string (pretty-printed, trailing newline)
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Read a lock file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(lock_error::missing(path.display().to_string()));
        }
        let json = std::fs::read_to_string(path)
            .map_err(|e| fs_error::read_failed(path.display().to_string(), e.to_string()))?;
        Self::from_json(&json, &path.display().to_string())
    }

    /// Write the lock file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)
            .map_err(|e| fs_error::write_failed(path.display().to_string(), e.to_string()))?;
        debug!(path = %path.display(), "wrote pin lock");
        Ok(())
    }

    /// Whether only the source hash differs from `other`
    pub fn hash_only_change(&self, other: &PinLock) -> bool {
        !hash::verify_hash(&self.hash, &other.hash) && self.first_difference(other).is_none()
    }

    /// Check that `current` pins match this lock
    ///
    /// A hash-only difference (comments, formatting) is accepted.
    pub fn verify(&self, current: &PinLock) -> Result<()> {
        match self.first_difference(current) {
            Some(reason) => Err(lock_error::outdated(reason)),
            None => Ok(()),
        }
    }

    /// Describe the first pin or option that differs between this lock and `current`
    pub fn first_difference(&self, current: &PinLock) -> Option<String> {
        pin_difference("requirement", &self.requires, &current.requires)
            .or_else(|| {
                pin_difference(
                    "build requirement",
                    &self.build_requires,
                    &current.build_requires,
                )
            })
            .or_else(|| option_difference(&self.options, &current.options))
    }
}

fn pin_difference(kind: &str, locked: &[LockedPin], current: &[LockedPin]) -> Option<String> {
    for pin in current {
        match locked.iter().find(|l| l.name == pin.name) {
            None => return Some(format!("{kind} {} is not in the lock", pin.reference)),
            Some(previous) if previous.reference != pin.reference => {
                return Some(format!(
                    "{} is required as {} but locked at {}",
                    pin.name, pin.reference, previous.reference
                ));
            }
            Some(previous) if previous.modifier != pin.modifier => {
                return Some(format!("{} changed its {kind} modifier", pin.name));
            }
            Some(_) => {}
        }
    }
    locked
        .iter()
        .find(|l| !current.iter().any(|c| c.name == l.name))
        .map(|l| format!("locked {kind} {} is no longer declared", l.reference))
}

fn option_difference(locked: &[OptionOverride], current: &[OptionOverride]) -> Option<String> {
    for option in current {
        match locked.iter().find(|l| l.target() == option.target()) {
            None => return Some(format!("option {option} is not in the lock")),
            Some(previous) if previous.value != option.value => {
                return Some(format!(
                    "option {} is {} but locked at {}",
                    option.target_label(),
                    option.value,
                    previous.value
                ));
            }
            Some(_) => {}
        }
    }
    locked
        .iter()
        .find(|l| !current.iter().any(|c| c.target() == l.target()))
        .map(|l| format!("locked option {l} is no longer set"))
}

#[cfg(test)]
mod tests;
