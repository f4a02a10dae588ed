//! Option overrides
//!
//! An override configures a dependency's own build, e.g. `glad:gl_version=4.6`.
//! Overrides without a package prefix target the manifest's own package.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, reference};

/// A (package, key, value) option override
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionOverride {
    /// Target package, `None` for the manifest's own options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    pub key: String,
    pub value: String,
}

impl OptionOverride {
    /// Parse the `pkg:key=value` string form
    pub fn parse(input: &str) -> Result<Self> {
        let text = input.trim();
        let Some((target, value)) = text.split_once('=') else {
            return Err(reference::invalid_option(input, "missing '='"));
        };
        let (package, key) = split_target(input, target.trim())?;
        Ok(Self {
            package,
            key,
            value: value.trim().to_string(),
        })
    }

    /// Build from a dictionary entry `{"pkg:key": value}`
    pub fn from_entry(target: &str, value: impl Into<String>) -> Result<Self> {
        let (package, key) = split_target(target, target.trim())?;
        Ok(Self {
            package,
            key,
            value: value.into(),
        })
    }

    /// `(package, key)` identity used for duplicate detection and diffs
    pub fn target(&self) -> (Option<&str>, &str) {
        (self.package.as_deref(), self.key.as_str())
    }

    /// `pkg:key` without the value
    pub fn target_label(&self) -> String {
        match &self.package {
            Some(package) => format!("{package}:{}", self.key),
            None => self.key.clone(),
        }
    }
}

impl fmt::Display for OptionOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.target_label(), self.value)
    }
}

/// Split `pkg:key`, `pkg/*:key` or `key` into its package and key parts
fn split_target(input: &str, target: &str) -> Result<(Option<String>, String)> {
    let (package, key) = match target.split_once(':') {
        Some((package, key)) => {
            let package = package.trim();
            let package = package.strip_suffix("/*").unwrap_or(package);
            if package.is_empty() {
                return Err(reference::invalid_option(input, "empty package before ':'"));
            }
            (Some(package.to_string()), key.trim())
        }
        None => (None, target),
    };
    if key.is_empty() {
        return Err(reference::invalid_option(input, "option key is empty"));
    }
    Ok((package, key.to_string()))
}
