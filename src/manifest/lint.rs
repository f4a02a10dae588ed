//! Lint rules over a parsed manifest
//!
//! Each rule has a stable kebab-case code and a default level. Levels can be
//! overridden per code through the tool configuration.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Manifest, Requirement};

/// Settings accepted when the configuration does not list its own
pub const DEFAULT_KNOWN_SETTINGS: &[&str] = &["os", "arch", "compiler", "build_type"];

/// How a finding is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LintLevel {
    Allow,
    Warn,
    Deny,
}

impl fmt::Display for LintLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LintLevel::Allow => "allow",
            LintLevel::Warn => "warn",
            LintLevel::Deny => "deny",
        })
    }
}

/// Lint rule identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LintCode {
    MissingName,
    MissingVersion,
    DuplicateRequirement,
    MixedChannels,
    OptionForUnknownPackage,
    DuplicateOption,
    UnknownSetting,
    VersionRange,
}

impl LintCode {
    pub const ALL: [LintCode; 8] = [
        LintCode::MissingName,
        LintCode::MissingVersion,
        LintCode::DuplicateRequirement,
        LintCode::MixedChannels,
        LintCode::OptionForUnknownPackage,
        LintCode::DuplicateOption,
        LintCode::UnknownSetting,
        LintCode::VersionRange,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LintCode::MissingName => "missing-name",
            LintCode::MissingVersion => "missing-version",
            LintCode::DuplicateRequirement => "duplicate-requirement",
            LintCode::MixedChannels => "mixed-channels",
            LintCode::OptionForUnknownPackage => "option-for-unknown-package",
            LintCode::DuplicateOption => "duplicate-option",
            LintCode::UnknownSetting => "unknown-setting",
            LintCode::VersionRange => "version-range",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }

    pub fn default_level(self) -> LintLevel {
        match self {
            LintCode::DuplicateRequirement | LintCode::DuplicateOption => LintLevel::Deny,
            _ => LintLevel::Warn,
        }
    }
}

impl fmt::Display for LintCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single lint result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub code: LintCode,
    pub level: LintLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

/// Effective rule levels and accepted settings
#[derive(Debug, Clone)]
pub struct LintSettings {
    pub levels: HashMap<LintCode, LintLevel>,
    pub known_settings: Vec<String>,
}

impl Default for LintSettings {
    fn default() -> Self {
        Self {
            levels: HashMap::new(),
            known_settings: DEFAULT_KNOWN_SETTINGS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl LintSettings {
    pub fn level(&self, code: LintCode) -> LintLevel {
        self.levels
            .get(&code)
            .copied()
            .unwrap_or_else(|| code.default_level())
    }
}

/// Run every rule; findings at `allow` level are dropped
pub fn lint(manifest: &Manifest, settings: &LintSettings) -> Vec<Finding> {
    let mut report = Report {
        settings,
        findings: Vec::new(),
    };

    check_metadata(manifest, &mut report);
    check_duplicate_requirements(manifest, &mut report);
    check_channels(manifest, &mut report);
    check_ranges(manifest, &mut report);
    check_options(manifest, &mut report);
    check_settings(manifest, &mut report);

    report.findings
}

/// Number of findings at deny level
pub fn denied_count(findings: &[Finding]) -> usize {
    findings
        .iter()
        .filter(|f| f.level == LintLevel::Deny)
        .count()
}

struct Report<'a> {
    settings: &'a LintSettings,
    findings: Vec<Finding>,
}

impl Report<'_> {
    fn push(
        &mut self,
        code: LintCode,
        message: String,
        package: Option<&str>,
        line: Option<usize>,
    ) {
        let level = self.settings.level(code);
        if level == LintLevel::Allow {
            return;
        }
        self.findings.push(Finding {
            code,
            level,
            message,
            package: package.map(str::to_string),
            line,
        });
    }
}

fn check_metadata(manifest: &Manifest, report: &mut Report<'_>) {
    if manifest.name.is_none() {
        report.push(
            LintCode::MissingName,
            format!("recipe class '{}' has no 'name'", manifest.class_name),
            None,
            None,
        );
    }
    if manifest.version.is_none() {
        report.push(
            LintCode::MissingVersion,
            format!("recipe class '{}' has no 'version'", manifest.class_name),
            None,
            None,
        );
    }
}

fn check_duplicate_requirements(manifest: &Manifest, report: &mut Report<'_>) {
    let mut seen: HashMap<&str, &Requirement> = HashMap::new();
    for requirement in manifest.all_requirements() {
        if let Some(first) = seen.get(requirement.name()) {
            report.push(
                LintCode::DuplicateRequirement,
                format!(
                    "'{}' is required more than once ({} and {})",
                    requirement.name(),
                    first.reference,
                    requirement.reference
                ),
                Some(requirement.name()),
                Some(requirement.line),
            );
        } else {
            seen.insert(requirement.name(), requirement);
        }
    }
}

fn check_channels(manifest: &Manifest, report: &mut Report<'_>) {
    let (qualified, plain): (Vec<&Requirement>, Vec<&Requirement>) = manifest
        .all_requirements()
        .partition(|r| r.reference.channel.is_some());
    if qualified.is_empty() || plain.is_empty() {
        return;
    }
    let names = |reqs: &[&Requirement]| {
        reqs.iter()
            .map(|r| r.name().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    report.push(
        LintCode::MixedChannels,
        format!(
            "channel qualifiers are applied inconsistently: with channel [{}], without [{}]",
            names(&qualified),
            names(&plain)
        ),
        None,
        None,
    );
}

fn check_ranges(manifest: &Manifest, report: &mut Report<'_>) {
    for requirement in manifest.all_requirements() {
        if requirement.reference.is_range() {
            report.push(
                LintCode::VersionRange,
                format!(
                    "'{}' uses a version range instead of an exact pin",
                    requirement.reference
                ),
                Some(requirement.name()),
                Some(requirement.line),
            );
        }
    }
}

fn check_options(manifest: &Manifest, report: &mut Report<'_>) {
    let required: HashSet<&str> = manifest.all_requirements().map(Requirement::name).collect();
    let mut seen: BTreeMap<(Option<&str>, &str), &str> = BTreeMap::new();

    for option in &manifest.default_options {
        if let Some(package) = option.package.as_deref() {
            if !required.contains(package) {
                report.push(
                    LintCode::OptionForUnknownPackage,
                    format!("option '{option}' targets '{package}', which is not required"),
                    Some(package),
                    None,
                );
            }
        }
        if let Some(previous) = seen.insert(option.target(), option.value.as_str()) {
            report.push(
                LintCode::DuplicateOption,
                format!(
                    "option '{}' is set twice ({previous} and {})",
                    option.target_label(),
                    option.value
                ),
                option.package.as_deref(),
                None,
            );
        }
    }
}

fn check_settings(manifest: &Manifest, report: &mut Report<'_>) {
    for setting in &manifest.settings {
        if !report.settings.known_settings.iter().any(|k| k == setting) {
            report.push(
                LintCode::UnknownSetting,
                format!("unknown setting '{setting}'"),
                None,
                None,
            );
        }
    }
}
