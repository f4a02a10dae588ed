//! Text rendering for manifests, lint findings, diffs and histories
//!
//! Renderers return strings so commands decide where output goes.

use std::fmt::Write;

use console::Style;

use crate::manifest::lint::{Finding, LintLevel};
use crate::manifest::{Manifest, Requirement};
use crate::revision::history::TimelineEntry;
use crate::revision::{Change, ManifestDiff, ManifestHistory, Violation};

fn heading(text: &str) -> String {
    Style::new().bold().apply_to(text).to_string()
}

fn requirement_line(manifest: &Manifest, requirement: &Requirement) -> String {
    let mut line = format!("  {}", Style::new().yellow().apply_to(&requirement.reference));
    if let Some(modifier) = requirement.modifier {
        let _ = write!(
            line,
            " {}",
            Style::new().dim().apply_to(format!("({})", modifier_name(modifier)))
        );
    }
    let options: Vec<String> = manifest
        .options_for(requirement.name())
        .map(|o| format!("{}={}", o.key, o.value))
        .collect();
    if !options.is_empty() {
        let _ = write!(
            line,
            " {}",
            Style::new().dim().apply_to(format!("[{}]", options.join(", ")))
        );
    }
    line
}

fn modifier_name(modifier: crate::manifest::RequireModifier) -> &'static str {
    match modifier {
        crate::manifest::RequireModifier::Override => "override",
        crate::manifest::RequireModifier::Private => "private",
    }
}

/// Render the declarative surface of a manifest
pub fn manifest(manifest: &Manifest, origin: &str) -> String {
    let mut out = String::new();
    let title = match (&manifest.name, &manifest.version) {
        (Some(name), Some(version)) => format!("{name} {version}"),
        (Some(name), None) => name.clone(),
        _ => origin.to_string(),
    };
    let _ = writeln!(
        out,
        "{} {}",
        Style::new().bold().cyan().apply_to(title),
        Style::new()
            .dim()
            .apply_to(format!("({}({}))", manifest.class_name, manifest.base))
    );

    for (label, value) in [
        ("Description:", &manifest.description),
        ("License:", &manifest.license),
        ("URL:", &manifest.url),
        ("Author:", &manifest.author),
    ] {
        if let Some(value) = value {
            let _ = writeln!(out, "{} {value}", heading(label));
        }
    }
    if !manifest.topics.is_empty() {
        let _ = writeln!(out, "{} {}", heading("Topics:"), manifest.topics.join(", "));
    }
    if !manifest.settings.is_empty() {
        let _ = writeln!(out, "{} {}", heading("Settings:"), manifest.settings.join(", "));
    }
    if !manifest.generators.is_empty() {
        let _ = writeln!(
            out,
            "{} {}",
            heading("Generators:"),
            manifest.generators.join(", ")
        );
    }

    for (label, requirements) in [
        ("Requires", &manifest.requires),
        ("Build requires", &manifest.build_requires),
    ] {
        if requirements.is_empty() && label != "Requires" {
            continue;
        }
        let _ = writeln!(out, "{}", heading(&format!("{label} ({}):", requirements.len())));
        for requirement in requirements {
            let _ = writeln!(out, "{}", requirement_line(manifest, requirement));
        }
    }

    if !manifest.default_options.is_empty() {
        let _ = writeln!(
            out,
            "{}",
            heading(&format!("Options ({}):", manifest.default_options.len()))
        );
        for option in &manifest.default_options {
            let _ = writeln!(out, "  {option}");
        }
    }
    out
}

/// Render lint findings, one per line
pub fn findings(origin: &str, findings: &[Finding]) -> String {
    let mut out = String::new();
    for finding in findings {
        let (label, style) = match finding.level {
            LintLevel::Deny => ("error", Style::new().red().bold()),
            LintLevel::Warn => ("warning", Style::new().yellow().bold()),
            LintLevel::Allow => continue,
        };
        let location = match finding.line {
            Some(line) => format!("{origin}:{line}"),
            None => origin.to_string(),
        };
        let _ = writeln!(
            out,
            "{} {}: {}",
            style.apply_to(format!("{label}[{}]", finding.code)),
            Style::new().dim().apply_to(location),
            finding.message
        );
    }
    out
}

/// One-line result of a check
pub fn check_summary(origin: &str, manifest: &Manifest, findings: &[Finding]) -> String {
    let errors = findings
        .iter()
        .filter(|f| f.level == LintLevel::Deny)
        .count();
    let warnings = findings
        .iter()
        .filter(|f| f.level == LintLevel::Warn)
        .count();
    let counts = format!(
        "{} requirement(s), {} option(s)",
        manifest.all_requirements().count(),
        manifest.default_options.len()
    );
    if errors == 0 && warnings == 0 {
        format!("{} {origin}: {counts}", Style::new().green().apply_to("ok"))
    } else {
        format!("{origin}: {counts}, {errors} error(s), {warnings} warning(s)")
    }
}

fn change_line(change: &Change) -> String {
    let style = match change.marker() {
        '+' => Style::new().green(),
        '-' => Style::new().red(),
        '!' => Style::new().red().bold(),
        _ => Style::new().yellow(),
    };
    format!("{} {change}", style.apply_to(change.marker()))
}

/// Render a diff, one change per line
pub fn diff(diff: &ManifestDiff) -> String {
    if diff.is_empty() {
        return format!("{}\n", Style::new().dim().apply_to("no changes"));
    }
    let mut out = String::new();
    for change in &diff.changes {
        let _ = writeln!(out, "{}", change_line(change));
    }
    out
}

/// Render every revision with the changes it introduced
pub fn history(history: &ManifestHistory) -> String {
    let mut out = String::new();
    let Some(first) = history.revisions.first() else {
        return out;
    };
    let _ = writeln!(
        out,
        "{} {}",
        Style::new().bold().cyan().apply_to(&first.label),
        first.summary.as_deref().unwrap_or_default()
    );
    let _ = writeln!(
        out,
        "  initial: {} requirement(s)",
        first.manifest.all_requirements().count()
    );

    for (revision, changes) in history.diffs() {
        let _ = writeln!(
            out,
            "{} {}",
            Style::new().bold().cyan().apply_to(&revision.label),
            revision.summary.as_deref().unwrap_or_default()
        );
        if changes.is_empty() {
            let _ = writeln!(out, "  {}", Style::new().dim().apply_to("no pin changes"));
        }
        for change in &changes.changes {
            let _ = writeln!(out, "  {}", change_line(change));
        }
    }
    out
}

/// Render a package's pin at every revision
pub fn timeline(package: &str, entries: &[TimelineEntry]) -> String {
    let mut out = format!("{}\n", heading(package));
    for entry in entries {
        let pin = match &entry.reference {
            Some(reference) => Style::new().yellow().apply_to(reference.to_string()),
            None => Style::new().dim().apply_to("(absent)".to_string()),
        };
        let _ = writeln!(out, "  {}  {pin}", entry.revision);
    }
    out
}

/// Render revision invariant violations
pub fn violations(violations: &[Violation]) -> String {
    let mut out = String::new();
    for violation in violations {
        let _ = writeln!(
            out,
            "{} {violation}",
            Style::new().red().bold().apply_to("violation:")
        );
    }
    out
}
