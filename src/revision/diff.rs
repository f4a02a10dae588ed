//! Differences between two manifest revisions
//!
//! Requirements are matched by package name, options by `(package, key)`.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use super::version;
use crate::manifest::{Channel, Manifest, OptionOverride, PackageReference, Requirement};

/// One change between two revisions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    Added {
        reference: PackageReference,
    },
    Removed {
        reference: PackageReference,
    },
    Upgraded {
        from: PackageReference,
        to: PackageReference,
    },
    Downgraded {
        from: PackageReference,
        to: PackageReference,
    },
    /// Version changed but cannot be ordered (ranges, incomparable text)
    Repinned {
        from: PackageReference,
        to: PackageReference,
    },
    /// Same version, different channel qualifier
    Requalified {
        name: String,
        from: Option<Channel>,
        to: Option<Channel>,
    },
    OptionAdded {
        option: OptionOverride,
    },
    OptionRemoved {
        option: OptionOverride,
    },
    OptionChanged {
        from: OptionOverride,
        to: OptionOverride,
    },
    MetadataChanged {
        field: String,
        from: Option<String>,
        to: Option<String>,
    },
}

impl Change {
    /// Package the change is about, if any
    pub fn package(&self) -> Option<&str> {
        match self {
            Change::Added { reference } | Change::Removed { reference } => Some(&reference.name),
            Change::Upgraded { to, .. }
            | Change::Downgraded { to, .. }
            | Change::Repinned { to, .. } => Some(&to.name),
            Change::Requalified { name, .. } => Some(name),
            Change::OptionAdded { option } | Change::OptionRemoved { option } => {
                option.package.as_deref()
            }
            Change::OptionChanged { to, .. } => to.package.as_deref(),
            Change::MetadataChanged { .. } => None,
        }
    }

    /// Whether the change moves a pin backwards
    pub fn is_violation(&self) -> bool {
        matches!(self, Change::Downgraded { .. })
    }

    /// One-character marker used in text output
    pub fn marker(&self) -> char {
        match self {
            Change::Added { .. } | Change::OptionAdded { .. } => '+',
            Change::Removed { .. } | Change::OptionRemoved { .. } => '-',
            Change::Downgraded { .. } => '!',
            _ => '~',
        }
    }
}

fn channel_label(channel: Option<&Channel>) -> String {
    channel.map_or_else(|| "no channel".to_string(), |c| format!("@{c}"))
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Added { reference } => write!(f, "added {reference}"),
            Change::Removed { reference } => write!(f, "removed {reference}"),
            Change::Upgraded { from, to } => {
                write!(f, "upgraded {} {} -> {}", to.name, from.version, to.version)
            }
            Change::Downgraded { from, to } => {
                write!(f, "downgraded {} {} -> {}", to.name, from.version, to.version)
            }
            Change::Repinned { from, to } => {
                write!(f, "repinned {} {} -> {}", to.name, from.version, to.version)
            }
            Change::Requalified { name, from, to } => write!(
                f,
                "requalified {name} {} -> {}",
                channel_label(from.as_ref()),
                channel_label(to.as_ref())
            ),
            Change::OptionAdded { option } => write!(f, "option added {option}"),
            Change::OptionRemoved { option } => write!(f, "option removed {option}"),
            Change::OptionChanged { from, to } => write!(
                f,
                "option {} {} -> {}",
                to.target_label(),
                from.value,
                to.value
            ),
            Change::MetadataChanged { field, from, to } => write!(
                f,
                "{field} {} -> {}",
                from.as_deref().unwrap_or("(unset)"),
                to.as_deref().unwrap_or("(unset)")
            ),
        }
    }
}

/// All changes from one revision to the next
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManifestDiff {
    pub changes: Vec<Change>,
}

impl ManifestDiff {
    /// Compare `old` to `new`
    pub fn between(old: &Manifest, new: &Manifest) -> Self {
        let mut changes = Vec::new();

        for (field, from, to) in [
            ("name", &old.name, &new.name),
            ("version", &old.version, &new.version),
        ] {
            if from != to {
                changes.push(Change::MetadataChanged {
                    field: field.to_string(),
                    from: from.clone(),
                    to: to.clone(),
                });
            }
        }

        diff_requirements(old, new, &mut changes);
        diff_options(&old.default_options, &new.default_options, &mut changes);

        Self { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Changes that move a pin backwards
    pub fn violations(&self) -> Vec<&Change> {
        self.changes.iter().filter(|c| c.is_violation()).collect()
    }
}

fn find<'a>(requirements: &[&'a Requirement], name: &str) -> Option<&'a Requirement> {
    requirements.iter().copied().find(|r| r.name() == name)
}

fn diff_requirements(old: &Manifest, new: &Manifest, changes: &mut Vec<Change>) {
    let old_reqs: Vec<&Requirement> = old.all_requirements().collect();
    let new_reqs: Vec<&Requirement> = new.all_requirements().collect();

    for requirement in &new_reqs {
        let to = &requirement.reference;
        let Some(previous) = find(&old_reqs, requirement.name()) else {
            changes.push(Change::Added {
                reference: to.clone(),
            });
            continue;
        };
        if let Some(change) = compare_pins(&previous.reference, to) {
            changes.push(change);
        }
    }

    for requirement in &old_reqs {
        if find(&new_reqs, requirement.name()).is_none() {
            changes.push(Change::Removed {
                reference: requirement.reference.clone(),
            });
        }
    }
}

/// Classify a pin change for the same package; `None` when unchanged
pub fn compare_pins(from: &PackageReference, to: &PackageReference) -> Option<Change> {
    if from.same_pin(to) {
        return None;
    }
    if from.version == to.version {
        return Some(Change::Requalified {
            name: to.name.clone(),
            from: from.channel.clone(),
            to: to.channel.clone(),
        });
    }
    let (from, to) = (from.clone(), to.clone());
    Some(match version::compare(&from.version, &to.version) {
        Some(Ordering::Less) => Change::Upgraded { from, to },
        Some(Ordering::Greater) => Change::Downgraded { from, to },
        // Equal after normalization (e.g. leading zeros) or unordered.
        _ => Change::Repinned { from, to },
    })
}

fn diff_options(old: &[OptionOverride], new: &[OptionOverride], changes: &mut Vec<Change>) {
    for option in new {
        match old.iter().find(|o| o.target() == option.target()) {
            None => changes.push(Change::OptionAdded {
                option: option.clone(),
            }),
            Some(previous) if previous.value != option.value => {
                changes.push(Change::OptionChanged {
                    from: previous.clone(),
                    to: option.clone(),
                });
            }
            Some(_) => {}
        }
    }
    for option in old {
        if !new.iter().any(|o| o.target() == option.target()) {
            changes.push(Change::OptionRemoved {
                option: option.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(version: &str, requires: &str, options: &str) -> Manifest {
        Manifest::parse(&format!(
            "class Engine(ConanFile):\n    name = 'engine'\n    version = '{version}'\n    requires = [{requires}]\n    default_options = [{options}]\n"
        ))
        .unwrap()
    }

    #[test]
    fn test_identical_manifests() {
        let m = manifest("0.1.0", "'glfw/3.3.4'", "");
        assert!(ManifestDiff::between(&m, &m).is_empty());
    }

    #[test]
    fn test_added_removed_upgraded() {
        let old = manifest("0.1.0", "'assimp/5.0.1', 'glfw/3.3.4'", "");
        let new = manifest("0.1.0", "'glfw/3.3.5', 'spdlog/1.8.5'", "");
        let diff = ManifestDiff::between(&old, &new);
        let text: Vec<String> = diff.changes.iter().map(ToString::to_string).collect();
        assert_eq!(
            text,
            vec![
                "upgraded glfw 3.3.4 -> 3.3.5",
                "added spdlog/1.8.5",
                "removed assimp/5.0.1",
            ]
        );
        assert!(diff.violations().is_empty());
    }

    #[test]
    fn test_downgrade_is_violation() {
        let old = manifest("0.1.0", "'entt/3.7.1'", "");
        let new = manifest("0.1.0", "'entt/3.6.0'", "");
        let diff = ManifestDiff::between(&old, &new);
        assert_eq!(diff.violations().len(), 1);
        assert_eq!(diff.changes[0].marker(), '!');
        assert_eq!(diff.changes[0].package(), Some("entt"));
    }

    #[test]
    fn test_requalified_channel() {
        let old = manifest("0.1.0", "'glad/0.1.34'", "");
        let new = manifest("0.1.0", "'glad/0.1.34@snv/stable'", "");
        let diff = ManifestDiff::between(&old, &new);
        assert_eq!(
            diff.changes[0].to_string(),
            "requalified glad no channel -> @snv/stable"
        );
    }

    #[test]
    fn test_range_is_repinned() {
        let old = manifest("0.1.0", "'entt/3.7.1'", "");
        let new = manifest("0.1.0", "'entt/[>=3.7 <4]'", "");
        let diff = ManifestDiff::between(&old, &new);
        assert!(matches!(diff.changes[0], Change::Repinned { .. }));
        assert!(diff.violations().is_empty());
    }

    #[test]
    fn test_option_changes() {
        let old = manifest("0.1.0", "'glad/0.1.34'", "'glad:gl_version=3.3', 'glad:spec=gl'");
        let new = manifest("0.1.0", "'glad/0.1.34'", "'glad:gl_version=4.6', 'glad:gl_profile=core'");
        let diff = ManifestDiff::between(&old, &new);
        let text: Vec<String> = diff.changes.iter().map(ToString::to_string).collect();
        assert_eq!(
            text,
            vec![
                "option glad:gl_version 3.3 -> 4.6",
                "option added glad:gl_profile=core",
                "option removed glad:spec=gl",
            ]
        );
    }

    #[test]
    fn test_metadata_change() {
        let old = manifest("0.1.0", "", "");
        let new = manifest("0.2.0", "", "");
        let diff = ManifestDiff::between(&old, &new);
        assert_eq!(diff.changes[0].to_string(), "version 0.1.0 -> 0.2.0");
        assert_eq!(diff.changes[0].package(), None);
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let old = manifest("0.1.0", "", "");
        let new = manifest("0.1.0", "'glm/0.9.9.8'", "");
        let json = serde_json::to_value(ManifestDiff::between(&old, &new)).unwrap();
        assert_eq!(json["changes"][0]["kind"], "added");
        assert_eq!(json["changes"][0]["reference"], "glm/0.9.9.8");
    }
}
