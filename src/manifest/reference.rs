//! Package references
//!
//! A reference pins one third-party package: `name/version`, optionally
//! qualified with a distribution channel as `name/version@user/channel`.
//! A trailing `#revision` is carried along verbatim.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PinledgerError, Result, reference};

const MIN_NAME_LEN: usize = 2;
const MAX_NAME_LEN: usize = 101;

/// Distribution channel qualifier (`@user/channel`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Channel {
    pub user: String,
    pub channel: String,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user, self.channel)
    }
}

/// A pinned package: (name, version, optional channel)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageReference {
    pub name: String,
    pub version: String,
    pub channel: Option<Channel>,
    pub revision: Option<String>,
}

impl PackageReference {
    /// Build a reference without validation, for tests and fixtures
    #[cfg(test)]
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            channel: None,
            revision: None,
        }
    }

    /// Parse a reference from its text form
    pub fn parse(input: &str) -> Result<Self> {
        let text = input.trim();
        if text.is_empty() {
            return Err(reference::invalid(input, "reference is empty"));
        }

        let (text, revision) = match text.split_once('#') {
            Some((head, rev)) => {
                if rev.is_empty() || !rev.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(reference::invalid(input, "revision must be alphanumeric"));
                }
                (head, Some(rev.to_string()))
            }
            None => (text, None),
        };

        let (package, qualifier) = match text.split_once('@') {
            Some((package, qualifier)) => (package, Some(qualifier)),
            None => (text, None),
        };

        let Some((name, version)) = package.split_once('/') else {
            return Err(reference::invalid(
                input,
                "missing '/' between name and version",
            ));
        };

        validate_name(input, name)?;
        validate_version(input, version)?;
        let channel = qualifier
            .map(|q| parse_channel(input, q))
            .transpose()?
            .flatten();

        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
            channel,
            revision,
        })
    }

    /// Whether the version is a range expression rather than an exact pin
    pub fn is_range(&self) -> bool {
        self.version.starts_with('[') && self.version.ends_with(']')
    }

    /// Same package, version and channel (revision ignored)
    pub fn same_pin(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version && self.channel == other.channel
    }
}

impl fmt::Display for PackageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)?;
        if let Some(channel) = &self.channel {
            write!(f, "@{channel}")?;
        }
        if let Some(revision) = &self.revision {
            write!(f, "#{revision}")?;
        }
        Ok(())
    }
}

impl FromStr for PackageReference {
    type Err = PinledgerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for PackageReference {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PackageReference {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '+' | '.' | '-')
}

fn validate_name(input: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(reference::invalid(input, "package name is empty"));
    }
    let len = name.chars().count();
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
        return Err(reference::invalid(
            input,
            format!("package name must be {MIN_NAME_LEN} to {MAX_NAME_LEN} characters"),
        ));
    }
    if name.starts_with(['.', '-', '+']) {
        return Err(reference::invalid(
            input,
            format!("package name '{name}' must start with a letter, digit or '_'"),
        ));
    }
    if let Some(bad) = name.chars().find(|c| !is_name_char(*c)) {
        return Err(reference::invalid(
            input,
            format!("invalid character '{bad}' in package name '{name}'"),
        ));
    }
    Ok(())
}

fn validate_version(input: &str, version: &str) -> Result<()> {
    if version.is_empty() {
        return Err(reference::invalid(input, "version is empty"));
    }
    // Ranges are opaque; only require they are bracketed.
    if version.starts_with('[') {
        if !version.ends_with(']') || version.len() < 3 {
            return Err(reference::invalid(input, "unterminated version range"));
        }
        return Ok(());
    }
    if let Some(bad) = version
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '.' | '-')))
    {
        return Err(reference::invalid(
            input,
            format!("invalid character '{bad}' in version '{version}'"),
        ));
    }
    Ok(())
}

/// Parse the part after `@`. `_/_` is the "no channel" placeholder.
fn parse_channel(input: &str, qualifier: &str) -> Result<Option<Channel>> {
    if qualifier.is_empty() {
        return Err(reference::invalid(input, "dangling '@' without user/channel"));
    }
    let Some((user, channel)) = qualifier.split_once('/') else {
        return Err(reference::invalid(
            input,
            format!("missing channel after user '{qualifier}'"),
        ));
    };
    if user == "_" && channel == "_" {
        return Ok(None);
    }
    for (what, part) in [("user", user), ("channel", channel)] {
        if part.is_empty() {
            return Err(reference::invalid(input, format!("{what} is empty")));
        }
        if let Some(bad) = part
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '.' | '-')))
        {
            return Err(reference::invalid(
                input,
                format!("invalid character '{bad}' in {what} '{part}'"),
            ));
        }
    }
    Ok(Some(Channel {
        user: user.to_string(),
        channel: channel.to_string(),
    }))
}
