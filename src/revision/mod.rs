//! Comparing manifest revisions
//!
//! - [`version`]: loose ordering of pinned versions
//! - [`diff`]: changes between two manifests
//! - [`history`]: an ordered sequence of revisions and its invariants

pub mod diff;
pub mod history;
pub mod version;

pub use diff::{Change, ManifestDiff};
pub use history::{ManifestHistory, Revision, Violation};
