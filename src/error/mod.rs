//! Error types and handling for pinledger
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`reference`]: Package reference and option override errors
//! - [`manifest`]: Manifest parsing errors
//! - [`git`]: Git history errors
//! - [`lockfile`]: Pin lock errors
//! - [`config`]: Tool configuration errors
//! - [`fs`]: File system errors
//! - [`lint`]: Lint and revision invariant failures

pub mod config;
pub mod fs;
pub mod git;
pub mod lint;
pub mod lockfile;
mod macros;
pub mod manifest;
pub mod reference;

pub(crate) use macros::impl_error_constructors;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for pinledger operations
#[derive(Error, Diagnostic, Debug)]
pub enum PinledgerError {
    // Reference errors
    #[error("Invalid package reference '{input}': {reason}")]
    #[diagnostic(
        code(pinledger::reference::invalid),
        help("References look like name/version or name/version@user/channel")
    )]
    InvalidReference { input: String, reason: String },

    #[error("Invalid option override '{input}': {reason}")]
    #[diagnostic(
        code(pinledger::reference::invalid_option),
        help("Option overrides look like package:key=value")
    )]
    InvalidOption { input: String, reason: String },

    // Manifest errors
    #[error("Failed to parse {origin}:{line}:{column}: {reason}")]
    #[diagnostic(code(pinledger::manifest::parse_failed))]
    ManifestParse {
        origin: String,
        line: usize,
        column: usize,
        reason: String,
    },

    #[error("No recipe class found in {origin}")]
    #[diagnostic(
        code(pinledger::manifest::no_recipe_class),
        help("The manifest must declare a class deriving from ConanFile")
    )]
    NoRecipeClass { origin: String },

    #[error("Invalid value for '{attribute}' at {origin}:{line}: {reason}")]
    #[diagnostic(code(pinledger::manifest::invalid_attribute))]
    InvalidAttribute {
        origin: String,
        attribute: String,
        line: usize,
        reason: String,
    },

    #[error("Manifest not found: {path}")]
    #[diagnostic(
        code(pinledger::manifest::not_found),
        help("Pass the manifest path explicitly or set PINLEDGER_MANIFEST")
    )]
    ManifestNotFound { path: String },

    // Git errors
    #[error("Git operation failed: {message}")]
    #[diagnostic(code(pinledger::git::operation_failed))]
    GitOperationFailed { message: String },

    #[error("Failed to open repository at '{path}': {reason}")]
    #[diagnostic(
        code(pinledger::git::open_failed),
        help("History commands must be run on a manifest inside a git repository")
    )]
    GitOpenFailed { path: String, reason: String },

    #[error("Failed to resolve revision '{revision}': {reason}")]
    #[diagnostic(code(pinledger::git::revision_not_found))]
    GitRevisionNotFound { revision: String, reason: String },

    #[error("'{path}' does not exist in revision {revision}")]
    #[diagnostic(code(pinledger::git::manifest_not_in_revision))]
    ManifestNotInRevision { revision: String, path: String },

    #[error("No committed revisions of {path} found")]
    #[diagnostic(
        code(pinledger::git::history_empty),
        help("Commit the manifest at least once before inspecting its history")
    )]
    HistoryEmpty { path: String },

    // Lockfile errors
    #[error("Pin lock is out of date: {reason}")]
    #[diagnostic(
        code(pinledger::lockfile::outdated),
        help("Run 'pinledger lock' without --frozen to update the pin lock")
    )]
    LockOutdated { reason: String },

    #[error("Pin lock is missing: {path}")]
    #[diagnostic(
        code(pinledger::lockfile::missing),
        help("Run 'pinledger lock' to record the current pins")
    )]
    LockMissing { path: String },

    #[error("Failed to parse pin lock: {path}")]
    #[diagnostic(code(pinledger::lockfile::parse_failed))]
    LockParseFailed { path: String, reason: String },

    // Configuration errors
    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(pinledger::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}")]
    #[diagnostic(code(pinledger::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(pinledger::config::invalid))]
    ConfigInvalid { message: String },

    // Check results
    #[error("{count} lint finding(s) at deny level")]
    #[diagnostic(
        code(pinledger::lint::denied),
        help("Fix the findings above or lower their level in .pinledger.yaml")
    )]
    LintFailed { count: usize },

    #[error("{count} pin(s) moved backwards across revisions")]
    #[diagnostic(
        code(pinledger::lint::violations),
        help("Versions should only move forward or be removed entirely")
    )]
    InvariantViolations { count: usize },

    // File system errors
    #[error("Failed to read file: {path}")]
    #[diagnostic(code(pinledger::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(pinledger::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(pinledger::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for PinledgerError {
    fn from(err: std::io::Error) -> Self {
        PinledgerError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for PinledgerError {
    fn from(err: serde_yaml::Error) -> Self {
        PinledgerError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PinledgerError {
    fn from(err: serde_json::Error) -> Self {
        PinledgerError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<git2::Error> for PinledgerError {
    fn from(err: git2::Error) -> Self {
        PinledgerError::GitOperationFailed {
            message: err.message().to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, PinledgerError>;
