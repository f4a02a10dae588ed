//! UI/Progress presentation layer
//!
//! This module handles:
//! - Progress reporting while walking git history
//! - Styled text rendering of manifests, findings, diffs and histories
//!
//! All progress reporting goes through the ProgressReporter trait so that
//! non-terminal runs stay silent.

pub mod display;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter trait for long-running operations
pub trait ProgressReporter {
    /// Clear the progress display
    fn finish(&self);
}

/// Interactive spinner shown on stderr
pub struct SpinnerReporter {
    spinner: ProgressBar,
}

impl SpinnerReporter {
    pub fn new(message: &str) -> Self {
        let spinner = ProgressBar::new_spinner();
        // The template is a literal; fall back to the default style if it is rejected.
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        Self { spinner }
    }
}

impl ProgressReporter for SpinnerReporter {
    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

/// No-op reporter for non-interactive runs
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn finish(&self) {}
}

/// Spinner when stderr is a terminal, silence otherwise
pub fn reporter(message: &str) -> Box<dyn ProgressReporter> {
    if console::Term::stderr().is_term() {
        Box::new(SpinnerReporter::new(message))
    } else {
        Box::new(SilentReporter)
    }
}
