//! Spinner display for exports running in the batch context

use crate::io::configuration::PROGRESS_TICK_MS;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::LazyLock;
use std::time::Duration;

/// One spinner per export, stacked in submission order
pub struct ProgressManager {
    multi_progress: MultiProgress,
    bars: Vec<ProgressBar>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

static SPINNER_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {prefix:.bold} {msg} [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
});

static DONE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_spinner()
        .template("  {prefix:.bold} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
});

impl ProgressManager {
    /// Create an empty display
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            bars: Vec::new(),
        }
    }

    /// Add a spinner for a starting export and return its index
    pub fn start(&mut self, label: &str, message: &str) -> usize {
        let bar = self.multi_progress.add(ProgressBar::new_spinner());
        bar.set_style(SPINNER_STYLE.clone());
        bar.set_prefix(label.to_string());
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
        self.bars.push(bar);
        self.bars.len() - 1
    }

    /// Mark an export as written
    pub fn complete(&self, index: usize, message: &str) {
        self.settle(index, format!("✓ {message}"));
    }

    /// Mark an export as failed
    pub fn fail(&self, index: usize, message: &str) {
        self.settle(index, format!("✗ {message}"));
    }

    /// Remove every spinner from the terminal
    pub fn finish(&self) {
        let _ = self.multi_progress.clear();
    }

    fn settle(&self, index: usize, message: String) {
        if let Some(bar) = self.bars.get(index) {
            bar.set_style(DONE_STYLE.clone());
            bar.finish_with_message(message);
        }
    }
}
