//! Progress reporting for the batch loop

use indicatif::{ProgressBar, ProgressStyle};
use super::{FileOutcome, ResultTable};

/// Observer of batch progress. All methods default to doing nothing.
pub trait ProgressReporter {
    fn start(&mut self, _total: usize) {}
    fn file_done(&mut self, _outcome: &FileOutcome) {}
    fn finish(&mut self, _table: &ResultTable) {}
}

/// Reports nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}

/// Terminal progress bar, one tick per file
#[derive(Debug)]
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::hidden();
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        Self { bar }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for BarProgress {
    fn start(&mut self, total: usize) {
        self.bar = ProgressBar::new(total as u64).with_style(self.bar.style());
    }

    fn file_done(&mut self, outcome: &FileOutcome) {
        self.bar.set_message(format!("{} ({})", outcome.relative_path.display(), outcome.record.result));
        self.bar.inc(1);
    }

    fn finish(&mut self, table: &ResultTable) {
        self.bar.finish_with_message(format!("{} file(s) processed", table.len()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_methods_are_noops() {
        let mut progress = NoProgress;
        progress.start(3);
        progress.finish(&ResultTable::new());
    }

    #[test]
    fn test_bar_progress_lifecycle() {
        let mut progress = BarProgress::new();
        progress.start(0);
        progress.finish(&ResultTable::new());
        assert!(progress.bar.is_finished());
    }
}
