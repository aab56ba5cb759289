//! Terminal progress for completion batches

use std::time::Duration;

use bom_reconcile_core::completion::CompletionProgress;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress bar over completion batches with a spinner for the current batch
pub struct BatchProgress {
    multi: MultiProgress,
    batches_bar: ProgressBar,
    status_bar: ProgressBar,
}

impl BatchProgress {
    /// Create a progress reporter; hidden when `quiet` is set
    pub fn new(quiet: bool) -> Self {
        if quiet {
            return Self::hidden();
        }

        let multi = MultiProgress::new();

        let batches_bar = multi.add(ProgressBar::new(0));
        batches_bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>4}/{len:4} batches {msg}",
            )
            .unwrap()
            .progress_chars("█▓▒░  "),
        );

        let status_bar = multi.add(ProgressBar::new_spinner());
        status_bar.set_style(ProgressStyle::with_template("{spinner:.yellow} {msg}").unwrap());
        status_bar.set_message("Waiting for inference service");

        Self {
            multi,
            batches_bar,
            status_bar,
        }
    }

    fn hidden() -> Self {
        Self {
            multi: MultiProgress::new(),
            batches_bar: ProgressBar::hidden(),
            status_bar: ProgressBar::hidden(),
        }
    }

    /// Report a warning above the bars
    pub fn warn(&self, msg: &str) {
        if !self.batches_bar.is_hidden() {
            let _ = self.multi.println(format!("  ⚠ Warning: {}", msg));
        }
    }
}

impl CompletionProgress for BatchProgress {
    fn started(&self, batches: usize, rows: usize) {
        self.batches_bar.set_length(batches as u64);
        self.batches_bar.set_message(format!("({rows} rows)"));
        self.batches_bar.enable_steady_tick(Duration::from_millis(100));
        self.status_bar.enable_steady_tick(Duration::from_millis(100));
    }

    fn batch_started(&self, batch: usize, records: &[usize]) {
        let rows: Vec<String> = records.iter().map(|r| r.to_string()).collect();
        self.status_bar
            .set_message(format!("Batch {}: rows {}", batch + 1, rows.join(", ")));
    }

    fn retrying(&self, batch: usize, reason: &str) {
        self.batches_bar
            .println(format!("  ↻ Batch {} retrying: {}", batch + 1, reason));
    }

    fn batch_finished(&self, batch: usize, applied: usize, skipped: usize) {
        if applied == 0 && skipped > 0 {
            self.batches_bar.println(format!(
                "  ⊘ Batch {}: {} field(s) skipped",
                batch + 1,
                skipped
            ));
        }
        self.batches_bar.inc(1);
    }

    fn finished(&self, applied: usize, skipped: usize, unprocessed: usize) {
        let mut msg = format!("✓ {applied} filled, {skipped} skipped");
        if unprocessed > 0 {
            msg.push_str(&format!(", {unprocessed} row(s) over budget"));
        }
        self.batches_bar.finish_with_message(msg);
        self.status_bar.finish_and_clear();
    }
}
