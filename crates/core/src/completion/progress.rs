//! Progress callbacks for completion runs

/// Receives progress events from the completion engine
///
/// All methods default to doing nothing so implementors pick what they
/// display.
pub trait CompletionProgress: Send + Sync {
    /// Called once with the planned batch and row counts
    fn started(&self, _batches: usize, _rows: usize) {}

    /// Called before a batch is submitted
    fn batch_started(&self, _batch: usize, _records: &[usize]) {}

    /// Called when a failed call is retried
    fn retrying(&self, _batch: usize, _reason: &str) {}

    /// Called after a batch is merged or skipped
    fn batch_finished(&self, _batch: usize, _applied: usize, _skipped: usize) {}

    /// Called once at the end
    fn finished(&self, _applied: usize, _skipped: usize, _unprocessed: usize) {}
}

/// Progress sink that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl CompletionProgress for NoProgress {}
