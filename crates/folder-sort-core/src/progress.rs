use crate::model::{Phase, RelocationOutcome, RunProgress};

/// Trait for reporting run progress.
///
/// CLI implements with indicatif; tests record calls or flip the cancel flag.
/// All methods have default no-op implementations and may be called often.
pub trait ProgressReporter: Send + Sync {
    fn on_phase(&self, _phase: Phase) {}
    fn on_progress(&self, _progress: &RunProgress) {}
    fn on_batch(&self, _phase: Phase, _processed: usize, _total: usize) {}
    fn on_outcome(&self, _outcome: &RelocationOutcome) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
