use crate::model::{Classification, Item};
use crate::oracle::ClassificationOracle;
use std::ops::ControlFlow;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, info, warn};

/// Aggregated oracle output for one classification pass.
#[derive(Debug, Default)]
pub struct Classified {
    /// Batch order, oracle order within a batch. Ids are not validated here.
    pub classifications: Vec<Classification>,
    pub batches_run: usize,
    pub failed_batches: usize,
    /// The progress sink asked to stop before every batch had been sent.
    pub cancelled: bool,
}

/// Classify `items` in consecutive batches of at most `batch_size`, calling the
/// oracle once per batch. After each batch `progress(processed, total)` is
/// called; returning `ControlFlow::Break` stops before the next batch.
///
/// A batch whose oracle call errors, panics or returns nothing counts as
/// failed and contributes no results.
pub fn classify<O, P>(items: &[Item], batch_size: usize, oracle: &O, mut progress: P) -> Classified
where
    O: ClassificationOracle + ?Sized,
    P: FnMut(usize, usize) -> ControlFlow<()>,
{
    let mut classified = Classified::default();
    if items.is_empty() {
        return classified;
    }

    let batch_size = batch_size.max(1);
    let total = items.len();
    let batch_count = total.div_ceil(batch_size);
    let mut processed = 0usize;

    for (index, batch) in items.chunks(batch_size).enumerate() {
        info!("Processing batch {}/{}...", index + 1, batch_count);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| oracle.classify(batch)));
        classified.batches_run += 1;
        match outcome {
            Ok(Ok(results)) if !results.is_empty() => {
                debug!("Batch {} returned {} results", index + 1, results.len());
                classified.classifications.extend(results);
            }
            Ok(Ok(_)) => {
                warn!("Batch {} returned no results", index + 1);
                classified.failed_batches += 1;
            }
            Ok(Err(err)) => {
                error!("Error during batch categorization: {}", err);
                classified.failed_batches += 1;
            }
            Err(_) => {
                error!("Oracle panicked while classifying batch {}", index + 1);
                classified.failed_batches += 1;
            }
        }

        processed += batch.len();
        if progress(processed, total).is_break() {
            classified.cancelled = processed < total;
            break;
        }
    }

    if classified.classifications.is_empty() {
        error!("Batch categorization failed or returned empty results.");
    }

    classified
}
