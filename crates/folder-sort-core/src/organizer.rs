use crate::batcher;
use crate::config::AppConfig;
use crate::error::Error;
use crate::executor;
use crate::log::{LogSink, TracingLog};
use crate::model::{
    Classification, Item, ItemLocations, OutcomeStatus, Phase, RelocationOutcome, RunProgress,
};
use crate::oracle::ClassificationOracle;
use crate::progress::ProgressReporter;
use crate::sanitize::sanitize;
use crate::scanner::{self, ScanResult};
use std::collections::HashSet;
use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

pub const REASON_DUPLICATE: &str = "duplicate classification";

/// Shared view of a run for a supervising thread: cancellation requests in,
/// progress snapshots out.
#[derive(Debug, Clone, Default)]
pub struct RunHandle {
    cancel: Arc<AtomicBool>,
    progress: Arc<Mutex<RunProgress>>,
}

impl RunHandle {
    /// Ask the run to stop at its next checkpoint.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Latest snapshot. While the run is live, `cancelled` mirrors a pending
    /// cancel request.
    pub fn progress(&self) -> RunProgress {
        let mut progress = *self.lock();
        if !progress.phase.is_terminal() {
            progress.cancelled = self.is_cancelled();
        }
        progress
    }

    fn lock(&self) -> MutexGuard<'_, RunProgress> {
        self.progress
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Clears the snapshot for a new run. A cancel requested before the run
    /// started is kept and honoured at the first checkpoint.
    fn reset(&self) {
        let mut progress = self.lock();
        *progress = RunProgress {
            cancelled: self.is_cancelled(),
            ..RunProgress::default()
        };
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub phase: Phase,
    pub files_found: usize,
    pub folders_found: usize,
    pub failed_batches: usize,
    pub outcomes: Vec<RelocationOutcome>,
    pub scan_duration: Duration,
    pub classify_duration: Duration,
    pub move_duration: Duration,
}

impl RunReport {
    fn new() -> Self {
        Self {
            phase: Phase::Idle,
            files_found: 0,
            folders_found: 0,
            failed_batches: 0,
            outcomes: Vec::new(),
            scan_duration: Duration::ZERO,
            classify_duration: Duration::ZERO,
            move_duration: Duration::ZERO,
        }
    }

    fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn moved(&self) -> usize {
        self.count(OutcomeStatus::Success)
    }

    pub fn skipped(&self) -> usize {
        self.count(OutcomeStatus::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(OutcomeStatus::Failed)
    }
}

/// Drives scan → classify files → move files → classify folders → move folders.
pub struct Organizer {
    batch_size: usize,
    handle: RunHandle,
    log: Arc<dyn LogSink>,
    excluded: Vec<PathBuf>,
}

impl Organizer {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            batch_size: config.effective_batch_size(),
            handle: RunHandle::default(),
            log: Arc::new(TracingLog),
            excluded: Vec::new(),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_log_sink(mut self, log: Arc<dyn LogSink>) -> Self {
        self.log = log;
        self
    }

    /// Never scan or move `path`, e.g. a log file the caller is writing to.
    pub fn with_excluded_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.excluded.push(path.into());
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Handle for cancelling and observing the run from another thread.
    pub fn handle(&self) -> RunHandle {
        self.handle.clone()
    }

    /// Run the whole pipeline on `root`.
    ///
    /// Only an unusable root aborts with an error; per-batch and per-item
    /// failures are logged and recorded in the report. The cancellation flag
    /// is polled before each phase, after each batch and before each move, and
    /// consumed when the run ends.
    pub fn run(
        &self,
        root: &Path,
        oracle: &dyn ClassificationOracle,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunReport, Error> {
        self.handle.reset();
        let mut run = RunState {
            handle: &self.handle,
            reporter,
            oracle,
            total_units: 0,
            done_units: 0,
        };
        let mut report = RunReport::new();

        run.enter(Phase::Scanning);
        self.log.info(&format!("Scanning {} recursively...", root.display()));
        let scan_start = Instant::now();
        let (root, scan) =
            match resolve_root(root).and_then(|root| {
                let excluded = self.excluded_paths();
                Ok((scanner::scan_excluding(&root, &excluded)?, root))
            }) {
                Ok((scan, root)) => (root, scan),
                Err(err) => {
                    self.log.error(&err.to_string());
                    run.finish(Phase::Failed);
                    return Err(err);
                }
            };
        report.scan_duration = scan_start.elapsed();
        report.files_found = scan.files.len();
        report.folders_found = scan.folders.len();
        self.log.info(&format!(
            "Found {} files and {} folders to process.",
            scan.files.len(),
            scan.folders.len()
        ));

        if scan.is_empty() {
            self.log.info("Nothing to organize.");
            report.phase = run.finish(Phase::Complete);
            return Ok(report);
        }
        run.total_units = 2 * scan.total();

        let passes = [
            (&scan.files, Phase::ClassifyingFiles, Phase::MovingFiles),
            (&scan.folders, Phase::ClassifyingFolders, Phase::MovingFolders),
        ];
        for (items, classify_phase, move_phase) in passes {
            if run.cancelled()
                || !self.pass(&mut run, &mut report, &root, &scan, items, (classify_phase, move_phase))
            {
                return Ok(self.stop_cancelled(&mut run, report));
            }
        }
        if run.cancelled() {
            return Ok(self.stop_cancelled(&mut run, report));
        }

        report.phase = run.finish(Phase::Complete);
        self.log.info(&format!(
            "Organization complete: {} moved, {} skipped, {} failed.",
            report.moved(),
            report.skipped(),
            report.failed()
        ));
        Ok(report)
    }

    fn excluded_paths(&self) -> Vec<PathBuf> {
        self.excluded
            .iter()
            .map(|path| fs::canonicalize(path).unwrap_or_else(|_| path.clone()))
            .collect()
    }

    fn stop_cancelled(&self, run: &mut RunState<'_>, mut report: RunReport) -> RunReport {
        report.phase = run.finish(Phase::Cancelled);
        self.log.info("Organization cancelled.");
        report
    }

    /// Classify then move one kind of item. Returns `false` when cancelled.
    fn pass(
        &self,
        run: &mut RunState<'_>,
        report: &mut RunReport,
        root: &Path,
        scan: &ScanResult,
        items: &[Item],
        (classify_phase, move_phase): (Phase, Phase),
    ) -> bool {
        run.enter(classify_phase);
        if items.is_empty() {
            run.enter(move_phase);
            return true;
        }

        self.log.info(&format!(
            "Sending {} items for categorization in batches of {}...",
            items.len(),
            self.batch_size
        ));
        let classify_start = Instant::now();
        let base = run.done_units;
        let oracle = run.oracle;
        let classified = batcher::classify(items, self.batch_size, oracle, |processed, total| {
            run.set_units(base + processed);
            run.reporter.on_batch(classify_phase, processed, total);
            if run.cancelled() {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        report.classify_duration += classify_start.elapsed();
        report.failed_batches += classified.failed_batches;

        if classified.cancelled || run.cancelled() {
            return false;
        }
        if classified.classifications.is_empty() {
            self.log.error(&format!("Could not categorize {}.", phase_noun(classify_phase)));
        }

        run.enter(move_phase);
        let move_start = Instant::now();
        let locations = phase_locations(items, &scan.locations);
        let completed = self.move_all(run, report, root, &classified.classifications, &locations);
        report.move_duration += move_start.elapsed();
        completed
    }

    /// Relocate every classification of one pass. Each attempt is one unit of
    /// the pass's share, capped at the pass's item count.
    fn move_all(
        &self,
        run: &mut RunState<'_>,
        report: &mut RunReport,
        root: &Path,
        classifications: &[Classification],
        locations: &ItemLocations,
    ) -> bool {
        let base = run.done_units;
        let share = locations.len();
        let mut attempted: HashSet<u64> = HashSet::new();

        for (index, classification) in classifications.iter().enumerate() {
            if run.cancelled() {
                return false;
            }

            let outcome = if attempted.insert(classification.id) {
                executor::relocate(root, classification, locations)
            } else {
                let source = locations.get(&classification.id).cloned().unwrap_or_default();
                RelocationOutcome::skipped(
                    source,
                    PathBuf::new(),
                    sanitize(&classification.category),
                    REASON_DUPLICATE,
                )
            };
            self.log_outcome(classification, &outcome);
            run.reporter.on_outcome(&outcome);
            report.outcomes.push(outcome);
            run.set_units(base + (index + 1).min(share));
        }

        run.set_units(base + share);
        true
    }

    fn log_outcome(&self, classification: &Classification, outcome: &RelocationOutcome) {
        let record = serde_json::to_string(outcome).unwrap_or_else(|_| format!("{:?}", outcome));
        match outcome.status {
            OutcomeStatus::Success => {
                self.log.info(&format!(
                    "'{}' -> Category: '{}'",
                    classification.name, outcome.category
                ));
                self.log.info(&record);
            }
            OutcomeStatus::Skipped | OutcomeStatus::Failed => self.log.error(&record),
        }
    }
}

fn resolve_root(root: &Path) -> Result<PathBuf, Error> {
    if !root.is_dir() {
        return Err(Error::InvalidRoot(root.to_path_buf()));
    }
    Ok(fs::canonicalize(root)?)
}

/// Restrict lookups to the ids of the current pass so a stray folder id in a
/// file batch is treated as unknown.
fn phase_locations(items: &[Item], all: &ItemLocations) -> ItemLocations {
    items
        .iter()
        .filter_map(|item| all.get(&item.id).map(|path| (item.id, path.clone())))
        .collect()
}

fn phase_noun(phase: Phase) -> &'static str {
    match phase {
        Phase::ClassifyingFolders => "folders",
        _ => "files",
    }
}

/// Per-run progress bookkeeping. Work is two units per item: one for
/// classification, one for the move.
struct RunState<'a> {
    handle: &'a RunHandle,
    reporter: &'a dyn ProgressReporter,
    oracle: &'a dyn ClassificationOracle,
    total_units: usize,
    done_units: usize,
}

impl RunState<'_> {
    fn cancelled(&self) -> bool {
        self.handle.is_cancelled()
    }

    fn enter(&mut self, phase: Phase) {
        debug!("Entering phase {}", phase);
        let snapshot = {
            let mut progress = self.handle.lock();
            progress.phase = phase;
            progress.cancelled = self.cancelled();
            *progress
        };
        self.reporter.on_phase(phase);
        self.reporter.on_progress(&snapshot);
    }

    fn set_units(&mut self, units: usize) {
        if units <= self.done_units || self.total_units == 0 {
            return;
        }
        self.done_units = units.min(self.total_units);
        // 100 is reserved for Complete.
        let percent = (self.done_units * 100 / self.total_units).min(99) as u8;
        let snapshot = {
            let mut progress = self.handle.lock();
            if percent <= progress.percent {
                return;
            }
            progress.percent = percent;
            progress.cancelled = self.cancelled();
            *progress
        };
        self.reporter.on_progress(&snapshot);
    }

    fn finish(&mut self, phase: Phase) -> Phase {
        let snapshot = {
            let mut progress = self.handle.lock();
            progress.phase = phase;
            progress.cancelled = phase == Phase::Cancelled;
            if phase == Phase::Complete {
                progress.percent = 100;
            }
            *progress
        };
        // The request has been answered; the next run starts uncancelled.
        self.handle.cancel.store(false, Ordering::Relaxed);
        self.reporter.on_phase(phase);
        self.reporter.on_progress(&snapshot);
        phase
    }
}
