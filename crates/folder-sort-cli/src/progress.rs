use folder_sort_core::{Phase, ProgressReporter, RunProgress};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// CLI progress reporter: one 0–100 bar for the whole run, labelled with the
/// current phase.
pub struct CliReporter {
    bar: ProgressBar,
}

impl CliReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} [{bar:30.cyan/dim}] {pos:>3}% {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━╸─")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }
}

impl ProgressReporter for CliReporter {
    fn on_phase(&self, phase: Phase) {
        if phase.is_terminal() {
            self.bar.finish_and_clear();
        } else {
            self.bar.set_message(phase.label());
        }
    }

    fn on_progress(&self, progress: &RunProgress) {
        self.bar.set_position(u64::from(progress.percent));
    }

    fn on_batch(&self, phase: Phase, processed: usize, total: usize) {
        self.bar
            .set_message(format!("{} ({}/{})", phase.label(), processed, total));
    }
}
