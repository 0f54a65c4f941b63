mod commands;
mod logging;
mod progress;

use std::path::Path;
use std::process::ExitCode;
use std::thread;

use clap::Parser;
use colored::*;
use commands::Cli;
use dotenv::dotenv;
use folder_sort_core::{
    AppConfig, ClassificationOracle, Error, ExtensionOracle, GeminiOracle, Organizer, Phase,
};
use progress::CliReporter;
use tracing::{error, info};

fn main() -> ExitCode {
    dotenv().ok();

    let logger = logging::init_logger();

    let args = Cli::parse();

    let mut config = match folder_sort_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }

    let oracle: Box<dyn ClassificationOracle> = if args.offline {
        info!("Offline mode: classifying by extension");
        Box::new(ExtensionOracle)
    } else {
        match GeminiOracle::new(&config.oracle) {
            Ok(oracle) => Box::new(oracle),
            Err(err) => {
                error!("Error creating classifier: {}", err);
                return ExitCode::FAILURE;
            }
        }
    };

    match run_organize(&args.root, &config, oracle.as_ref(), &logger.path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err @ Error::InvalidRoot(_)) => {
            error!("Error: {}", err);
            ExitCode::FAILURE
        }
        Err(err) => {
            error!("Error: {}", err);
            ExitCode::SUCCESS
        }
    }
}

/// Run the organizer on a worker thread so the terminal stays responsive.
fn run_organize(
    root: &Path,
    config: &AppConfig,
    oracle: &dyn ClassificationOracle,
    log_path: &Path,
) -> Result<(), Error> {
    let organizer = Organizer::new(config).with_excluded_path(log_path);
    let reporter = CliReporter::new();

    let result = thread::scope(|scope| {
        scope
            .spawn(|| organizer.run(root, oracle, &reporter))
            .join()
            .unwrap_or_else(|_| Err(Error::Other("organizer thread panicked".to_string())))
    });
    let report = result?;

    let phase = match report.phase {
        Phase::Complete => report.phase.to_string().green(),
        _ => report.phase.to_string().yellow(),
    };
    info!(
        "Run {}: {} files, {} folders found",
        phase,
        format!("{}", report.files_found).cyan(),
        format!("{}", report.folders_found).cyan(),
    );
    info!(
        "{} moved, {} skipped, {} failed, {} failed batches",
        format!("{}", report.moved()).green(),
        format!("{}", report.skipped()).yellow(),
        format!("{}", report.failed()).red(),
        format!("{}", report.failed_batches).red(),
    );
    info!(
        "Scan: {}, Classify: {}, Move: {}",
        format!("{:.2}s", report.scan_duration.as_secs_f64()).green(),
        format!("{:.2}s", report.classify_duration.as_secs_f64()).green(),
        format!("{:.2}s", report.move_duration.as_secs_f64()).green(),
    );

    Ok(())
}
