use directories::ProjectDirs;
use std::env;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_NAME: &str = "folder-sort.log";

/// Keeps the file writer flushing until dropped.
pub struct Logger {
    pub path: PathBuf,
    _guard: WorkerGuard,
}

/// Log file location: `LOG_FILE_PATH` if set, otherwise the per-user data
/// directory, so the log never lands inside the tree being organized.
pub fn log_file_path() -> PathBuf {
    env::var_os("LOG_FILE_PATH")
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(default_log_path)
}

fn default_log_path() -> PathBuf {
    ProjectDirs::from("", "", "folder-sort")
        .map(|dirs| dirs.data_local_dir().join("logs"))
        .unwrap_or_else(|| env::temp_dir().join("folder-sort"))
        .join(LOG_FILE_NAME)
}

fn split_log_path(path: &Path) -> (PathBuf, PathBuf) {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file = path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME));
    (dir, file)
}

pub fn init_logger() -> Logger {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string());

    let path = log_file_path();
    let (dir, file) = split_log_path(&path);
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(EnvFilter::new(filter))
        .init();

    info!("Writing log to {}", path.display());

    Logger {
        path,
        _guard: guard,
    }
}
