use tracing::{error, info};

/// Minimal sink for the human-readable audit trail of a run.
pub trait LogSink: Send + Sync {
    fn info(&self, text: &str);
    fn error(&self, text: &str);
}

/// Forwards to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl LogSink for TracingLog {
    fn info(&self, text: &str) {
        info!("{}", text);
    }

    fn error(&self, text: &str) {
        error!("{}", text);
    }
}
