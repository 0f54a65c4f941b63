pub mod batcher;
pub mod config;
pub mod error;
pub mod executor;
pub mod log;
pub mod model;
pub mod oracle;
pub mod organizer;
pub mod progress;
pub mod sanitize;
pub mod scanner;

pub use crate::config::AppConfig;
pub use error::Error;
pub use log::{LogSink, TracingLog};
pub use model::{
    Classification, Item, ItemKind, ItemLocations, OutcomeStatus, Phase, RelocationOutcome,
    RunProgress,
};
pub use oracle::{ClassificationOracle, ExtensionOracle, GeminiOracle};
pub use organizer::{Organizer, RunHandle, RunReport};
pub use progress::{ProgressReporter, SilentReporter};
pub use sanitize::sanitize;
