pub mod extension;
pub mod gemini;

pub use extension::ExtensionOracle;
pub use gemini::GeminiOracle;

use crate::error::Error;
use crate::model::{Classification, Item};

/// Assigns a destination category to each item of a batch.
///
/// Implementations may block on network I/O and may fail; the batcher turns
/// an `Err` or an empty result into a failed batch and keeps going. Any
/// `Fn(&[Item]) -> Result<Vec<Classification>, Error>` is an oracle.
pub trait ClassificationOracle: Send + Sync {
    fn classify(&self, batch: &[Item]) -> Result<Vec<Classification>, Error>;
}

impl<F> ClassificationOracle for F
where
    F: Fn(&[Item]) -> Result<Vec<Classification>, Error> + Send + Sync,
{
    fn classify(&self, batch: &[Item]) -> Result<Vec<Classification>, Error> {
        self(batch)
    }
}
