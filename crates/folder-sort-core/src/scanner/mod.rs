pub mod walk;

pub use walk::{scan, scan_excluding, ScanResult};
