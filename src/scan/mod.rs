//! Source discovery and parallel endpoint extraction.

pub mod error;
pub mod scanner;
pub mod walker;

pub use error::{ScanError, ScanResult};
pub use scanner::{EndpointScanner, ScanOutcome};
pub use walker::FileWalker;
