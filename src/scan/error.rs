use std::path::PathBuf;
use thiserror::Error;

use crate::parsing::ParseError;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Code path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Parser error: {0}")]
    Parse(#[from] ParseError),
}

pub type ScanResult<T> = Result<T, ScanError>;
