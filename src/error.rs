//! Top-level error type tying the per-module errors together.

use thiserror::Error;

use crate::config::ConfigError;
use crate::io::ExitCode;
use crate::parsing::ParseError;
use crate::scan::ScanError;
use crate::schema::SchemaError;

#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl ValidatorError {
    /// Every operational failure exits with the general error code.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::GeneralError
    }

    /// Short suggestion shown with the error, if one applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ValidatorError::Schema(SchemaError::UnsupportedFormat { .. }) => {
                Some("Rename the schema file with a .yaml, .yml or .json extension")
            }
            ValidatorError::Schema(SchemaError::Io { .. }) => Some("Check the schema path"),
            ValidatorError::Scan(ScanError::PathNotFound(_)) => Some("Check the code path"),
            ValidatorError::Config(ConfigError::AlreadyExists(_)) => {
                Some("Use --force to overwrite the existing file")
            }
            _ => None,
        }
    }
}

pub type ValidatorResult<T> = Result<T, ValidatorError>;
