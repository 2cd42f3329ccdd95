use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Schema file not found or unreadable: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Unsupported schema file format for {path}. Only YAML (.yaml, .yml) and JSON (.json) are supported."
    )]
    UnsupportedFormat { path: PathBuf },

    #[error("Error parsing JSON schema {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Error parsing YAML schema {path}: {message}")]
    Yaml { path: PathBuf, message: String },

    #[error("Schema document {path} must be a mapping at the top level")]
    NotAnObject { path: PathBuf },
}

pub type SchemaResult<T> = Result<T, SchemaError>;
