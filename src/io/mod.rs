//! Output handling for the CLI.
//!
//! This module provides:
//! - Human-readable reports
//! - The JSON envelope used with `--json`
//! - Exit codes

pub mod envelope;
pub mod exit_code;
pub mod report;

pub use envelope::{
    EntityType, Envelope, ErrorDetails, MessageType, Meta, ResultCode, SCHEMA_VERSION, Status,
};
pub use exit_code::ExitCode;
pub use report::{
    render_endpoints_json, render_endpoints_text, render_error_json, render_json, render_text,
};
