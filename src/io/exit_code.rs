//! Process exit codes shared by every command.

/// Exit status of the CLI.
///
/// `ValidationFailed` means the run completed and found problems;
/// `GeneralError` means it could not complete (bad input, I/O, config).
/// Both exit with 1. Usage errors are reported by clap and exit with 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    ValidationFailed,
    GeneralError,
}

impl ExitCode {
    pub fn code(self) -> u8 {
        match self {
            ExitCode::Success => 0,
            ExitCode::ValidationFailed | ExitCode::GeneralError => 1,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code())
    }
}
