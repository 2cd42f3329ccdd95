use clap::Parser;
use codeintel_api_endpoint_validator::cli::{self, Cli};
use codeintel_api_endpoint_validator::io::ExitCode;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    match cli::run(cli) {
        Ok(code) => code.into(),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::GeneralError.into()
        }
    }
}
