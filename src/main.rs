use colored::*;
use cvd_matrix::cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    cvd_matrix::init();

    match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::from(cli::EXIT_FATAL)
        }
    }
}
