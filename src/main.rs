use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use melody_notes::{AnalysisConfig, DEFAULT_BASE_DIR};

/// Extract note sequences from melody recordings.
#[derive(Parser, Debug)]
#[command(name = "melody-notes", version)]
struct Cli {
    /// Directory holding the unit* folders
    #[arg(default_value = DEFAULT_BASE_DIR)]
    base_dir: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::info!("Starting melody analysis...");

    let config = AnalysisConfig::default();
    match melody_notes::run(&cli.base_dir, &config) {
        Ok(summary) => {
            log::info!(
                "Processed {} files in {} unit directories: {} notes, {} failed",
                summary.files,
                summary.units,
                summary.notes,
                summary.failures.len()
            );
            if summary.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
