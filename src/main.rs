// src/main.rs
use clap::Parser;
use std::env;
use thiserror::Error;
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod attendance;
mod commands;
mod report;
mod tracker_client;

#[cfg(test)]
mod report_tests;
#[cfg(test)]
mod tracker_tests;

use commands::Commands;
use report::ReportError;
use tracker_client::{
    TrackerClient, TrackerConfig, TrackerError, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS,
};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Backend client error: {0}")]
    Tracker(#[from] TrackerError),
    #[error("Report output error: {0}")]
    Report(#[from] ReportError),
}

#[derive(Parser, Debug)]
#[command(
    name = "ponto-admin",
    version,
    about = "Admin console for the employee time-tracking backend"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Single acquisition point for the backend session: base URL and bearer
/// token come from the environment once, at startup.
fn load_config() -> Result<TrackerConfig, AppError> {
    let base_url = env::var("PONTO_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let token = env::var("PONTO_API_TOKEN")
        .map_err(|_| AppError::MissingEnvVar("PONTO_API_TOKEN".to_string()))?;
    let timeout_secs = env::var("PONTO_API_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    Ok(TrackerConfig {
        base_url,
        token,
        timeout_secs,
    })
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = load_config()?;
    let client = TrackerClient::new(config)?;
    debug!("Using backend at {}", client.base_url());
    commands::run(&client, cli.command).await
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    // Logs go to stderr so table output on stdout stays pipeable
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Setting tracing subscriber failed");

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("Command failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
