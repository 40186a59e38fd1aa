//! Quantum tic-tac-toe - unified CLI
//!
//! Runs the measurement backend or a terminal game session.

#![warn(missing_docs)]

use anyhow::Result;
use clap::Parser;
use quantum_tictactoe::QuantumBoardEngine;
use quantum_tictactoe_server::cli::{Cli, Command};
use quantum_tictactoe_server::{GameConfig, backend, terminal};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { port, host } => run_backend(host, port).await,
        Command::Play {
            config,
            measurement_url,
            simulate,
            seed,
        } => run_play(config, measurement_url, simulate, seed).await,
    }
}

/// Run the measurement backend
async fn run_backend(host: String, port: u16) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(%host, port, "Starting measurement backend");
    backend::run(&host, port).await?;
    Ok(())
}

/// Run a terminal game session
#[instrument(skip_all)]
async fn run_play(
    config_path: PathBuf,
    measurement_url: Option<String>,
    simulate: bool,
    seed: Option<u64>,
) -> Result<()> {
    // Logs go to stderr so they don't interleave with the board
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = GameConfig::load(&config_path)?
        .with_measurement_url(measurement_url)
        .with_seed(seed);
    info!(?config, "Starting terminal session");

    let source = terminal::build_source(&config, simulate)?;
    let mut engine = QuantumBoardEngine::with_settings(source, config.engine_settings());

    terminal::run_session(
        &mut engine,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}
