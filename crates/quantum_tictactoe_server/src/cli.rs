//! Command-line interface for quantum tic-tac-toe.

use clap::{Parser, Subcommand};

/// Quantum tic-tac-toe - superposed moves, measured collapses
#[derive(Parser, Debug)]
#[command(name = "quantum_tictactoe")]
#[command(about = "Quantum tic-tac-toe with a measurement backend", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the measurement backend
    Serve {
        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Play a game in the terminal
    Play {
        /// Path to the game config file (optional)
        #[arg(short, long, default_value = "quantum_tictactoe.toml")]
        config: std::path::PathBuf,

        /// Measurement backend URL, overrides the config file
        #[arg(long)]
        measurement_url: Option<String>,

        /// Measure with the in-process simulator instead of a backend
        #[arg(long)]
        simulate: bool,

        /// Base seed for measurements, overrides the config file
        #[arg(long)]
        seed: Option<u64>,
    },
}
