//! Quantum tic-tac-toe server library.
//!
//! # Architecture
//!
//! - **Backend**: HTTP measurement service (single-qubit Hadamard measurement)
//! - **HTTP source**: engine-side client for the backend
//! - **Config**: TOML session configuration with environment override
//! - **Terminal**: line-based game session over any async reader/writer

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod backend;
pub mod cli;
pub mod config;
mod error;
mod http_source;
pub mod qubit;
pub mod terminal;

pub use config::{ConfigError, GameConfig};
pub use error::ServerError;
pub use http_source::{HttpMeasurementSource, SimulatedMeasurement};
