//! Measurement backend: a small HTTP service answering collapse requests.
//!
//! `GET /` reports liveness; `POST /quantum-move` measures one qubit in
//! superposition and returns the bit.

use crate::error::ServerError;
use crate::qubit::measure_superposition;
use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{info, instrument};

/// Liveness message returned by `GET /`.
pub const ALIVE_MESSAGE: &str = "Quantum backend is alive.";

/// Request body for `POST /quantum-move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureRequest {
    /// Simulator seed.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_seed() -> u64 {
    42
}

/// Response body for `POST /quantum-move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureResponse {
    /// Measured bit: `0` for the first cell, `1` for the second.
    pub collapse_result: u8,
}

/// Builds the backend router.
pub fn router() -> Router {
    Router::new()
        .route("/", get(alive))
        .route("/quantum-move", post(quantum_move))
}

async fn alive() -> &'static str {
    ALIVE_MESSAGE
}

#[instrument(skip_all)]
async fn quantum_move(Json(request): Json<MeasureRequest>) -> Json<MeasureResponse> {
    let collapse_result = measure_superposition(request.seed);
    info!(seed = request.seed, collapse_result, "Collapse measured");
    Json(MeasureResponse { collapse_result })
}

/// Serves the backend on an already bound listener until it fails.
#[instrument(skip(listener))]
pub async fn serve(listener: TcpListener) -> Result<(), ServerError> {
    let addr = listener.local_addr()?;
    info!(%addr, "Measurement backend listening");
    axum::serve(listener, router())
        .await
        .map_err(|e| ServerError::new(format!("Backend stopped: {}", e)))
}

/// Binds to `host:port` and serves the backend.
#[instrument]
pub async fn run(host: &str, port: u16) -> Result<(), ServerError> {
    let listener = TcpListener::bind((host, port))
        .await
        .map_err(|e| ServerError::new(format!("Failed to bind {}:{}: {}", host, port, e)))?;
    serve(listener).await
}
