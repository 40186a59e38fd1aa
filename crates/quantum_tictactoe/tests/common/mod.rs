//! Shared test doubles for engine tests.

#![allow(dead_code)]

use async_trait::async_trait;
use quantum_tictactoe::{
    EngineError, EngineSettings, MeasurementError, MeasurementSource, QuantumBoardEngine,
    SeedStrategy, Transition,
};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// One scripted answer from the measurement source.
#[derive(Debug, Clone, Copy)]
pub enum Response {
    /// Answer with this bit (may be out of range on purpose).
    Bit(u8),
    /// Fail the request.
    Fail,
    /// Never answer.
    Hang,
}

/// Measurement source that replays a fixed script, cycling when exhausted.
#[derive(Debug)]
pub struct ScriptedSource {
    script: Vec<Response>,
    next: AtomicUsize,
    available: bool,
    seeds: Mutex<Vec<u64>>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Response>) -> Self {
        Self {
            script,
            next: AtomicUsize::new(0),
            available: true,
            seeds: Mutex::new(Vec::new()),
        }
    }

    pub fn constant(bit: u8) -> Self {
        Self::new(vec![Response::Bit(bit)])
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Number of measure calls so far.
    pub fn calls(&self) -> usize {
        self.next.load(Ordering::SeqCst)
    }

    /// Seeds received so far.
    pub fn seeds(&self) -> Vec<u64> {
        self.seeds.lock().unwrap().clone()
    }
}

#[async_trait]
impl MeasurementSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn measure(&self, seed: u64) -> Result<u8, MeasurementError> {
        self.seeds.lock().unwrap().push(seed);
        let idx = self.next.fetch_add(1, Ordering::SeqCst);
        match self.script[idx % self.script.len()] {
            Response::Bit(bit) => Ok(bit),
            Response::Fail => Err(MeasurementError::new("scripted failure")),
            Response::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(0)
            }
        }
    }

    async fn is_available(&self) -> bool {
        self.available
    }
}

/// Engine with reproducible seeds and a short measurement timeout.
pub fn engine<M: MeasurementSource>(source: M, fallback_seed: u64) -> QuantumBoardEngine<M> {
    QuantumBoardEngine::with_settings(
        source,
        EngineSettings::default()
            .with_seed(SeedStrategy::Fixed(100))
            .with_fallback_seed(Some(fallback_seed))
            .with_measurement_timeout(Duration::from_millis(50)),
    )
}

/// Selects both cells of a move and returns the final transition.
pub async fn play<M: MeasurementSource>(
    engine: &mut QuantumBoardEngine<M>,
    first: usize,
    second: usize,
) -> Result<Transition, EngineError> {
    engine.select_cell(first).await?;
    engine.select_cell(second).await
}

/// Open (unresolved) cells in index order.
pub fn open_cells<M: MeasurementSource>(engine: &QuantumBoardEngine<M>) -> Vec<usize> {
    (0..9)
        .filter(|&idx| engine.state().board().classical(idx).is_none())
        .collect()
}
