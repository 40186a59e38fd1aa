//! Measurement sources that decide where a quantum move collapses.
//!
//! The engine asks a [`MeasurementSource`] for a single bit. Anything other
//! than a clean `0` or `1` is treated as a failure and replaced by a flip of
//! the local [`FallbackCoin`].

use async_trait::async_trait;
use derive_more::{Display, Error};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, instrument, warn};

/// Which of the two cells a collapse resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollapseOutcome {
    /// Bit `0`: the first selected cell.
    First,
    /// Bit `1`: the second selected cell.
    Second,
}

impl CollapseOutcome {
    /// Interprets a measured bit. Returns `None` for anything but 0 or 1.
    pub fn from_bit(bit: u8) -> Option<Self> {
        match bit {
            0 => Some(CollapseOutcome::First),
            1 => Some(CollapseOutcome::Second),
            _ => None,
        }
    }

    /// The bit this outcome corresponds to.
    pub fn bit(self) -> u8 {
        match self {
            CollapseOutcome::First => 0,
            CollapseOutcome::Second => 1,
        }
    }

    /// Picks the resolved cell from a move's pair.
    pub fn pick(self, cells: [usize; 2]) -> usize {
        match self {
            CollapseOutcome::First => cells[0],
            CollapseOutcome::Second => cells[1],
        }
    }
}

/// How a collapse outcome was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasurementPath {
    /// The measurement source answered.
    Remote {
        /// Name of the source.
        source: String,
    },
    /// The local coin was flipped instead.
    Fallback {
        /// Why the source was not used.
        reason: String,
    },
}

impl MeasurementPath {
    /// True if the local coin decided the outcome.
    pub fn is_fallback(&self) -> bool {
        matches!(self, MeasurementPath::Fallback { .. })
    }
}

/// Measurement source failure.
#[derive(Debug, Clone, Display, Error)]
#[display("Measurement error: {} at {}:{}", message, file, line)]
pub struct MeasurementError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl MeasurementError {
    /// Creates a new measurement error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Provider of the binary outcome used to resolve a collapse.
#[async_trait]
pub trait MeasurementSource: Send + Sync {
    /// Short name used in logs and history.
    fn name(&self) -> &str;

    /// Measures one bit. `0` selects the first cell, `1` the second.
    async fn measure(&self, seed: u64) -> Result<u8, MeasurementError>;

    /// Whether the source can currently be reached.
    async fn is_available(&self) -> bool {
        true
    }
}

#[async_trait]
impl<M: MeasurementSource + ?Sized> MeasurementSource for Box<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn measure(&self, seed: u64) -> Result<u8, MeasurementError> {
        (**self).measure(seed).await
    }

    async fn is_available(&self) -> bool {
        (**self).is_available().await
    }
}

/// A source that is never reachable. Every collapse uses the fallback coin.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

#[async_trait]
impl MeasurementSource for Offline {
    fn name(&self) -> &str {
        "offline"
    }

    async fn measure(&self, _seed: u64) -> Result<u8, MeasurementError> {
        Err(MeasurementError::new("No measurement source configured"))
    }

    async fn is_available(&self) -> bool {
        false
    }
}

/// Seeded, unweighted coin used when the measurement source fails.
#[derive(Debug, Clone)]
pub struct FallbackCoin {
    rng: ChaCha8Rng,
    seed: u64,
}

impl FallbackCoin {
    /// Creates a coin with a fixed seed. Same seed, same flips.
    #[instrument]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Creates a coin from a random seed.
    #[instrument]
    pub fn from_entropy() -> Self {
        let seed = rand::random::<u64>();
        debug!(seed, "Seeding fallback coin from entropy");
        Self::new(seed)
    }

    /// The seed this coin started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Flips the coin.
    #[instrument(skip(self))]
    pub fn flip(&mut self) -> CollapseOutcome {
        if self.rng.gen_bool(0.5) {
            CollapseOutcome::Second
        } else {
            CollapseOutcome::First
        }
    }
}

/// Seed handed to the measurement source for each collapse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeedStrategy {
    /// Base seed offset by the move number; reproducible.
    Fixed(u64),
    /// Milliseconds since the Unix epoch at collapse time.
    #[default]
    Clock,
}

impl SeedStrategy {
    /// Seed for the collapse of the given move.
    pub fn seed_for(&self, move_number: u32) -> u64 {
        match self {
            SeedStrategy::Fixed(base) => base.wrapping_add(u64::from(move_number)),
            SeedStrategy::Clock => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or_else(|e| {
                    warn!(error = %e, "System clock before Unix epoch, using seed 0");
                    0
                }),
        }
    }
}
