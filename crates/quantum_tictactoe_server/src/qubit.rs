//! Single-qubit state simulation used by the measurement backend.
//!
//! The backend only ever prepares `|0>`, applies a Hadamard gate and
//! measures, so real amplitudes are enough.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::FRAC_1_SQRT_2;
use tracing::{debug, instrument};

/// One qubit `a|0> + b|1>` with real amplitudes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Qubit {
    zero: f64,
    one: f64,
}

impl Qubit {
    /// The `|0>` basis state.
    pub fn new() -> Self {
        Self {
            zero: 1.0,
            one: 0.0,
        }
    }

    /// Applies the Hadamard gate.
    pub fn hadamard(&mut self) {
        let (a, b) = (self.zero, self.one);
        self.zero = (a + b) * FRAC_1_SQRT_2;
        self.one = (a - b) * FRAC_1_SQRT_2;
    }

    /// Probability of measuring `1`.
    pub fn probability_one(&self) -> f64 {
        self.one * self.one
    }

    /// Measures the qubit, collapsing it to the observed basis state.
    pub fn measure<R: Rng>(&mut self, rng: &mut R) -> u8 {
        let p = self.probability_one().clamp(0.0, 1.0);
        if rng.gen_bool(p) {
            *self = Self { zero: 0.0, one: 1.0 };
            1
        } else {
            *self = Self::new();
            0
        }
    }
}

impl Default for Qubit {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs one shot of `H` then measure, seeded for reproducibility.
#[instrument]
pub fn measure_superposition(seed: u64) -> u8 {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut qubit = Qubit::new();
    qubit.hadamard();
    let bit = qubit.measure(&mut rng);
    debug!(bit, "Measured qubit");
    bit
}
