//! The quantum board engine.
//!
//! Owns the [`GameState`] and drives it through selections, placements and
//! collapses. Collapses ask a [`MeasurementSource`] for an outcome; if the
//! source fails, times out, or answers anything but 0 or 1, the local
//! [`FallbackCoin`] decides instead.

use crate::action::{EngineError, QuantumMove};
use crate::invariants;
use crate::measurement::{
    CollapseOutcome, FallbackCoin, MeasurementError, MeasurementPath, MeasurementSource,
    SeedStrategy,
};
use crate::state::{CollapseRecord, GameState, Selection};
use crate::types::Outcome;
use derive_getters::Getters;
use derive_setters::Setters;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// Tunables for collapse resolution.
#[derive(Debug, Clone, Getters, Setters)]
#[setters(prefix = "with_")]
pub struct EngineSettings {
    /// Seed scheme passed to the measurement source.
    seed: SeedStrategy,
    /// Seed for the fallback coin; random when `None`.
    fallback_seed: Option<u64>,
    /// How long to wait for the measurement source.
    measurement_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            seed: SeedStrategy::Clock,
            fallback_seed: None,
            measurement_timeout: Duration::from_secs(5),
        }
    }
}

/// What a call to [`QuantumBoardEngine::select_cell`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// First cell of a pair selected.
    Selected {
        /// The selected cell.
        index: usize,
    },
    /// A pending selection was withdrawn.
    Deselected {
        /// The deselected cell.
        index: usize,
        /// Cells still needed for a move.
        remaining: usize,
    },
    /// Two cells were already pending; nothing changed.
    Ignored,
    /// A quantum move was placed and the turn passed.
    Placed(QuantumMove),
    /// A quantum move was placed and immediately collapsed.
    Collapsed {
        /// How the collapse resolved.
        record: CollapseRecord,
        /// Set if the collapse ended the game.
        outcome: Option<Outcome>,
    },
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transition::Selected { .. } => write!(f, "Select one more cell"),
            Transition::Deselected { remaining, .. } => {
                write!(f, "Cell deselected. Select {} cell(s)", remaining)
            }
            Transition::Ignored => write!(f, "Two cells already selected"),
            Transition::Placed(_) => write!(f, "Select two cells for your quantum move"),
            Transition::Collapsed { record, outcome } => match outcome {
                Some(outcome) => write!(f, "{}. {}", record, outcome),
                None => write!(f, "{}", record),
            },
        }
    }
}

/// Quantum tic-tac-toe engine.
///
/// Every mutation takes `&mut self`, so at most one collapse is ever in
/// flight. Observers get snapshots through [`QuantumBoardEngine::subscribe`].
#[derive(Debug)]
pub struct QuantumBoardEngine<M> {
    state: GameState,
    source: M,
    coin: FallbackCoin,
    settings: EngineSettings,
    remote_available: bool,
    updates: watch::Sender<GameState>,
}

impl<M: MeasurementSource> QuantumBoardEngine<M> {
    /// Creates an engine with default settings.
    ///
    /// The source is assumed reachable until a call fails or
    /// [`refresh_connectivity`](Self::refresh_connectivity) says otherwise.
    pub fn new(source: M) -> Self {
        Self::with_settings(source, EngineSettings::default())
    }

    /// Creates an engine with explicit settings.
    #[instrument(skip(source), fields(source_name = source.name()))]
    pub fn with_settings(source: M, settings: EngineSettings) -> Self {
        let coin = match settings.fallback_seed {
            Some(seed) => FallbackCoin::new(seed),
            None => FallbackCoin::from_entropy(),
        };
        let state = GameState::new();
        let (updates, _) = watch::channel(state.clone());
        info!(fallback_seed = coin.seed(), "Creating quantum board engine");
        Self {
            state,
            source,
            coin,
            settings,
            remote_available: true,
            updates,
        }
    }

    /// Returns the current game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Returns an owned copy of the current game state.
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    /// Receiver that sees a fresh snapshot after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<GameState> {
        self.updates.subscribe()
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns the measurement source.
    pub fn source(&self) -> &M {
        &self.source
    }

    /// Whether collapses will try the measurement source first.
    pub fn remote_available(&self) -> bool {
        self.remote_available
    }

    /// Probes the measurement source and records whether it is reachable.
    #[instrument(skip(self), fields(source_name = self.source.name()))]
    pub async fn refresh_connectivity(&mut self) -> bool {
        self.remote_available = self.source.is_available().await;
        info!(available = self.remote_available, "Measurement source status");
        self.remote_available
    }

    /// Starts a fresh game. Only the connectivity flag survives.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        info!("Resetting game");
        self.state = GameState::new();
        self.publish();
    }

    /// Selects or deselects a cell.
    ///
    /// A second distinct selection places the quantum move; on every third
    /// move the placement is collapsed before this returns.
    ///
    /// # Errors
    ///
    /// - `InvalidIndex` for indices outside 0-8
    /// - `IllegalSelection` when the game is over, a collapse is pending,
    ///   or the cell is already resolved
    /// - `InvariantViolation` if the board bookkeeping is corrupt
    #[instrument(skip(self), fields(player = %self.state.current_player(), move_number = self.state.move_number()))]
    pub async fn select_cell(&mut self, index: usize) -> Result<Transition, EngineError> {
        let selection = match self.state.select(index) {
            Ok(selection) => selection,
            Err(e) => {
                debug!(error = %e, "Selection refused");
                return Err(e);
            }
        };

        let transition = match selection {
            Selection::Selected(index) => Transition::Selected { index },
            Selection::Deselected(index) => Transition::Deselected {
                index,
                remaining: 2 - self.state.selected_cells().len(),
            },
            Selection::Ignored => Transition::Ignored,
            Selection::Placed {
                mv,
                collapse_due: false,
            } => Transition::Placed(mv),
            Selection::Placed {
                mv,
                collapse_due: true,
            } => {
                self.publish();
                let record = self.resolve_collapse(mv).await?;
                Transition::Collapsed {
                    record,
                    outcome: self.state.outcome().copied(),
                }
            }
        };

        self.verify()?;
        self.publish();
        Ok(transition)
    }

    /// Resolves a collapse left pending by a dropped
    /// [`select_cell`](Self::select_cell) future.
    ///
    /// Returns `None` if nothing was pending.
    #[instrument(skip(self))]
    pub async fn resume_collapse(&mut self) -> Result<Option<Transition>, EngineError> {
        let Some(mv) = self.state.pending_collapse().copied() else {
            return Ok(None);
        };
        warn!(move_label = %mv.label, "Resuming interrupted collapse");
        let record = self.resolve_collapse(mv).await?;
        self.verify()?;
        self.publish();
        Ok(Some(Transition::Collapsed {
            record,
            outcome: self.state.outcome().copied(),
        }))
    }

    /// Checks for a win or a draw and finishes the game on either.
    pub fn evaluate_outcome(&mut self) -> Option<Outcome> {
        let outcome = self.state.evaluate_outcome();
        self.publish();
        outcome
    }

    /// Measures the move and applies the result to the board.
    #[instrument(skip(self), fields(move_label = %mv.label))]
    async fn resolve_collapse(&mut self, mv: QuantumMove) -> Result<CollapseRecord, EngineError> {
        self.state.check_collapsible(&mv)?;

        let seed = self.settings.seed.seed_for(mv.label.number());
        let (outcome, path) = self.measure(seed).await;
        self.state.apply_collapse(mv, outcome, path)
    }

    /// Asks the source for a bit, falling back to the local coin on any
    /// failure. Never retries.
    #[instrument(skip(self))]
    async fn measure(&mut self, seed: u64) -> (CollapseOutcome, MeasurementPath) {
        let reason = if self.remote_available {
            match self.measure_remote(seed).await {
                Ok(outcome) => {
                    debug!(?outcome, "Measurement source answered");
                    return (
                        outcome,
                        MeasurementPath::Remote {
                            source: self.source.name().to_string(),
                        },
                    );
                }
                Err(e) => {
                    warn!(error = %e, "Measurement failed, falling back to local coin");
                    self.remote_available = false;
                    e.message
                }
            }
        } else {
            "measurement source unavailable".to_string()
        };

        let outcome = self.coin.flip();
        info!(?outcome, %reason, "Using fallback collapse");
        (outcome, MeasurementPath::Fallback { reason })
    }

    async fn measure_remote(&self, seed: u64) -> Result<CollapseOutcome, MeasurementError> {
        let timeout = self.settings.measurement_timeout;
        let bit = tokio::time::timeout(timeout, self.source.measure(seed))
            .await
            .map_err(|_| {
                MeasurementError::new(format!(
                    "measurement timed out after {}ms",
                    timeout.as_millis()
                ))
            })??;
        CollapseOutcome::from_bit(bit).ok_or_else(|| {
            MeasurementError::new(format!("measurement returned invalid outcome {}", bit))
        })
    }

    fn verify(&self) -> Result<(), EngineError> {
        if cfg!(debug_assertions) {
            invariants::check_state(&self.state).map_err(|description| {
                error!(%description, "Invariant violated");
                EngineError::InvariantViolation(description)
            })?;
        }
        Ok(())
    }

    fn publish(&self) {
        self.updates.send_replace(self.state.clone());
    }
}
