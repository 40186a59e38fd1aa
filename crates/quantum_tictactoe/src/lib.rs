//! Quantum tic-tac-toe game engine.
//!
//! Moves are placed in superposition across two cells. Every third move
//! collapses into one of its cells, decided by a measurement source with a
//! seeded local coin as fallback; ordinary tic-tac-toe lines then decide
//! the game.
//!
//! # Architecture
//!
//! - **Types**: players, move labels, cells and the board
//! - **State**: the game state and its synchronous transitions
//! - **Rules**: win and draw detection over resolved marks
//! - **Measurement**: the measurement source seam and the fallback coin
//! - **Engine**: async orchestration of selections and collapses
//!
//! # Example
//!
//! ```
//! use quantum_tictactoe::{EngineSettings, Offline, QuantumBoardEngine, SeedStrategy};
//!
//! # async fn example() -> Result<(), quantum_tictactoe::EngineError> {
//! let settings = EngineSettings::default()
//!     .with_seed(SeedStrategy::Fixed(7))
//!     .with_fallback_seed(Some(7));
//! let mut engine = QuantumBoardEngine::with_settings(Offline, settings);
//!
//! engine.select_cell(0).await?;
//! engine.select_cell(4).await?;
//! assert_eq!(engine.state().move_number(), 2);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod engine;
mod measurement;
mod state;
mod types;

pub mod invariants;
pub mod rules;

pub use action::{EngineError, QuantumMove, SelectionRejection};
pub use engine::{EngineSettings, QuantumBoardEngine, Transition};
pub use measurement::{
    CollapseOutcome, FallbackCoin, MeasurementError, MeasurementPath, MeasurementSource, Offline,
    SeedStrategy,
};
pub use state::{COLLAPSE_INTERVAL, CollapseRecord, GameState, HistoryEntry, Phase};
pub use types::{Board, CELL_COUNT, Cell, MoveLabel, Outcome, Player};
