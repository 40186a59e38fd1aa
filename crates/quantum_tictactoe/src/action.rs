//! First-class action types for quantum tic-tac-toe.
//!
//! A quantum move is a domain event: one label superposed across two cells.
//! Errors describe why a selection or transition was refused.

use super::types::{MoveLabel, Player};
use serde::{Deserialize, Serialize};

/// A move placed in superposition across two distinct cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuantumMove {
    /// Label of the move, e.g. `X3`.
    pub label: MoveLabel,
    /// The two cells holding the move, in selection order.
    pub cells: [usize; 2],
}

impl QuantumMove {
    /// Creates a new quantum move.
    pub fn new(label: MoveLabel, cells: [usize; 2]) -> Self {
        Self { label, cells }
    }

    /// The player who made the move.
    pub fn player(&self) -> Player {
        self.label.player()
    }
}

impl std::fmt::Display for QuantumMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> cells {} and {}", self.label, self.cells[0], self.cells[1])
    }
}

/// Why a cell selection was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum SelectionRejection {
    /// The game has already finished.
    #[display("the game is over")]
    GameOver,

    /// The cell already holds a resolved mark.
    #[display("cell {} is already resolved", _0)]
    CellResolved(usize),

    /// A collapse is still awaiting its measurement.
    #[display("move {} is still collapsing", _0)]
    CollapseInFlight(MoveLabel),
}

/// Error that can occur when driving the engine.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum EngineError {
    /// Cell index outside the board.
    #[display("Cell index {} is out of range (must be 0-8)", _0)]
    InvalidIndex(usize),

    /// Selection not allowed in the current state.
    #[display("Illegal selection: {}", _0)]
    IllegalSelection(SelectionRejection),

    /// Board bookkeeping is corrupt. Indicates a bug, never player input.
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for EngineError {}
