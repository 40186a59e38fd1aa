//! First-class invariants for quantum tic-tac-toe.
//!
//! Invariants are logical properties that must hold after every transition.
//! The engine checks them in debug builds; they are also testable on their
//! own.

use crate::state::GameState;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implemented for tuples of invariants.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }

        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }

        if !I3::holds(state) {
            violations.push(InvariantViolation::new(I3::description()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }

        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

pub mod alternating_turn;
pub mod bounded_superposition;
pub mod settled_cells;

pub use alternating_turn::AlternatingTurnInvariant;
pub use bounded_superposition::BoundedSuperpositionInvariant;
pub use settled_cells::SettledCellsInvariant;

/// All quantum tic-tac-toe invariants as a composable set.
pub type QuantumInvariants = (
    SettledCellsInvariant,
    AlternatingTurnInvariant,
    BoundedSuperpositionInvariant,
);

/// Checks every invariant, joining violations into one message.
pub fn check_state(state: &GameState) -> Result<(), String> {
    QuantumInvariants::check_all(state).map_err(|violations| {
        violations
            .iter()
            .map(|v| v.description.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Board, Player};

    #[test]
    fn test_invariant_set_holds_for_new_game() {
        assert!(QuantumInvariants::check_all(&GameState::new()).is_ok());
    }

    #[test]
    fn test_invariant_set_holds_after_moves() {
        let mut state = GameState::new();
        for (a, b) in [(0, 1), (1, 2)] {
            state.select(a).unwrap();
            state.select(b).unwrap();
        }
        assert!(check_state(&state).is_ok());
    }

    #[test]
    fn test_two_invariants_as_set() {
        type TwoInvariants = (SettledCellsInvariant, AlternatingTurnInvariant);
        let mut board = Board::new();
        board.set_classical(0, Player::X).unwrap();
        assert!(TwoInvariants::check_all(&GameState::with_board(board)).is_ok());
    }
}
