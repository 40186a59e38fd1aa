//! Alternating turn invariant: players alternate X, O, X, O, ...

use super::Invariant;
use crate::state::{GameState, HistoryEntry};
use crate::types::Player;

/// Invariant: X moves on odd move numbers, O on even ones, and every placed
/// move carries the number and player of its turn.
pub struct AlternatingTurnInvariant;

impl Invariant<GameState> for AlternatingTurnInvariant {
    fn holds(state: &GameState) -> bool {
        let expected = if state.move_number() % 2 == 1 {
            Player::X
        } else {
            Player::O
        };
        if state.current_player() != expected {
            return false;
        }

        let placed = state.history().iter().filter_map(|entry| match entry {
            HistoryEntry::Placed(mv) => Some(mv.label),
            HistoryEntry::Collapsed(_) => None,
        });
        for (turn, label) in (1u32..).zip(placed) {
            let player = if turn % 2 == 1 { Player::X } else { Player::O };
            if label.number() != turn || label.player() != player {
                return false;
            }
        }
        true
    }

    fn description() -> &'static str {
        "Players alternate turns (X, O, X, O, ...)"
    }
}
