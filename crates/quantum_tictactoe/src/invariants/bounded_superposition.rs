//! Bounded superposition invariant: a move is never in more than two cells.

use super::Invariant;
use crate::state::GameState;
use std::collections::HashMap;

/// Invariant: no label appears in more than two cells, never twice in one
/// cell, and a pending collapse sits in exactly its own two cells.
pub struct BoundedSuperpositionInvariant;

impl Invariant<GameState> for BoundedSuperpositionInvariant {
    fn holds(state: &GameState) -> bool {
        let mut counts = HashMap::new();
        for cell in state.board().cells() {
            for (idx, label) in cell.quantum().iter().enumerate() {
                if cell.quantum()[..idx].contains(label) {
                    return false;
                }
                *counts.entry(*label).or_insert(0usize) += 1;
            }
        }
        if counts.values().any(|&n| n > 2) {
            return false;
        }

        match state.pending_collapse() {
            Some(mv) => state.check_collapsible(mv).is_ok(),
            None => true,
        }
    }

    fn description() -> &'static str {
        "Each quantum move occupies at most two distinct cells"
    }
}
