//! Settled cells invariant: a resolved cell holds no superposed moves.

use super::Invariant;
use crate::state::GameState;

/// Invariant: every cell with a classical mark has an empty quantum list,
/// and no selected cell is resolved.
pub struct SettledCellsInvariant;

impl Invariant<GameState> for SettledCellsInvariant {
    fn holds(state: &GameState) -> bool {
        let board = state.board();
        let cells_settled = board
            .cells()
            .iter()
            .all(|cell| !cell.is_classical() || cell.quantum().is_empty());
        let selection_open = state
            .selected_cells()
            .iter()
            .all(|&idx| board.classical(idx).is_none());
        cells_settled && selection_open
    }

    fn description() -> &'static str {
        "Resolved cells hold no quantum moves and cannot be selected"
    }
}
