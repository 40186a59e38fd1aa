//! Draw detection logic for quantum tic-tac-toe.

use super::win::check_winner;
use crate::types::{Board, Cell};
use tracing::instrument;

/// Checks if every cell holds a resolved mark.
///
/// Cells holding only superposed moves are not full.
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    board.cells().iter().all(Cell::is_classical)
}

/// A full board with no winner.
#[instrument(skip(board))]
pub fn is_draw(board: &Board) -> bool {
    is_full(board) && check_winner(board).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Player;

    fn board_from(marks: [Player; 9]) -> Board {
        let mut board = Board::new();
        for (idx, player) in marks.into_iter().enumerate() {
            board.set_classical(idx, player).unwrap();
        }
        board
    }

    #[test]
    fn test_empty_board_not_full() {
        assert!(!is_full(&Board::new()));
    }

    #[test]
    fn test_draw_detection() {
        use Player::{O, X};
        // X O X / O X X / O X O
        let board = board_from([X, O, X, O, X, X, O, X, O]);
        assert!(is_full(&board));
        assert!(is_draw(&board));
    }

    #[test]
    fn test_not_draw_if_winner() {
        use Player::{O, X};
        let board = board_from([X, X, X, O, O, X, O, X, O]);
        assert!(is_full(&board));
        assert!(!is_draw(&board));
    }

    #[test]
    fn test_quantum_only_cells_are_not_full() {
        use crate::types::MoveLabel;
        use Player::{O, X};
        let mut board = Board::new();
        for (idx, player) in [X, O, X, O, X, X, O, X].into_iter().enumerate() {
            board.set_classical(idx, player).unwrap();
        }
        board
            .cell_mut(8)
            .unwrap()
            .push_quantum(MoveLabel::new(O, 8));

        assert!(!is_full(&board));
        assert!(!is_draw(&board));
    }
}
