//! Win detection logic for quantum tic-tac-toe.

use crate::types::{Board, Player};
use tracing::instrument;

/// Winning combinations, scanned in this order.
pub const LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Checks if there is a winner on the board.
///
/// Returns the player and the first completed line in [`LINES`] order,
/// `None` otherwise. Only resolved marks count.
#[instrument(skip(board))]
pub fn check_winner(board: &Board) -> Option<(Player, [usize; 3])> {
    for line in LINES {
        let [a, b, c] = line;
        if let Some(player) = board.classical(a)
            && board.classical(b) == Some(player)
            && board.classical(c) == Some(player)
        {
            return Some((player, line));
        }
    }

    None
}
