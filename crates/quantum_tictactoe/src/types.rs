//! Core domain types for quantum tic-tac-toe.

use crate::action::EngineError;
use serde::{Deserialize, Serialize};

/// Number of cells on the board.
pub const CELL_COUNT: usize = 9;

/// Player in the game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum Player {
    /// Player X (goes first).
    X,
    /// Player O (goes second).
    O,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Mark character used on the board.
    pub fn as_char(self) -> char {
        match self {
            Player::X => 'X',
            Player::O => 'O',
        }
    }
}

/// Label of a quantum move: the player followed by the move number, e.g. `X1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveLabel {
    player: Player,
    number: u32,
}

impl MoveLabel {
    /// Creates a label for the given player and move number.
    pub fn new(player: Player, number: u32) -> Self {
        Self { player, number }
    }

    /// The player who owns the move (first character of the label).
    pub fn player(&self) -> Player {
        self.player
    }

    /// The move number.
    pub fn number(&self) -> u32 {
        self.number
    }
}

impl std::fmt::Display for MoveLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.player, self.number)
    }
}

impl std::str::FromStr for MoveLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let player = match chars.next() {
            Some('X') => Player::X,
            Some('O') => Player::O,
            _ => return Err(format!("Invalid move label: {}", s)),
        };
        let number = chars
            .as_str()
            .parse::<u32>()
            .map_err(|_| format!("Invalid move label: {}", s))?;
        Ok(Self::new(player, number))
    }
}

/// A single cell of the 3x3 board.
///
/// Holds the moves currently superposed here, in placement order, and the
/// resolved mark once a collapse lands on it. A resolved cell never holds
/// quantum entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    quantum: Vec<MoveLabel>,
    classical: Option<Player>,
}

impl Cell {
    /// Moves in superposition at this cell.
    pub fn quantum(&self) -> &[MoveLabel] {
        &self.quantum
    }

    /// The resolved mark, if any.
    pub fn classical(&self) -> Option<Player> {
        self.classical
    }

    /// True once a collapse has landed here.
    pub fn is_classical(&self) -> bool {
        self.classical.is_some()
    }

    /// True if the cell holds nothing at all.
    pub fn is_empty(&self) -> bool {
        self.classical.is_none() && self.quantum.is_empty()
    }

    /// True if the given move is superposed here.
    pub fn holds(&self, label: MoveLabel) -> bool {
        self.quantum.contains(&label)
    }

    pub(crate) fn push_quantum(&mut self, label: MoveLabel) {
        self.quantum.push(label);
    }

    /// Removes one occurrence of the label. Returns whether it was present.
    pub(crate) fn remove_quantum(&mut self, label: MoveLabel) -> bool {
        match self.quantum.iter().position(|l| *l == label) {
            Some(idx) => {
                self.quantum.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Resolves the cell to a player and returns the moves it displaced.
    pub(crate) fn settle(&mut self, player: Player) -> Vec<MoveLabel> {
        self.classical = Some(player);
        std::mem::take(&mut self.quantum)
    }
}

/// 3x3 quantum tic-tac-toe board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Cells in row-major order (0-8).
    cells: [Cell; CELL_COUNT],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            cells: std::array::from_fn(|_| Cell::default()),
        }
    }

    /// Gets the cell at the given index (0-8).
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub(crate) fn cell_mut(&mut self, index: usize) -> Result<&mut Cell, EngineError> {
        self.cells
            .get_mut(index)
            .ok_or(EngineError::InvalidIndex(index))
    }

    /// Returns the resolved mark at the given index.
    pub fn classical(&self, index: usize) -> Option<Player> {
        self.get(index).and_then(Cell::classical)
    }

    /// Places a resolved mark directly, bypassing the move rules.
    ///
    /// Any quantum entries in the cell are dropped. Intended for setting up
    /// positions, not for play.
    pub fn set_classical(&mut self, index: usize, player: Player) -> Result<(), EngineError> {
        self.cell_mut(index)?.settle(player);
        Ok(())
    }

    /// Returns all cells as a slice.
    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell; CELL_COUNT] {
        &mut self.cells
    }

    /// Indices of every cell in which the move is superposed.
    pub fn occupancy(&self, label: MoveLabel) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.holds(label))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Formats the board as a human-readable string.
    ///
    /// Resolved cells show their mark, superposed cells their move labels,
    /// and empty cells their index.
    pub fn display(&self) -> String {
        let symbols: Vec<String> = self
            .cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| match cell.classical {
                Some(player) => player.to_string(),
                None if cell.quantum.is_empty() => idx.to_string(),
                None => cell
                    .quantum
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            })
            .collect();
        let width = symbols.iter().map(String::len).max().unwrap_or(1);

        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                result.push_str(&format!("{:^width$}", symbols[row * 3 + col]));
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push('\n');
                result.push_str(&vec!["-".repeat(width); 3].join("+"));
                result.push('\n');
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Player completed the given line.
    Winner {
        /// Winning player.
        player: Player,
        /// Cell indices of the completed row, column or diagonal.
        line: [usize; 3],
    },
    /// Every cell resolved with no line completed.
    Draw,
}

impl Outcome {
    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Player> {
        match self {
            Outcome::Winner { player, .. } => Some(*player),
            Outcome::Draw => None,
        }
    }

    /// Returns true if the game was a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Winner { player, .. } => write!(f, "Player {} wins!", player),
            Outcome::Draw => write!(f, "Game ended in a draw!"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_display_and_parse() {
        let label = MoveLabel::new(Player::O, 4);
        assert_eq!(label.to_string(), "O4");
        assert_eq!("O4".parse::<MoveLabel>(), Ok(label));
        assert!("Z4".parse::<MoveLabel>().is_err());
        assert!("X".parse::<MoveLabel>().is_err());
    }

    #[test]
    fn test_settle_displaces_quantum_entries() {
        let mut cell = Cell::default();
        cell.push_quantum(MoveLabel::new(Player::X, 1));
        cell.push_quantum(MoveLabel::new(Player::O, 2));

        let displaced = cell.settle(Player::X);

        assert_eq!(displaced.len(), 2);
        assert!(cell.quantum().is_empty());
        assert_eq!(cell.classical(), Some(Player::X));
    }

    #[test]
    fn test_remove_quantum_only_removes_one() {
        let mut cell = Cell::default();
        let label = MoveLabel::new(Player::X, 1);
        cell.push_quantum(label);
        assert!(cell.remove_quantum(label));
        assert!(!cell.remove_quantum(label));
    }

    #[test]
    fn test_display_shows_marks_labels_and_indices() {
        let mut board = Board::new();
        board.set_classical(0, Player::X).unwrap();
        board.cell_mut(4).unwrap().push_quantum(MoveLabel::new(Player::O, 2));

        let rendered = board.display();
        assert!(rendered.contains('X'));
        assert!(rendered.contains("O2"));
        assert!(rendered.contains('8'));
        assert_eq!(rendered.lines().count(), 5);
    }

    #[test]
    fn test_set_classical_rejects_out_of_range() {
        let mut board = Board::new();
        assert_eq!(
            board.set_classical(9, Player::O),
            Err(EngineError::InvalidIndex(9))
        );
    }
}
