//! Game state and its synchronous transitions.
//!
//! Everything here is pure bookkeeping. The only asynchronous step, asking a
//! measurement source where a move collapses, lives in the engine; the state
//! just records that a collapse is pending and later applies its outcome.

use crate::action::{EngineError, QuantumMove, SelectionRejection};
use crate::measurement::{CollapseOutcome, MeasurementPath};
use crate::rules;
use crate::types::{Board, CELL_COUNT, MoveLabel, Outcome, Player};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

/// Every third move collapses.
pub const COLLAPSE_INTERVAL: u32 = 3;

/// Where the state machine currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No cells selected.
    Idle,
    /// One cell selected, waiting for the second.
    OneSelected(usize),
    /// A move is awaiting its measurement.
    Collapsing(MoveLabel),
    /// The game has ended.
    Finished,
}

/// Result of a resolved collapse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapseRecord {
    /// The move that collapsed.
    pub mv: QuantumMove,
    /// Which side of the pair won.
    pub outcome: CollapseOutcome,
    /// The cell that now holds the mark.
    pub cell: usize,
    /// Where the outcome came from.
    pub path: MeasurementPath,
    /// Other moves that were superposed in the resolved cell.
    pub displaced: Vec<MoveLabel>,
}

impl std::fmt::Display for CollapseRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Move {} collapsed to cell {}", self.mv.label, self.cell)?;
        if self.path.is_fallback() {
            write!(f, " (fallback)")?;
        }
        Ok(())
    }
}

/// One entry of the move history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryEntry {
    /// A quantum move was placed.
    Placed(QuantumMove),
    /// A quantum move collapsed.
    Collapsed(CollapseRecord),
}

/// Effect of a single cell selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Selection {
    Selected(usize),
    Deselected(usize),
    Ignored,
    Placed {
        mv: QuantumMove,
        collapse_due: bool,
    },
}

/// Complete game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    board: Board,
    current_player: Player,
    move_number: u32,
    selected_cells: Vec<usize>,
    game_active: bool,
    outcome: Option<Outcome>,
    pending_collapse: Option<QuantumMove>,
    history: Vec<HistoryEntry>,
}

impl GameState {
    /// Creates a new game: X to move, move 1, empty board.
    pub fn new() -> Self {
        Self::with_board(Board::new())
    }

    /// Creates an active game at move 1 over an existing board.
    pub fn with_board(board: Board) -> Self {
        Self {
            board,
            current_player: Player::X,
            move_number: 1,
            selected_cells: Vec::new(),
            game_active: true,
            outcome: None,
            pending_collapse: None,
            history: Vec::new(),
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the player to move.
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Returns the number of the move being constructed.
    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    /// Cells selected for the move under construction.
    pub fn selected_cells(&self) -> &[usize] {
        &self.selected_cells
    }

    /// False once the game has been won or drawn.
    pub fn game_active(&self) -> bool {
        self.game_active
    }

    /// How the game ended, if it has.
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// The move awaiting measurement, if any.
    pub fn pending_collapse(&self) -> Option<&QuantumMove> {
        self.pending_collapse.as_ref()
    }

    /// Placements and collapses so far.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Current state-machine phase.
    pub fn phase(&self) -> Phase {
        if !self.game_active {
            Phase::Finished
        } else if let Some(mv) = &self.pending_collapse {
            Phase::Collapsing(mv.label)
        } else if let [only] = self.selected_cells.as_slice() {
            Phase::OneSelected(*only)
        } else {
            Phase::Idle
        }
    }

    /// Checks the board for a win, then for a draw, and finishes the game
    /// on either.
    ///
    /// Only resolved marks count: a board whose remaining cells hold nothing
    /// but superposed moves is neither won nor drawn.
    #[instrument(skip(self), fields(move_number = self.move_number))]
    pub fn evaluate_outcome(&mut self) -> Option<Outcome> {
        if let Some(outcome) = self.outcome {
            return Some(outcome);
        }

        let outcome = if let Some((player, line)) = rules::check_winner(&self.board) {
            Outcome::Winner { player, line }
        } else if rules::is_full(&self.board) {
            Outcome::Draw
        } else {
            return None;
        };

        info!(%outcome, "Game finished");
        self.game_active = false;
        self.outcome = Some(outcome);
        Some(outcome)
    }

    /// Handles one cell selection.
    #[instrument(skip(self), fields(player = %self.current_player, move_number = self.move_number))]
    pub(crate) fn select(&mut self, index: usize) -> Result<Selection, EngineError> {
        if index >= CELL_COUNT {
            return Err(EngineError::InvalidIndex(index));
        }
        if !self.game_active {
            return Err(EngineError::IllegalSelection(SelectionRejection::GameOver));
        }
        if let Some(mv) = &self.pending_collapse {
            return Err(EngineError::IllegalSelection(
                SelectionRejection::CollapseInFlight(mv.label),
            ));
        }
        if self.board.classical(index).is_some() {
            return Err(EngineError::IllegalSelection(
                SelectionRejection::CellResolved(index),
            ));
        }

        if let Some(pos) = self.selected_cells.iter().position(|&c| c == index) {
            self.selected_cells.remove(pos);
            debug!(index, "Cell deselected");
            return Ok(Selection::Deselected(index));
        }

        if self.selected_cells.len() >= 2 {
            return Ok(Selection::Ignored);
        }

        self.selected_cells.push(index);
        if let [first, second] = self.selected_cells[..] {
            let (mv, collapse_due) = self.place_quantum_move([first, second])?;
            Ok(Selection::Placed { mv, collapse_due })
        } else {
            debug!(index, "Cell selected");
            Ok(Selection::Selected(index))
        }
    }

    /// Superposes the current move across both cells.
    ///
    /// On a collapse move the turn is held until the collapse resolves;
    /// otherwise the turn passes immediately.
    fn place_quantum_move(&mut self, cells: [usize; 2]) -> Result<(QuantumMove, bool), EngineError> {
        let label = MoveLabel::new(self.current_player, self.move_number);
        let mv = QuantumMove::new(label, cells);

        for idx in cells {
            self.board.cell_mut(idx)?.push_quantum(label);
        }
        self.selected_cells.clear();
        self.history.push(HistoryEntry::Placed(mv));

        let collapse_due = self.move_number % COLLAPSE_INTERVAL == 0;
        info!(%mv, collapse_due, "Quantum move placed");

        if collapse_due {
            self.pending_collapse = Some(mv);
        } else {
            self.advance_turn();
        }
        Ok((mv, collapse_due))
    }

    /// Verifies the move sits in exactly its own two cells.
    pub(crate) fn check_collapsible(&self, mv: &QuantumMove) -> Result<(), EngineError> {
        let occupancy = self.board.occupancy(mv.label);
        let mut expected = mv.cells.to_vec();
        expected.sort_unstable();
        if occupancy != expected {
            error!(move_label = %mv.label, ?occupancy, ?expected, "Move not in exactly two cells");
            return Err(EngineError::InvariantViolation(format!(
                "move {} found in cells {:?}, expected {:?}",
                mv.label, occupancy, expected
            )));
        }
        Ok(())
    }

    /// Resolves a collapse: marks the chosen cell, consumes the move
    /// everywhere, then evaluates the outcome and passes the turn if the
    /// game goes on.
    #[instrument(skip(self, path), fields(move_label = %mv.label))]
    pub(crate) fn apply_collapse(
        &mut self,
        mv: QuantumMove,
        outcome: CollapseOutcome,
        path: MeasurementPath,
    ) -> Result<CollapseRecord, EngineError> {
        self.check_collapsible(&mv)?;

        let cell = outcome.pick(mv.cells);
        let displaced: Vec<MoveLabel> = self
            .board
            .cell_mut(cell)?
            .settle(mv.player())
            .into_iter()
            .filter(|label| *label != mv.label)
            .collect();
        for other in self.board.cells_mut().iter_mut() {
            other.remove_quantum(mv.label);
        }

        let record = CollapseRecord {
            mv,
            outcome,
            cell,
            path,
            displaced,
        };
        info!(%record, "Collapse resolved");
        self.history.push(HistoryEntry::Collapsed(record.clone()));
        self.pending_collapse = None;

        if self.evaluate_outcome().is_none() {
            self.advance_turn();
        }
        Ok(record)
    }

    fn advance_turn(&mut self) {
        self.current_player = self.current_player.opponent();
        self.move_number += 1;
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote() -> MeasurementPath {
        MeasurementPath::Remote {
            source: "test".to_string(),
        }
    }

    #[test]
    fn test_new_game_is_idle() {
        let state = GameState::new();
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.current_player(), Player::X);
        assert_eq!(state.move_number(), 1);
    }

    #[test]
    fn test_select_out_of_range() {
        let mut state = GameState::new();
        assert_eq!(state.select(9), Err(EngineError::InvalidIndex(9)));
    }

    #[test]
    fn test_select_then_deselect() {
        let mut state = GameState::new();
        assert_eq!(state.select(4), Ok(Selection::Selected(4)));
        assert_eq!(state.phase(), Phase::OneSelected(4));
        assert_eq!(state.select(4), Ok(Selection::Deselected(4)));
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.board(), &Board::new());
    }

    #[test]
    fn test_second_selection_places_move() {
        let mut state = GameState::new();
        state.select(0).unwrap();
        let selection = state.select(8).unwrap();

        let label = MoveLabel::new(Player::X, 1);
        assert_eq!(
            selection,
            Selection::Placed {
                mv: QuantumMove::new(label, [0, 8]),
                collapse_due: false,
            }
        );
        assert_eq!(state.board().occupancy(label), vec![0, 8]);
        assert!(state.selected_cells().is_empty());
        assert_eq!(state.current_player(), Player::O);
        assert_eq!(state.move_number(), 2);
    }

    #[test]
    fn test_third_move_waits_for_collapse() {
        let mut state = GameState::new();
        for (a, b) in [(0, 1), (2, 3), (4, 5)] {
            state.select(a).unwrap();
            state.select(b).unwrap();
        }
        assert_eq!(
            state.phase(),
            Phase::Collapsing(MoveLabel::new(Player::X, 3))
        );
        assert_eq!(state.move_number(), 3);
        assert!(matches!(
            state.select(6),
            Err(EngineError::IllegalSelection(SelectionRejection::CollapseInFlight(_)))
        ));
    }

    #[test]
    fn test_apply_collapse_consumes_move() {
        let mut state = GameState::new();
        for (a, b) in [(0, 4), (4, 8), (4, 2)] {
            state.select(a).unwrap();
            state.select(b).unwrap();
        }
        let mv = *state.pending_collapse().unwrap();

        let record = state
            .apply_collapse(mv, CollapseOutcome::First, remote())
            .unwrap();

        assert_eq!(record.cell, 4);
        assert_eq!(state.board().classical(4), Some(Player::X));
        assert!(state.board().occupancy(mv.label).is_empty());
        assert_eq!(
            record.displaced,
            vec![MoveLabel::new(Player::X, 1), MoveLabel::new(Player::O, 2)]
        );
        assert!(state.board().get(4).unwrap().quantum().is_empty());
        assert_eq!(state.current_player(), Player::O);
        assert_eq!(state.move_number(), 4);
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_apply_collapse_rejects_corrupt_occupancy() {
        let mut state = GameState::new();
        let mv = QuantumMove::new(MoveLabel::new(Player::X, 3), [0, 1]);
        let result = state.apply_collapse(mv, CollapseOutcome::First, remote());
        assert!(matches!(result, Err(EngineError::InvariantViolation(_))));
        assert_eq!(state.board(), &Board::new());
    }

    #[test]
    fn test_evaluate_outcome_row_win() {
        let mut board = Board::new();
        for idx in [0, 1, 2] {
            board.set_classical(idx, Player::X).unwrap();
        }
        let mut state = GameState::with_board(board);

        let outcome = state.evaluate_outcome();

        assert_eq!(
            outcome,
            Some(Outcome::Winner {
                player: Player::X,
                line: [0, 1, 2]
            })
        );
        assert!(!state.game_active());
        assert_eq!(state.phase(), Phase::Finished);
        assert_eq!(
            state.select(5),
            Err(EngineError::IllegalSelection(SelectionRejection::GameOver))
        );
    }

    #[test]
    fn test_evaluate_outcome_draw() {
        use Player::{O, X};
        let mut board = Board::new();
        for (idx, player) in [X, O, X, O, X, X, O, X, O].into_iter().enumerate() {
            board.set_classical(idx, player).unwrap();
        }
        let mut state = GameState::with_board(board);

        assert_eq!(state.evaluate_outcome(), Some(Outcome::Draw));
        assert!(!state.game_active());
    }

    #[test]
    fn test_resolved_cell_cannot_be_selected() {
        let mut board = Board::new();
        board.set_classical(3, Player::O).unwrap();
        let mut state = GameState::with_board(board);
        assert_eq!(
            state.select(3),
            Err(EngineError::IllegalSelection(SelectionRejection::CellResolved(3)))
        );
    }
}
