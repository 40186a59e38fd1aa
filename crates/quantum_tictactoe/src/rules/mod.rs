//! Game rules for quantum tic-tac-toe.
//!
//! Pure functions over the classical layer of the board. Superposed moves
//! never count toward a line or a draw.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::{LINES, check_winner};
