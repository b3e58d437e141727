//! Core Connect-N game logic: board representation, sides, streak
//! detection, and the game state machine with immutable transitions.

mod board;
mod side;
mod state;
pub mod streak;

pub use board::{Board, Cell, MoveError as BoardMoveError};
pub use side::Side;
pub use state::{GameOutcome, GameState, MoveError, Rules};
pub use streak::{count_streaks, has_streak};
