use super::streak::has_streak;
use super::{Board, Side};

/// Game rules fixed per game instance: board dimensions and the run length
/// required to win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Rules {
    pub width: usize,
    pub height: usize,
    pub streak: usize,
}

impl Rules {
    pub fn new(width: usize, height: usize, streak: usize) -> Self {
        Rules {
            width,
            height,
            streak,
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            width: 7,
            height: 6,
            streak: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(Side),
    Draw,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    ColumnFull,
    InvalidColumn,
    GameOver,
}

/// Full game state: board, rules, side to move, and cached outcome.
///
/// Transitions are immutable: `apply_move` clones the board, so exploring a
/// hypothetical continuation never mutates a state the caller still holds.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    board: Board,
    rules: Rules,
    current_side: Side,
    outcome: Option<GameOutcome>,
}

impl GameState {
    /// Create the initial state for a game under `rules`. X moves first.
    pub fn initial(rules: Rules) -> Self {
        GameState {
            board: Board::new(rules.width, rules.height),
            rules,
            current_side: Side::X,
            outcome: None,
        }
    }

    pub fn current_side(&self) -> Side {
        self.current_side
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    /// Win length for this game.
    pub fn streak(&self) -> usize {
        self.rules.streak
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    /// Legal columns (not full), ascending. Empty once the game is over.
    pub fn legal_actions(&self) -> Vec<usize> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.board.available_columns()
    }

    /// Apply a move and return the new state.
    ///
    /// The mover wins if the drop completes a streak of the configured
    /// length; the game draws when the board fills with no streak.
    pub fn apply_move(&self, column: usize) -> Result<GameState, MoveError> {
        if self.is_terminal() {
            return Err(MoveError::GameOver);
        }

        let mut new_board = self.board.clone();
        new_board
            .drop_piece(column, self.current_side)
            .map_err(|e| match e {
                super::board::MoveError::ColumnFull => MoveError::ColumnFull,
                super::board::MoveError::InvalidColumn => MoveError::InvalidColumn,
            })?;

        let outcome = if has_streak(&new_board, self.current_side, self.rules.streak) {
            Some(GameOutcome::Winner(self.current_side))
        } else if new_board.is_full() {
            Some(GameOutcome::Draw)
        } else {
            None
        };

        Ok(GameState {
            board: new_board,
            rules: self.rules,
            current_side: self.current_side.other(),
            outcome,
        })
    }

    /// Rebuild a state around an existing board, recomputing the outcome.
    /// Used when decoding stored states from the value table.
    pub fn from_board(board: Board, streak: usize, current_side: Side) -> Self {
        let outcome = if has_streak(&board, Side::X, streak) {
            Some(GameOutcome::Winner(Side::X))
        } else if has_streak(&board, Side::O, streak) {
            Some(GameOutcome::Winner(Side::O))
        } else if board.is_full() {
            Some(GameOutcome::Draw)
        } else {
            None
        };
        let rules = Rules::new(board.width(), board.height(), streak);
        GameState {
            board,
            rules,
            current_side,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Cell;

    fn small_rules() -> Rules {
        Rules::new(3, 3, 3)
    }

    #[test]
    fn test_initial_state() {
        let state = GameState::initial(Rules::default());
        assert_eq!(state.current_side(), Side::X);
        assert!(!state.is_terminal());
        assert_eq!(state.legal_actions().len(), 7);
    }

    #[test]
    fn test_apply_move_alternates_sides() {
        let state = GameState::initial(Rules::default());
        let next = state.apply_move(3).unwrap();

        assert_eq!(next.current_side(), Side::O);
        assert_eq!(next.board().get(0, 3), Cell::X);
        // The original state is untouched.
        assert_eq!(state.board().get(0, 3), Cell::Empty);
    }

    #[test]
    fn test_vertical_win_small_board() {
        // X plays column 1 three times; O plays column 0 and never blocks.
        let mut state = GameState::initial(small_rules());
        state = state.apply_move(1).unwrap(); // X
        state = state.apply_move(0).unwrap(); // O
        state = state.apply_move(1).unwrap(); // X
        state = state.apply_move(0).unwrap(); // O
        state = state.apply_move(1).unwrap(); // X wins

        assert!(state.is_terminal());
        assert_eq!(state.outcome(), Some(GameOutcome::Winner(Side::X)));
        assert!(state.legal_actions().is_empty());
    }

    #[test]
    fn test_move_after_game_over() {
        let mut state = GameState::initial(small_rules());
        for col in [1, 0, 1, 0, 1] {
            state = state.apply_move(col).unwrap();
        }
        assert_eq!(state.apply_move(2), Err(MoveError::GameOver));
    }

    #[test]
    fn test_draw_on_full_board() {
        // 3x3, k=3, fill pattern with no three-in-a-row anywhere:
        //   row 2:  O X O
        //   row 1:  X O X
        //   row 0:  X O X
        let mut state = GameState::initial(small_rules());
        for col in [0, 1, 2, 1, 0, 0, 2, 2, 1] {
            state = state.apply_move(col).unwrap();
        }
        assert!(state.is_terminal());
        assert_eq!(state.outcome(), Some(GameOutcome::Draw));
    }

    #[test]
    fn test_from_board_recovers_outcome() {
        let mut board = Board::new(3, 3);
        for _ in 0..3 {
            board.drop_piece(0, Side::O).unwrap();
        }
        let state = GameState::from_board(board, 3, Side::X);
        assert_eq!(state.outcome(), Some(GameOutcome::Winner(Side::O)));
    }
}
