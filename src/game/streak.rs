//! Streak detection: counts runs of same-side pieces in the four alignment
//! directions. Pure functions over a board; the evaluator, the reward
//! shaping, and terminal detection are all built on these.

use super::board::Board;
use super::side::Side;

/// Count runs of at least `length` consecutive `side` cells.
///
/// Every cell belonging to `side` is treated as a potential run start and
/// each of the four directions (up, right, up-right, down-right) is scanned
/// independently; a scan stops at the board edge or the first non-matching
/// cell. Overlapping starts along a longer run each count, so the result is
/// not deduplicated — callers that only need existence should use
/// [`has_streak`], which is unaffected by the double counting.
pub fn count_streaks(board: &Board, side: Side, length: usize) -> usize {
    let cell = side.to_cell();
    let mut count = 0;
    for row in 0..board.height() {
        for col in 0..board.width() {
            if board.get(row, col) != cell {
                continue;
            }
            if run_up(board, row, col, length) {
                count += 1;
            }
            if run_right(board, row, col, length) {
                count += 1;
            }
            if run_diagonal_up(board, row, col, length) {
                count += 1;
            }
            if run_diagonal_down(board, row, col, length) {
                count += 1;
            }
        }
    }
    count
}

/// True iff `side` has at least one run of `length`. Terminal detection for
/// the win length is `has_streak(board, mover, k)` right after the mover's
/// piece lands.
pub fn has_streak(board: &Board, side: Side, length: usize) -> bool {
    count_streaks(board, side, length) > 0
}

fn run_up(board: &Board, row: usize, col: usize, length: usize) -> bool {
    let cell = board.get(row, col);
    let mut consecutive = 0;
    for r in row..board.height() {
        if board.get(r, col) == cell {
            consecutive += 1;
        } else {
            break;
        }
    }
    consecutive >= length
}

fn run_right(board: &Board, row: usize, col: usize, length: usize) -> bool {
    let cell = board.get(row, col);
    let mut consecutive = 0;
    for c in col..board.width() {
        if board.get(row, c) == cell {
            consecutive += 1;
        } else {
            break;
        }
    }
    consecutive >= length
}

/// Positive-slope diagonal: up and to the right from the start.
fn run_diagonal_up(board: &Board, row: usize, col: usize, length: usize) -> bool {
    let cell = board.get(row, col);
    let mut consecutive = 0;
    for i in 0..length {
        if row + i >= board.height() || col + i >= board.width() {
            break;
        }
        if board.get(row + i, col + i) == cell {
            consecutive += 1;
        } else {
            break;
        }
    }
    consecutive >= length
}

/// Negative-slope diagonal: down and to the right from the start.
fn run_diagonal_down(board: &Board, row: usize, col: usize, length: usize) -> bool {
    let cell = board.get(row, col);
    let mut consecutive = 0;
    for i in 0..length {
        if i > row || col + i >= board.width() {
            break;
        }
        if board.get(row - i, col + i) == cell {
            consecutive += 1;
        } else {
            break;
        }
    }
    consecutive >= length
}
