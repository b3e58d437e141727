use crate::game::{count_streaks, Board, Side};

/// Score awarded for a completed winning streak. Dominates any combination
/// of sub-winning alignments.
pub const WIN_SCORE: f64 = 1e20;

/// Sentinel returned when the opponent already has a winning streak.
pub const LOSS_SCORE: f64 = -1e10;

/// Trait for evaluating a board position from a side's perspective.
pub trait Heuristic: Send {
    fn evaluate(&self, board: &Board, side: Side, streak: usize) -> f64;
}

/// Streak-count evaluator.
///
/// Each run length from 2 up to `streak - 1` is weighted geometrically
/// (`base^(length - 2)`), own counts minus opponent counts, so one extra
/// longer alignment always outweighs any number of shorter ones for
/// reasonable board sizes. A completed own streak adds [`WIN_SCORE`]; an
/// opponent streak clamps the whole score to [`LOSS_SCORE`].
pub struct StreakHeuristic {
    base: f64,
}

impl StreakHeuristic {
    pub fn new() -> Self {
        StreakHeuristic { base: 100.0 }
    }

    pub fn with_base(base: f64) -> Self {
        StreakHeuristic { base }
    }
}

impl Default for StreakHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl Heuristic for StreakHeuristic {
    fn evaluate(&self, board: &Board, side: Side, streak: usize) -> f64 {
        let opponent = side.other();
        let mut value = 0.0;

        for length in 2..streak {
            let weight = self.base.powi((length - 2) as i32);
            value += count_streaks(board, side, length) as f64 * weight;
            value -= count_streaks(board, opponent, length) as f64 * weight;
        }

        if count_streaks(board, side, streak) > 0 {
            value += WIN_SCORE;
        }
        if count_streaks(board, opponent, streak) > 0 {
            value = LOSS_SCORE;
        }

        value
    }
}
