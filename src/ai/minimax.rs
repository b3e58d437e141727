use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game::{GameState, Side};

use super::agent::Agent;
use super::heuristic::{Heuristic, StreakHeuristic};

/// Full-width minimax searcher over game states.
///
/// The searcher is constructed for one fixed perspective side; nodes where
/// that side is to move maximize, all others minimize. The side to move is
/// threaded explicitly through the recursion rather than derived from depth
/// parity, so a search entered from either side stays correct.
pub struct MinimaxSearcher {
    perspective: Side,
    heuristic: Box<dyn Heuristic>,
    rng: StdRng,
}

impl MinimaxSearcher {
    pub fn new(perspective: Side) -> Self {
        MinimaxSearcher {
            perspective,
            heuristic: Box::new(StreakHeuristic::new()),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic tie-breaking for tests.
    pub fn with_seed(perspective: Side, seed: u64) -> Self {
        MinimaxSearcher {
            perspective,
            heuristic: Box::new(StreakHeuristic::new()),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_heuristic(perspective: Side, heuristic: Box<dyn Heuristic>) -> Self {
        MinimaxSearcher {
            perspective,
            heuristic,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Search `depth` plies ahead with `side_to_move` acting first.
    ///
    /// Leaf values (depth 0 or no legal column) are always taken from the
    /// perspective side fixed at construction, so values compare coherently
    /// across levels of the tree. Returns `(None, leaf value)` at a leaf;
    /// `None` means "no move available", not an error. Among moves with
    /// exactly equal optimal value, one is chosen uniformly at random.
    pub fn best_move(
        &mut self,
        depth: usize,
        state: &GameState,
        side_to_move: Side,
    ) -> (Option<usize>, f64) {
        let legal = state.legal_actions();

        if depth == 0 || legal.is_empty() {
            let value = self
                .heuristic
                .evaluate(state.board(), self.perspective, state.streak());
            return (None, value);
        }

        let mut move_values = Vec::with_capacity(legal.len());
        for &col in &legal {
            // Legal columns of a non-terminal state cannot fail to apply.
            let next = state
                .apply_move(col)
                .expect("legal column must be playable");
            let (_, value) = self.best_move(depth - 1, &next, side_to_move.other());
            move_values.push((col, value));
        }

        let maximizing = side_to_move == self.perspective;
        let best_value = move_values
            .iter()
            .map(|&(_, v)| v)
            .fold(if maximizing { f64::NEG_INFINITY } else { f64::INFINITY }, |acc, v| {
                if maximizing {
                    acc.max(v)
                } else {
                    acc.min(v)
                }
            });

        // Exact equality on purpose: the tie set is "same computed value",
        // not "close enough".
        let tie: Vec<usize> = move_values
            .iter()
            .filter(|&&(_, v)| v == best_value)
            .map(|&(col, _)| col)
            .collect();
        let chosen = tie[self.rng.random_range(0..tie.len())];

        (Some(chosen), best_value)
    }

    /// Values of every legal move at the root, for inspecting the tie set.
    #[cfg(test)]
    fn root_move_values(&mut self, depth: usize, state: &GameState) -> Vec<(usize, f64)> {
        let side = state.current_side();
        state
            .legal_actions()
            .iter()
            .map(|&col| {
                let next = state.apply_move(col).unwrap();
                let (_, value) = self.best_move(depth - 1, &next, side.other());
                (col, value)
            })
            .collect()
    }
}

/// Agent wrapper around [`MinimaxSearcher`] with a fixed search depth.
pub struct MinimaxAgent {
    searcher: MinimaxSearcher,
    depth: usize,
}

impl MinimaxAgent {
    pub fn new(side: Side, depth: usize) -> Self {
        MinimaxAgent {
            searcher: MinimaxSearcher::new(side),
            depth,
        }
    }

    pub fn with_seed(side: Side, depth: usize, seed: u64) -> Self {
        MinimaxAgent {
            searcher: MinimaxSearcher::with_seed(side, seed),
            depth,
        }
    }
}

impl Agent for MinimaxAgent {
    fn select_action(&mut self, state: &GameState, _training: bool) -> usize {
        let side = state.current_side();
        let (action, _) = self.searcher.best_move(self.depth, state, side);
        action.expect("select_action called with no legal actions")
    }

    fn name(&self) -> &str {
        "Minimax"
    }
}
