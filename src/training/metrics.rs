use std::collections::VecDeque;

use crate::game::Side;

/// Result of a single training game.
pub struct GameResult {
    pub winner: Option<Side>,
    pub game_length: usize,
    pub reward: f64,
}

/// Training metrics tracker with rolling window computations.
pub struct TrainingMetrics {
    game_results: VecDeque<GameResult>,
    update_deltas: VecDeque<f64>,
    capacity: usize,
    total_games: usize, // lifetime count, never capped
}

impl TrainingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        TrainingMetrics {
            game_results: VecDeque::with_capacity(capacity),
            update_deltas: VecDeque::with_capacity(capacity),
            capacity,
            total_games: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn record_game(&mut self, result: GameResult) {
        self.total_games += 1;
        self.game_results.push_back(result);
        if self.game_results.len() > self.capacity {
            self.game_results.pop_front();
        }
    }

    pub fn record_update(&mut self, mean_abs_delta: f64) {
        self.update_deltas.push_back(mean_abs_delta);
        if self.update_deltas.len() > self.capacity {
            self.update_deltas.pop_front();
        }
    }

    /// Win rate for `side` in the last N games.
    pub fn win_rate(&self, side: Side, last_n: usize) -> f64 {
        let n = self.game_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let wins = self
            .game_results
            .iter()
            .rev()
            .take(n)
            .filter(|r| r.winner == Some(side))
            .count();
        wins as f64 / n as f64
    }

    /// Draw rate in the last N games.
    pub fn draw_rate(&self, last_n: usize) -> f64 {
        let n = self.game_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let draws = self
            .game_results
            .iter()
            .rev()
            .take(n)
            .filter(|r| r.winner.is_none())
            .count();
        draws as f64 / n as f64
    }

    /// Average accumulated reward over the last N games.
    pub fn average_reward(&self, last_n: usize) -> f64 {
        let n = self.game_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let sum: f64 = self.game_results.iter().rev().take(n).map(|r| r.reward).sum();
        sum / n as f64
    }

    /// Average update magnitude over the last N batch updates.
    pub fn average_delta(&self, last_n: usize) -> f64 {
        let n = self.update_deltas.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let sum: f64 = self.update_deltas.iter().rev().take(n).sum();
        sum / n as f64
    }

    /// Average game length over the last N games.
    pub fn average_game_length(&self, last_n: usize) -> f64 {
        let n = self.game_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: usize = self
            .game_results
            .iter()
            .rev()
            .take(n)
            .map(|r| r.game_length)
            .sum();
        total as f64 / n as f64
    }

    pub fn total_games(&self) -> usize {
        self.total_games
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(winner: Option<Side>, game_length: usize, reward: f64) -> GameResult {
        GameResult {
            winner,
            game_length,
            reward,
        }
    }

    #[test]
    fn test_win_rate() {
        let mut m = TrainingMetrics::new();
        for _ in 0..7 {
            m.record_game(game(Some(Side::X), 10, 1.0));
        }
        for _ in 0..3 {
            m.record_game(game(Some(Side::O), 10, -1.0));
        }
        assert!((m.win_rate(Side::X, 10) - 0.7).abs() < 1e-12);
        assert!((m.win_rate(Side::O, 10) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_draw_rate() {
        let mut m = TrainingMetrics::new();
        m.record_game(game(None, 42, 0.0));
        m.record_game(game(Some(Side::X), 10, 1.0));
        assert!((m.draw_rate(10) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_average_reward_and_delta() {
        let mut m = TrainingMetrics::new();
        m.record_game(game(Some(Side::X), 10, 2.0));
        m.record_game(game(Some(Side::O), 12, -1.0));
        assert!((m.average_reward(10) - 0.5).abs() < 1e-12);

        m.record_update(1.0);
        m.record_update(3.0);
        assert!((m.average_delta(10) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_average_game_length() {
        let mut m = TrainingMetrics::new();
        m.record_game(game(None, 20, 0.0));
        m.record_game(game(None, 30, 0.0));
        assert!((m.average_game_length(10) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_window_caps_but_lifetime_count_does_not() {
        let mut m = TrainingMetrics::with_capacity(2);
        for i in 0..5 {
            m.record_game(game(Some(Side::X), i, 0.0));
        }
        assert_eq!(m.total_games(), 5);
        // Only the last two games remain in the window.
        assert!((m.average_game_length(100) - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_window_returns_zero() {
        let m = TrainingMetrics::new();
        assert_eq!(m.win_rate(Side::X, 10), 0.0);
        assert_eq!(m.draw_rate(10), 0.0);
        assert_eq!(m.average_game_length(10), 0.0);
    }
}
