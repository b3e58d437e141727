//! Training loop: plays the learner against a fixed opponent, runs batched
//! value updates whenever enough transitions have accumulated, and reports
//! rolling metrics, greedy evaluations, and periodic table checkpoints.

use std::fs;
use std::path::PathBuf;

use crate::ai::{Agent, QLearningAgent, RandomAgent};
use crate::checkpoint::save_value_table;
use crate::error::TrainingError;
use crate::game::{Rules, Side};
use crate::training::episode::play_game;
use crate::training::metrics::{GameResult, TrainingMetrics};

/// Trainer configuration. Intervals are in games; an interval of zero
/// disables that activity.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub num_games: usize,
    pub log_interval: usize,
    pub eval_interval: usize,
    pub eval_games: usize,
    pub checkpoint_interval: usize,
    pub checkpoint_path: PathBuf,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            num_games: 10_000,
            log_interval: 100,
            eval_interval: 500,
            eval_games: 100,
            checkpoint_interval: 1000,
            checkpoint_path: PathBuf::from("checkpoints/q_table.json"),
        }
    }
}

/// Drives training of a [`QLearningAgent`] against an opponent agent.
pub struct Trainer {
    config: TrainerConfig,
    rules: Rules,
}

impl Trainer {
    pub fn new(config: TrainerConfig, rules: Rules) -> Self {
        Trainer { config, rules }
    }

    /// Run the full training loop. The learner keeps the side it was
    /// created with; the opponent plays the other one.
    pub fn train(
        &self,
        agent: &mut QLearningAgent,
        opponent: &mut dyn Agent,
    ) -> Result<TrainingMetrics, TrainingError> {
        let mut metrics = TrainingMetrics::new();
        let side = agent.side();

        println!(
            "Training {} ({}) vs {} for {} games...",
            agent.name(),
            side.name(),
            opponent.name(),
            self.config.num_games
        );
        println!("-------------------------------------------");

        for game in 1..=self.config.num_games {
            agent.reset();
            opponent.reset();
            let record = self.play(agent, opponent, true)?;
            let reward = agent.sum_reward();

            metrics.record_game(GameResult {
                winner: record.winner,
                game_length: record.moves,
                reward,
            });

            if agent.is_updatable() {
                let summary = agent.update()?;
                metrics.record_update(summary.mean_abs_delta);
            }

            if self.config.log_interval > 0 && game % self.config.log_interval == 0 {
                let window = self.config.log_interval;
                println!(
                    "Game {}/{} | eps: {:.3} | states: {} | delta: {:.5} | win_rate({}): {:.1}% | draw: {:.1}% | avg_len: {:.1} | avg_reward: {:.3}",
                    game,
                    self.config.num_games,
                    agent.epsilon(),
                    agent.states_seen(),
                    metrics.average_delta(window),
                    window,
                    metrics.win_rate(side, window) * 100.0,
                    metrics.draw_rate(window) * 100.0,
                    metrics.average_game_length(window),
                    metrics.average_reward(window),
                );
            }

            if self.config.eval_interval > 0 && game % self.config.eval_interval == 0 {
                let win_rate = self.evaluate(agent)?;
                println!(
                    "  >> Eval vs Random ({} games): {:.1}% win rate",
                    self.config.eval_games,
                    win_rate * 100.0
                );
            }

            if self.config.checkpoint_interval > 0 && game % self.config.checkpoint_interval == 0 {
                match self.save_checkpoint(agent) {
                    Ok(()) => println!(
                        "  >> Checkpoint saved: {}",
                        self.config.checkpoint_path.display()
                    ),
                    Err(e) => eprintln!("  >> Checkpoint failed: {e}"),
                }
            }
        }

        println!("-------------------------------------------");
        println!("Training complete. Total games: {}", metrics.total_games());

        if self.config.eval_games > 0 {
            let final_wr = self.evaluate(agent)?;
            println!("Final eval vs Random: {:.1}% win rate", final_wr * 100.0);
        }

        Ok(metrics)
    }

    /// Greedy win rate against a random opponent over `eval_games`.
    /// Epsilon is zeroed for the duration and restored afterwards; no
    /// transitions are recorded.
    pub fn evaluate(&self, agent: &mut QLearningAgent) -> Result<f64, TrainingError> {
        let mut random = RandomAgent::new();
        let side = agent.side();

        let saved_epsilon = agent.epsilon();
        agent.set_epsilon(0.0);

        let mut wins = 0;
        for _ in 0..self.config.eval_games {
            let record = self.play(agent, &mut random, false)?;
            if record.winner == Some(side) {
                wins += 1;
            }
        }

        agent.set_epsilon(saved_epsilon);
        Ok(wins as f64 / self.config.eval_games as f64)
    }

    fn play(
        &self,
        agent: &mut QLearningAgent,
        opponent: &mut dyn Agent,
        training: bool,
    ) -> Result<crate::training::episode::GameRecord, TrainingError> {
        match agent.side() {
            Side::X => play_game(agent, opponent, self.rules, training),
            Side::O => play_game(opponent, agent, self.rules, training),
        }
    }

    fn save_checkpoint(&self, agent: &QLearningAgent) -> Result<(), crate::error::CheckpointError> {
        if let Some(parent) = self.config.checkpoint_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        save_value_table(agent, self.rules, &self.config.checkpoint_path)
    }
}
