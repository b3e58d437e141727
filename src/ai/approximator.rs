//! Boundary for gradient-based value estimators. The estimator internals
//! (architecture, optimizer) live outside this crate; the core defines the
//! contract and the training control flow that consumes it: epsilon-greedy
//! action choice over legal-masked predictions, replay-fed target
//! computation with a slowly-tracking target estimator, and periodic
//! parameter blending.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::TrainingError;
use crate::game::{GameState, Rules, Side};
use crate::training::replay::ReplayBuffer;

use super::agent::Agent;
use super::qlearning::{RewardShaper, Transition};
use super::state_encoding::{decode_board, encode_board};

/// External value-estimator contract.
pub trait FunctionApproximator {
    /// Per-action scores for a batch of states; each inner vector has one
    /// entry per column.
    fn predict(&self, states: &[GameState]) -> Vec<Vec<f64>>;

    /// One gradient step toward `targets` for the given state/action pairs.
    /// Returns the scalar batch loss.
    fn train_step(&mut self, states: &[GameState], actions: &[usize], targets: &[f64]) -> f64;

    /// Convex blend of this estimator's parameters toward `source`:
    /// `theta = mix * theta_source + (1 - mix) * theta`.
    fn sync_from(&mut self, source: &Self, mix: f64);
}

/// Hyperparameters for the approximator-backed agent.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ApproximatorConfig {
    pub discount: f64,
    pub epsilon_start: f64,
    pub epsilon_min: f64,
    pub epsilon_decay: f64,
    pub replay_capacity: usize,
    pub batch_size: usize,
    /// Target estimator blend factor applied every `sync_interval` updates.
    pub sync_mix: f64,
    pub sync_interval: usize,
}

impl Default for ApproximatorConfig {
    fn default() -> Self {
        ApproximatorConfig {
            discount: 0.95,
            epsilon_start: 1.0,
            epsilon_min: 0.0,
            epsilon_decay: 0.999,
            replay_capacity: 500_000,
            batch_size: 5_000,
            sync_mix: 0.05,
            sync_interval: 1,
        }
    }
}

/// Agent with the QLearningAgent's external contract, delegating value
/// estimation to a policy/target estimator pair.
pub struct ApproximatorAgent<F: FunctionApproximator> {
    side: Side,
    rules: Rules,
    config: ApproximatorConfig,
    policy: F,
    target: F,
    buffer: ReplayBuffer<Transition>,
    epsilon: f64,
    transition_counter: usize,
    update_counter: usize,
    shaper: RewardShaper,
    pending: Option<(GameState, usize)>,
    rng: StdRng,
}

impl<F: FunctionApproximator> ApproximatorAgent<F> {
    /// `policy` and `target` should start from identical parameters.
    pub fn new(side: Side, rules: Rules, config: ApproximatorConfig, policy: F, target: F) -> Self {
        let epsilon = config.epsilon_start;
        let buffer = ReplayBuffer::new(config.replay_capacity);
        ApproximatorAgent {
            side,
            rules,
            config,
            policy,
            target,
            buffer,
            epsilon,
            transition_counter: 0,
            update_counter: 0,
            shaper: RewardShaper::new(side, rules),
            pending: None,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(
        side: Side,
        rules: Rules,
        config: ApproximatorConfig,
        policy: F,
        target: F,
        seed: u64,
    ) -> Self {
        let mut agent = Self::new(side, rules, config, policy, target);
        agent.rng = StdRng::seed_from_u64(seed);
        agent.buffer = ReplayBuffer::with_seed(agent.config.replay_capacity, seed.rotate_left(17));
        agent
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn is_updatable(&self) -> bool {
        self.transition_counter >= self.config.batch_size
    }

    fn pick_action(&mut self, state: &GameState, training: bool) -> usize {
        let legal = state.legal_actions();
        assert!(!legal.is_empty(), "No legal actions available");

        if training && self.rng.random_range(0.0..1.0) < self.epsilon {
            return legal[self.rng.random_range(0..legal.len())];
        }

        let scores = &self.policy.predict(std::slice::from_ref(state))[0];
        let mut best_action = legal[0];
        let mut best_score = f64::NEG_INFINITY;
        for &col in &legal {
            if scores[col] > best_score {
                best_score = scores[col];
                best_action = col;
            }
        }
        best_action
    }

    /// One training update: sample a batch, build targets with the target
    /// estimator restricted to legal next-state actions, step the policy
    /// estimator, then periodically blend the target toward the policy.
    pub fn update(&mut self) -> Result<f64, TrainingError> {
        let batch = self.buffer.sample(self.config.batch_size)?;

        let mut states = Vec::with_capacity(batch.len());
        let mut next_states = Vec::with_capacity(batch.len());
        for t in &batch {
            states.push(self.decode_state(&t.state)?);
            next_states.push(self.decode_state(&t.next_state)?);
        }
        let actions: Vec<usize> = batch.iter().map(|t| t.action).collect();

        let next_scores = self.target.predict(&next_states);
        let targets: Vec<f64> = batch
            .iter()
            .zip(&next_states)
            .zip(&next_scores)
            .map(|((t, next), scores)| {
                if t.terminal {
                    t.reward
                } else {
                    let legal = next.legal_actions();
                    let max_next = legal
                        .iter()
                        .map(|&col| scores[col])
                        .fold(f64::NEG_INFINITY, f64::max);
                    let max_next = if legal.is_empty() { 0.0 } else { max_next };
                    t.reward + self.config.discount * max_next
                }
            })
            .collect();

        let loss = self.policy.train_step(&states, &actions, &targets);

        self.update_counter += 1;
        if self.update_counter % self.config.sync_interval == 0 {
            self.target.sync_from(&self.policy, self.config.sync_mix);
        }

        if self.epsilon > self.config.epsilon_min {
            self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
        }
        self.transition_counter = 0;

        Ok(loss)
    }

    fn decode_state(&self, key: &[u8]) -> Result<GameState, TrainingError> {
        let board = decode_board(key, self.rules.width, self.rules.height)
            .map_err(crate::error::QTableError::Encoding)?;
        Ok(GameState::from_board(board, self.rules.streak, self.side))
    }
}

impl<F: FunctionApproximator> Agent for ApproximatorAgent<F> {
    fn select_action(&mut self, state: &GameState, training: bool) -> usize {
        let action = self.pick_action(state, training);
        if training {
            self.pending = Some((state.clone(), action));
        }
        action
    }

    fn observe(&mut self, next_state: &GameState, terminal: bool, winner: Option<Side>) {
        let Some((state, action)) = self.pending.take() else {
            return;
        };
        let reward = self
            .shaper
            .calc_reward(state.board(), next_state.board(), terminal, winner);

        self.buffer.push(Transition {
            state: encode_board(state.board()),
            action,
            next_state: encode_board(next_state.board()),
            reward,
            terminal,
        });
        self.transition_counter += 1;
    }

    fn name(&self) -> &str {
        "Approximator"
    }

    fn reset(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameOutcome;

    /// Linear-in-nothing stub: a fixed per-column score vector standing in
    /// for a real network. `train_step` records the call; `sync_from`
    /// blends the score vectors, which is enough to exercise the control
    /// flow.
    #[derive(Clone)]
    struct StubEstimator {
        scores: Vec<f64>,
        train_calls: usize,
        last_targets: Vec<f64>,
    }

    impl StubEstimator {
        fn new(scores: Vec<f64>) -> Self {
            StubEstimator {
                scores,
                train_calls: 0,
                last_targets: Vec::new(),
            }
        }
    }

    impl FunctionApproximator for StubEstimator {
        fn predict(&self, states: &[GameState]) -> Vec<Vec<f64>> {
            states.iter().map(|_| self.scores.clone()).collect()
        }

        fn train_step(
            &mut self,
            states: &[GameState],
            actions: &[usize],
            targets: &[f64],
        ) -> f64 {
            assert_eq!(states.len(), actions.len());
            assert_eq!(states.len(), targets.len());
            self.train_calls += 1;
            self.last_targets = targets.to_vec();
            0.25
        }

        fn sync_from(&mut self, source: &Self, mix: f64) {
            for (own, &src) in self.scores.iter_mut().zip(&source.scores) {
                *own = mix * src + (1.0 - mix) * *own;
            }
        }
    }

    fn rules() -> Rules {
        Rules::new(3, 3, 3)
    }

    fn make_agent(config: ApproximatorConfig, scores: Vec<f64>) -> ApproximatorAgent<StubEstimator> {
        ApproximatorAgent::with_seed(
            Side::X,
            rules(),
            config,
            StubEstimator::new(scores.clone()),
            StubEstimator::new(scores),
            13,
        )
    }

    #[test]
    fn test_greedy_respects_legality_mask() {
        // Column 1 has the best score but is full; the agent must fall
        // back to the best legal column.
        let mut state = GameState::initial(rules());
        for col in [1, 1, 1] {
            state = state.apply_move(col).unwrap();
        }
        let mut agent = make_agent(
            ApproximatorConfig {
                epsilon_start: 0.0,
                ..ApproximatorConfig::default()
            },
            vec![0.3, 9.0, 0.7],
        );
        assert_eq!(agent.select_action(&state, true), 2);
    }

    #[test]
    fn test_update_builds_targets_from_target_estimator() {
        let config = ApproximatorConfig {
            discount: 0.5,
            batch_size: 1,
            epsilon_start: 1.0,
            ..ApproximatorConfig::default()
        };
        let mut agent = make_agent(config, vec![2.0, 1.0, 0.0]);

        let state = GameState::initial(rules());
        let action = agent.select_action(&state, true);
        let next = state.apply_move(action).unwrap();
        agent.observe(&next, false, None);

        let loss = agent.update().unwrap();
        assert_eq!(loss, 0.25);
        assert_eq!(agent.policy.train_calls, 1);
        // Non-terminal: target = reward + 0.5 * max legal target score (2.0).
        let target = agent.policy.last_targets[0];
        let reward = RewardShaper::new(Side::X, rules()).calc_reward(
            state.board(),
            next.board(),
            false,
            None,
        );
        assert!((target - (reward + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_terminal_target_is_raw_reward() {
        let config = ApproximatorConfig {
            batch_size: 1,
            ..ApproximatorConfig::default()
        };
        let mut agent = make_agent(config, vec![5.0, 5.0, 5.0]);

        // X wins in column 1 on the 3x3 board.
        let mut state = GameState::initial(rules());
        for col in [1, 0, 1, 0] {
            state = state.apply_move(col).unwrap();
        }
        let action = 1;
        agent.pending = Some((state.clone(), action));
        let next = state.apply_move(action).unwrap();
        assert_eq!(next.outcome(), Some(GameOutcome::Winner(Side::X)));
        agent.observe(&next, true, Some(Side::X));

        agent.update().unwrap();
        assert_eq!(agent.policy.last_targets[0], 1.0);
    }

    #[test]
    fn test_sync_blends_target_toward_policy() {
        let config = ApproximatorConfig {
            batch_size: 1,
            sync_mix: 0.5,
            sync_interval: 1,
            ..ApproximatorConfig::default()
        };
        let mut agent = make_agent(config, vec![0.0, 0.0, 0.0]);
        agent.policy.scores = vec![4.0, 4.0, 4.0];

        let state = GameState::initial(rules());
        let action = agent.select_action(&state, true);
        let next = state.apply_move(action).unwrap();
        agent.observe(&next, false, None);
        agent.update().unwrap();

        assert_eq!(agent.target.scores, vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_update_without_data_is_recoverable() {
        let mut agent = make_agent(ApproximatorConfig::default(), vec![0.0, 0.0, 0.0]);
        let err = agent.update().unwrap_err();
        assert!(matches!(
            err,
            TrainingError::Replay(crate::error::ReplayError::InsufficientData { .. })
        ));
    }
}
