//! Tabular Q-learning agent: epsilon-greedy policy over a sparse value
//! table keyed by the canonical board encoding, streak-difference reward
//! shaping, and a running-average batched update fed from a replay buffer.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::QTableError;
use crate::game::{count_streaks, Board, GameState, Rules, Side};
use crate::training::replay::ReplayBuffer;

use super::agent::Agent;
use super::state_encoding::{decode_board, encode_board, StateKey};

/// One observed transition, stored in encoded form so later board mutation
/// can never retroactively alter it.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: StateKey,
    pub action: usize,
    pub next_state: StateKey,
    pub reward: f64,
    pub terminal: bool,
}

/// Q-learning hyperparameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct QConfig {
    pub discount: f64,
    pub epsilon_start: f64,
    pub epsilon_min: f64,
    pub epsilon_decay: f64,
    pub replay_capacity: usize,
    pub batch_size: usize,
    /// Terminal rewards for win / loss / tie.
    pub reward_win: f64,
    pub reward_lose: f64,
    pub reward_tie: f64,
    /// Per-length bases for the shaped reward: own progress is weighted by
    /// `shaping_own_base^(i+1) / shaping_scale`, opponent progress by the
    /// mirror with `shaping_opp_base`.
    pub shaping_own_base: f64,
    pub shaping_opp_base: f64,
    pub shaping_scale: f64,
}

impl Default for QConfig {
    fn default() -> Self {
        QConfig {
            discount: 0.99,
            epsilon_start: 1.0,
            epsilon_min: 0.03,
            epsilon_decay: 0.999,
            replay_capacity: 1_000_000,
            batch_size: 5_000,
            reward_win: 1.0,
            reward_lose: 1.0,
            reward_tie: 0.0,
            shaping_own_base: 25.0,
            shaping_opp_base: 20.0,
            shaping_scale: 50.0,
        }
    }
}

/// Streak-difference reward shaping, shared by the tabular and
/// approximator agents so both see the same reward signal.
#[derive(Debug, Clone)]
pub struct RewardShaper {
    side: Side,
    rules: Rules,
    reward_win: f64,
    reward_lose: f64,
    reward_tie: f64,
    own_base: f64,
    opp_base: f64,
    scale: f64,
}

impl RewardShaper {
    /// Shaper with the default shaping constants.
    pub fn new(side: Side, rules: Rules) -> Self {
        Self::from_config(side, rules, &QConfig::default())
    }

    pub fn from_config(side: Side, rules: Rules, config: &QConfig) -> Self {
        RewardShaper {
            side,
            rules,
            reward_win: config.reward_win,
            reward_lose: config.reward_lose,
            reward_tie: config.reward_tie,
            own_base: config.shaping_own_base,
            opp_base: config.shaping_opp_base,
            scale: config.shaping_scale,
        }
    }

    /// Shaped reward for one half-move transition.
    ///
    /// Terminal rewards dominate; otherwise the reward is the change in
    /// sub-winning streak counts for this side minus the opponent's, each
    /// length weighted geometrically so reward and heuristic agree in sign.
    pub fn calc_reward(
        &self,
        board: &Board,
        next_board: &Board,
        terminal: bool,
        winner: Option<Side>,
    ) -> f64 {
        if terminal {
            return match winner {
                Some(w) if w == self.side => self.reward_win,
                Some(_) => -self.reward_lose,
                None => self.reward_tie,
            };
        }

        let opponent = self.side.other();
        let mut reward = 0.0;
        for (i, length) in (2..=self.rules.streak).enumerate() {
            let own_diff = count_streaks(next_board, self.side, length) as f64
                - count_streaks(board, self.side, length) as f64;
            let opp_diff = count_streaks(next_board, opponent, length) as f64
                - count_streaks(board, opponent, length) as f64;
            let exp = (i + 1) as i32;
            reward += own_diff * self.own_base.powi(exp) / self.scale;
            reward -= opp_diff * self.opp_base.powi(exp) / self.scale;
        }
        reward
    }
}

/// Summary of one batched value update.
#[derive(Debug, Clone, Default)]
pub struct UpdateSummary {
    pub transitions_processed: usize,
    pub mean_abs_delta: f64,
    pub epsilon_after: f64,
}

/// Tabular Q-learning agent for one fixed side.
pub struct QLearningAgent {
    side: Side,
    rules: Rules,
    config: QConfig,
    q: HashMap<StateKey, HashMap<usize, f64>>,
    visits: HashMap<StateKey, u64>,
    epsilon: f64,
    buffer: ReplayBuffer<Transition>,
    transition_counter: usize,
    shaper: RewardShaper,
    /// Board and action captured at move time, consumed by `observe`.
    pending: Option<(Board, usize)>,
    sum_reward: f64,
    rng: StdRng,
}

impl QLearningAgent {
    pub fn new(side: Side, rules: Rules, config: QConfig) -> Self {
        let epsilon = config.epsilon_start;
        let buffer = ReplayBuffer::new(config.replay_capacity);
        let shaper = RewardShaper::from_config(side, rules, &config);
        QLearningAgent {
            side,
            rules,
            config,
            q: HashMap::new(),
            visits: HashMap::new(),
            epsilon,
            buffer,
            transition_counter: 0,
            shaper,
            pending: None,
            sum_reward: 0.0,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic exploration and sampling for tests.
    pub fn with_seed(side: Side, rules: Rules, config: QConfig, seed: u64) -> Self {
        let mut agent = Self::new(side, rules, config);
        agent.buffer =
            ReplayBuffer::with_seed(agent.config.replay_capacity, seed ^ 0x9e3779b97f4a7c15);
        agent.rng = StdRng::seed_from_u64(seed);
        agent
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Set epsilon directly (e.g. 0.0 for greedy evaluation).
    pub fn set_epsilon(&mut self, eps: f64) {
        self.epsilon = eps;
    }

    pub fn states_seen(&self) -> usize {
        self.q.len()
    }

    /// Cumulative shaped reward since the last `reset`.
    pub fn sum_reward(&self) -> f64 {
        self.sum_reward
    }

    /// True once enough transitions have accumulated since the last update.
    pub fn is_updatable(&self) -> bool {
        self.transition_counter >= self.config.batch_size
    }

    /// Epsilon-greedy action choice. Unseen states fall back to uniform
    /// exploration; among exactly-equal maxima the choice is uniform.
    fn pick_action(&mut self, state: &GameState, training: bool) -> usize {
        let actions = state.legal_actions();
        assert!(!actions.is_empty(), "No legal actions available");

        let explore = training && self.rng.random_range(0.0..1.0) < self.epsilon;
        let key = encode_board(state.board());

        let entries = match self.q.get(&key) {
            Some(entries) if !explore && !entries.is_empty() => entries,
            _ => return actions[self.rng.random_range(0..actions.len())],
        };

        let mut best = f64::NEG_INFINITY;
        for &value in entries.values() {
            if value > best {
                best = value;
            }
        }
        // Exact equality: the tie set is "same stored value".
        let tie: Vec<usize> = entries
            .iter()
            .filter(|&(_, &v)| v == best)
            .map(|(&a, _)| a)
            .collect();
        tie[self.rng.random_range(0..tie.len())]
    }

    /// Shaped reward for one half-move transition. See [`RewardShaper`].
    pub fn calc_reward(
        &self,
        board: &Board,
        next_board: &Board,
        terminal: bool,
        winner: Option<Side>,
    ) -> f64 {
        self.shaper.calc_reward(board, next_board, terminal, winner)
    }

    /// Register a state in the table if unseen, initializing an entry of
    /// 0.0 for every column legal on the decoded board.
    fn register_state(&mut self, key: &StateKey) -> Result<(), QTableError> {
        if self.q.contains_key(key) {
            return Ok(());
        }
        let board = decode_board(key, self.rules.width, self.rules.height)?;
        let entries: HashMap<usize, f64> = board
            .available_columns()
            .into_iter()
            .map(|col| (col, 0.0))
            .collect();
        self.q.insert(key.clone(), entries);
        Ok(())
    }

    /// Run the running-average value update over one sampled batch, then
    /// decay epsilon and re-arm the update gate.
    ///
    /// Errors: `InsufficientData` from sampling is returned to the caller
    /// as recoverable; a missing action entry is a decoding/legality
    /// mismatch and is surfaced rather than defaulted.
    pub fn update(&mut self) -> Result<UpdateSummary, crate::error::TrainingError> {
        let batch = self.buffer.sample(self.config.batch_size)?;

        let mut total_abs_delta = 0.0;
        for transition in &batch {
            self.apply_transition(transition, &mut total_abs_delta)?;
        }

        if self.epsilon > self.config.epsilon_min {
            self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
        }
        self.transition_counter = 0;

        Ok(UpdateSummary {
            transitions_processed: batch.len(),
            mean_abs_delta: total_abs_delta / batch.len() as f64,
            epsilon_after: self.epsilon,
        })
    }

    fn apply_transition(
        &mut self,
        transition: &Transition,
        total_abs_delta: &mut f64,
    ) -> Result<(), QTableError> {
        self.register_state(&transition.state)?;
        self.register_state(&transition.next_state)?;

        let count = self.visits.entry(transition.state.clone()).or_insert(0);
        *count += 1;
        let count = *count;

        let target = if transition.terminal {
            transition.reward
        } else {
            let next_entries = &self.q[&transition.next_state];
            let max_next = next_entries
                .values()
                .fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
            let max_next = if next_entries.is_empty() { 0.0 } else { max_next };
            transition.reward + self.config.discount * max_next
        };

        let entries = self
            .q
            .get_mut(&transition.state)
            .expect("state registered above");
        let value = entries
            .get_mut(&transition.action)
            .ok_or(QTableError::MissingActionValue {
                action: transition.action,
            })?;
        let delta = (target - *value) / count as f64;
        *value += delta;
        *total_abs_delta += delta.abs();
        Ok(())
    }

    /// Direct table access for persistence.
    pub(crate) fn table(&self) -> (&HashMap<StateKey, HashMap<usize, f64>>, &HashMap<StateKey, u64>) {
        (&self.q, &self.visits)
    }

    pub(crate) fn restore_table(
        &mut self,
        q: HashMap<StateKey, HashMap<usize, f64>>,
        visits: HashMap<StateKey, u64>,
        epsilon: f64,
    ) {
        self.q = q;
        self.visits = visits;
        self.epsilon = epsilon;
    }
}

impl Agent for QLearningAgent {
    fn select_action(&mut self, state: &GameState, training: bool) -> usize {
        let action = self.pick_action(state, training);
        // Evaluation games leave no trace in the replay buffer.
        if training {
            self.pending = Some((state.board().clone(), action));
        }
        action
    }

    fn observe(&mut self, next_state: &GameState, terminal: bool, winner: Option<Side>) {
        let Some((board, action)) = self.pending.take() else {
            return;
        };
        let reward = self.calc_reward(&board, next_state.board(), terminal, winner);
        self.sum_reward += reward;

        self.buffer.push(Transition {
            state: encode_board(&board),
            action,
            next_state: encode_board(next_state.board()),
            reward,
            terminal,
        });
        self.transition_counter += 1;
    }

    fn name(&self) -> &str {
        "Q-learning"
    }

    fn reset(&mut self) {
        self.sum_reward = 0.0;
        self.pending = None;
    }
}
