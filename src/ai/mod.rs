//! Agents and decision logic: the agent trait, the streak-count heuristic,
//! minimax search, the tabular Q-learning agent, the canonical state
//! encoding, and the function-approximator boundary.

mod agent;
pub mod approximator;
pub mod heuristic;
pub mod minimax;
pub mod qlearning;
mod random;
pub mod state_encoding;

pub use agent::Agent;
pub use approximator::{ApproximatorAgent, ApproximatorConfig, FunctionApproximator};
pub use heuristic::{Heuristic, StreakHeuristic};
pub use minimax::{MinimaxAgent, MinimaxSearcher};
pub use qlearning::{QConfig, QLearningAgent, RewardShaper, Transition, UpdateSummary};
pub use random::RandomAgent;
pub use state_encoding::{decode_board, encode_board, StateKey};
