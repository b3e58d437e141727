//! Training infrastructure: game orchestration, replay buffer, metrics
//! collection, and the training loop driver.

pub mod episode;
pub mod metrics;
pub mod replay;
pub mod trainer;

pub use episode::{play_game, GameRecord};
pub use metrics::{GameResult, TrainingMetrics};
pub use replay::ReplayBuffer;
pub use trainer::{Trainer, TrainerConfig};
