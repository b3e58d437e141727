use std::path::Path;

use crate::ai::approximator::ApproximatorConfig;
use crate::ai::qlearning::QConfig;
use crate::error::ConfigError;
use crate::game::Rules;
use crate::training::trainer::TrainerConfig;

/// Minimax search settings.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Lookahead depth in half-moves.
    pub depth: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig { depth: 4 }
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: Rules,
    pub q: QConfig,
    pub approximator: ApproximatorConfig,
    pub search: SearchConfig,
    pub training: TrainerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            eprintln!(
                "Warning: config file '{}' not found, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.game.width == 0 || self.game.height == 0 {
            return Err(ConfigError::Validation(
                "game.width and game.height must be > 0".into(),
            ));
        }
        // Board dimensions travel in single-byte headers of the state key.
        if self.game.width > 255 || self.game.height > 255 {
            return Err(ConfigError::Validation(
                "game.width and game.height must be <= 255".into(),
            ));
        }
        if self.game.streak < 2 {
            return Err(ConfigError::Validation("game.streak must be >= 2".into()));
        }
        if self.game.streak > self.game.width.max(self.game.height) {
            return Err(ConfigError::Validation(
                "game.streak must fit on the board".into(),
            ));
        }

        if self.q.discount < 0.0 || self.q.discount > 1.0 {
            return Err(ConfigError::Validation("q.discount must be in [0, 1]".into()));
        }
        if self.q.epsilon_start < 0.0 || self.q.epsilon_start > 1.0 {
            return Err(ConfigError::Validation(
                "q.epsilon_start must be in [0, 1]".into(),
            ));
        }
        if self.q.epsilon_min < 0.0 || self.q.epsilon_min > 1.0 {
            return Err(ConfigError::Validation(
                "q.epsilon_min must be in [0, 1]".into(),
            ));
        }
        if self.q.epsilon_min > self.q.epsilon_start {
            return Err(ConfigError::Validation(
                "q.epsilon_min must be <= q.epsilon_start".into(),
            ));
        }
        if self.q.epsilon_decay <= 0.0 || self.q.epsilon_decay > 1.0 {
            return Err(ConfigError::Validation(
                "q.epsilon_decay must be in (0, 1]".into(),
            ));
        }
        if self.q.batch_size == 0 {
            return Err(ConfigError::Validation("q.batch_size must be > 0".into()));
        }
        if self.q.replay_capacity < self.q.batch_size {
            return Err(ConfigError::Validation(
                "q.replay_capacity must be >= q.batch_size".into(),
            ));
        }
        if self.q.shaping_scale <= 0.0 {
            return Err(ConfigError::Validation(
                "q.shaping_scale must be > 0".into(),
            ));
        }

        if self.approximator.discount < 0.0 || self.approximator.discount > 1.0 {
            return Err(ConfigError::Validation(
                "approximator.discount must be in [0, 1]".into(),
            ));
        }
        if self.approximator.batch_size == 0 {
            return Err(ConfigError::Validation(
                "approximator.batch_size must be > 0".into(),
            ));
        }
        if self.approximator.replay_capacity < self.approximator.batch_size {
            return Err(ConfigError::Validation(
                "approximator.replay_capacity must be >= approximator.batch_size".into(),
            ));
        }
        if self.approximator.sync_mix < 0.0 || self.approximator.sync_mix > 1.0 {
            return Err(ConfigError::Validation(
                "approximator.sync_mix must be in [0, 1]".into(),
            ));
        }
        if self.approximator.sync_interval == 0 {
            return Err(ConfigError::Validation(
                "approximator.sync_interval must be >= 1".into(),
            ));
        }

        if self.search.depth == 0 {
            return Err(ConfigError::Validation("search.depth must be >= 1".into()));
        }

        if self.training.num_games == 0 {
            return Err(ConfigError::Validation(
                "training.num_games must be > 0".into(),
            ));
        }
        if self.training.eval_interval > 0 && self.training.eval_games == 0 {
            return Err(ConfigError::Validation(
                "training.eval_games must be >= 1 when eval_interval is set".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}
