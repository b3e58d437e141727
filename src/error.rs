use std::path::PathBuf;

/// Errors from decoding a canonical state key back into a board.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("state key too short: {len} bytes")]
    Truncated { len: usize },

    #[error("state key dimensions {found_width}x{found_height} do not match configured {expected_width}x{expected_height}")]
    DimensionMismatch {
        expected_width: usize,
        expected_height: usize,
        found_width: usize,
        found_height: usize,
    },

    #[error("invalid cell byte {byte} at index {index}")]
    InvalidCell { byte: u8, index: usize },
}

/// Errors from the replay buffer.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReplayError {
    /// Recoverable: the caller waits for more transitions.
    #[error("insufficient data: requested batch of {requested}, buffer holds {available}")]
    InsufficientData { requested: usize, available: usize },
}

/// Errors from the tabular value-table update.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QTableError {
    /// A sampled transition referenced an action with no entry in its
    /// state's table. This indicates a mismatch between the state encoding
    /// and move legality, and must not be silently defaulted.
    #[error("no value entry for action {action} in a registered state")]
    MissingActionValue { action: usize },

    #[error("state key error: {0}")]
    Encoding(#[from] EncodingError),
}

/// Errors that can occur while running games.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    /// A correct agent never emits this; the round is aborted rather than
    /// substituting a move.
    #[error("agent selected illegal action {action} (legal: {legal:?})")]
    IllegalAction { action: usize, legal: Vec<usize> },

    #[error("game should be terminal but has no outcome")]
    MissingOutcome,

    /// Recoverable: propagated when an update is requested before the
    /// buffer holds a full batch.
    #[error("replay error: {0}")]
    Replay(#[from] ReplayError),

    #[error("value table error: {0}")]
    QTable(#[from] QTableError),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}

/// Errors that can occur during value-table persistence.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("checkpoint {path}: board is {found_width}x{found_height} streak {found_streak}, configuration wants {expected_width}x{expected_height} streak {expected_streak}")]
    StateKeyMismatch {
        path: PathBuf,
        expected_width: usize,
        expected_height: usize,
        expected_streak: usize,
        found_width: usize,
        found_height: usize,
        found_streak: usize,
    },

    #[error("state key error in checkpoint: {0}")]
    Encoding(#[from] EncodingError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
