//! Error types
//!
//! Only configuration and persistence problems are errors. Illegal moves are
//! silent no-ops and internal inconsistencies panic.

/// Core error type for the engine and its host glue.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    /// Mode name did not match any known mode
    #[error("unknown game mode '{0}'")]
    UnknownMode(String),

    /// A stored snapshot could not be turned back into a game
    #[error("corrupt snapshot under '{key}': {reason}")]
    CorruptSnapshot { key: String, reason: String },

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type used throughout the crate.
pub type GameResult<T> = Result<T, GameError>;
