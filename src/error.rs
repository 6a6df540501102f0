//! Error types of the crate.

use std::path::PathBuf;

/// A move request that was rejected. The board is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidMove {
    #[error("column {column} is out of range (board has {width} columns)")]
    ColumnOutOfRange { column: usize, width: usize },

    #[error("column {column} is full")]
    ColumnFull { column: usize },

    #[error("the game is already over")]
    GameOver,

    #[error("it is not this side's turn")]
    OutOfTurn,
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
    Parse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
