use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::controller::FirstMover;
use crate::error::ConfigError;
use crate::game::SERIES_LEN;

/// Top-level game configuration, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub first_mover: FirstMover,
    pub board: BoardConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub rows: usize,
    pub cols: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self { rows: 6, cols: 7 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search depth limit in plies.
    pub depth: usize,
    /// The search gives up after this many seconds.
    pub time_budget_secs: f64,
    /// Maximum number of transposition memo entries per game.
    pub memo_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: 6,
            time_budget_secs: 0.8,
            memo_capacity: 1_000_000,
        }
    }
}

impl SearchConfig {
    /// The time budget as a [`Duration`]. Rejects values that are not
    /// positive or do not fit into a [`Duration`].
    pub fn time_budget(&self) -> Result<Duration, ConfigError> {
        match Duration::try_from_secs_f64(self.time_budget_secs) {
            Ok(budget) if !budget.is_zero() => Ok(budget),
            _ => Err(ConfigError::Validation(format!(
                "search.time_budget_secs must be a positive number of seconds, got {}",
                self.time_budget_secs
            ))),
        }
    }
}

impl GameConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!(
                "config file '{}' not found, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Parse and validate TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.depth == 0 {
            return Err(ConfigError::Validation(
                "search.depth must be >= 1".into(),
            ));
        }
        self.search.time_budget()?;
        if self.search.memo_capacity == 0 {
            return Err(ConfigError::Validation(
                "search.memo_capacity must be >= 1".into(),
            ));
        }
        if self.board.rows < SERIES_LEN || self.board.cols < SERIES_LEN {
            return Err(ConfigError::Validation(format!(
                "board must be at least {SERIES_LEN}x{SERIES_LEN}"
            )));
        }
        Ok(())
    }
}
