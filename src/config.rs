//! Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::scoring::ScoringTable;

/// Errors raised while loading a [`ScoutConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed JSON.
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// File could not be read.
    #[error("config read error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsed but semantically invalid.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for a scouting session.
///
/// ```
/// use volleyscout::config::ScoutConfig;
///
/// let cfg = ScoutConfig::from_json_str(r#"{ "roster_size": 7 }"#).expect("config");
/// assert_eq!(cfg.roster_size, Some(7));
/// assert!(cfg.cancel_selection_on_substitution);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    /// Skill scoring rules.
    pub scoring: ScoringTable,
    /// Cancel any half-made selection on substitution. When false, only a selection
    /// holding the outgoing player is cancelled.
    pub cancel_selection_on_substitution: bool,
    /// Exact on-court roster size, if enforced.
    pub roster_size: Option<usize>,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringTable::default(),
            cancel_selection_on_substitution: true,
            roster_size: None,
        }
    }
}

impl ScoutConfig {
    /// Parses and validates a JSON document; missing fields take defaults.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads and parses a JSON file.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.roster_size == Some(0) {
            return Err(ConfigError::Invalid("roster_size must be positive".to_string()));
        }
        Ok(())
    }
}
