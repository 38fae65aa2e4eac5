//! Level name to starting move budget.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Represents errors raised while looking up or loading levels.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Unknown level '{0}'.")]
    UnknownLevel(String),
    #[error("Invalid level registry: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Maps each level name to the moves the player starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelRegistry {
    budgets: BTreeMap<String, i32>,
}

impl Default for LevelRegistry {
    fn default() -> Self {
        LevelRegistry {
            budgets: BTreeMap::from([
                ("game1.txt".to_string(), 7),
                ("game2.txt".to_string(), 12),
                ("game3.txt".to_string(), 19),
            ]),
        }
    }
}

impl LevelRegistry {
    /// Reads a registry from a JSON object such as `{"game1.txt": 7}`.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Starting budget for `level`.
    pub fn budget(&self, level: &str) -> Result<i32, RegistryError> {
        self.budgets
            .get(level)
            .copied()
            .ok_or_else(|| RegistryError::UnknownLevel(level.to_string()))
    }

    /// Level names in sorted order.
    pub fn levels(&self) -> impl Iterator<Item = &str> {
        self.budgets.keys().map(String::as_str)
    }
}
