use serde::{Deserialize, Serialize};
use std::path::Path;

/// How sections that became visible get their content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationMode {
    /// Generate on the calling thread before `update` returns.
    #[default]
    Synchronous,
    /// Hand generation to a worker pool; results are adopted on later updates.
    Background { workers: usize },
}

/// Streaming configuration: visibility and retention radii, in sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Sections within this Chebyshev distance are visible.
    pub view_distance: i32,
    /// Sections within this distance are created (and possibly generated).
    pub load_distance: i32,
    /// Sections beyond this distance are evicted unless they lie ahead.
    pub save_distance: i32,
    /// Sections beyond this distance are always evicted.
    pub max_distance: i32,
    /// Non-visible sections generated ahead of time per update.
    pub preload_budget: usize,
    pub mode: GenerationMode,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            view_distance: 3,
            load_distance: 4,
            save_distance: 6,
            max_distance: 8,
            preload_budget: 8,
            mode: GenerationMode::Synchronous,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid stream config: {0}")]
    Invalid(String),
    #[error("failed to parse stream config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read stream config: {0}")]
    Io(#[from] std::io::Error),
}

impl StreamConfig {
    /// Check `0 <= view <= load <= save <= max` and a non-empty worker pool.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.view_distance < 0 {
            return Err(ConfigError::Invalid(format!(
                "view_distance must be non-negative, got {}",
                self.view_distance
            )));
        }
        let ladder = [
            ("view_distance", self.view_distance),
            ("load_distance", self.load_distance),
            ("save_distance", self.save_distance),
            ("max_distance", self.max_distance),
        ];
        for pair in ladder.windows(2) {
            let ((lo_name, lo), (hi_name, hi)) = (pair[0], pair[1]);
            if lo > hi {
                return Err(ConfigError::Invalid(format!(
                    "{lo_name} ({lo}) must not exceed {hi_name} ({hi})"
                )));
            }
        }
        if let GenerationMode::Background { workers: 0 } = self.mode {
            return Err(ConfigError::Invalid(
                "background generation needs at least one worker".into(),
            ));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: StreamConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
