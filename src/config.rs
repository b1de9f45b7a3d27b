//! Keep-Awake Configuration
//!
//! Loaded from an optional TOML file. Only the bounds of the randomized
//! fallback interval and the simulated text are tunable.

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Lowest interval bound accepted for the fallback tick
pub const MIN_INTERVAL_FLOOR_MS: u64 = 1_000;
/// Highest interval bound accepted for the fallback tick
pub const MAX_INTERVAL_CEILING_MS: u64 = 60_000;

/// Default simulated activity text
pub const DEFAULT_PATTERN: &str = "PseudoSAP activity simulation... All systems nominal... ";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeepAwakeConfig {
    /// Application name reported to the platform
    pub app_name: String,
    /// Human readable reason reported to the platform
    pub reason: String,
    /// Whether the native screen lock may be requested at all
    pub native: bool,
    /// Fallback simulation settings
    pub fallback: FallbackConfig,
}

impl Default for KeepAwakeConfig {
    fn default() -> Self {
        Self {
            app_name: "PseudoSAP".to_string(),
            reason: "Keeping the screen awake".to_string(),
            native: true,
            fallback: FallbackConfig::default(),
        }
    }
}

/// Fallback simulation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
    /// Cyclic text appended one character per tick
    pub pattern: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 3_000,
            max_interval_ms: 5_000,
            pattern: DEFAULT_PATTERN.to_string(),
        }
    }
}

impl FallbackConfig {
    /// Draw a tick period uniformly from the configured bounds
    pub fn draw_interval(&self) -> Duration {
        let ms = rand::rng().random_range(self.min_interval_ms..=self.max_interval_ms);
        Duration::from_millis(ms)
    }
}

impl KeepAwakeConfig {
    /// Load configuration from a TOML file, or defaults if no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                debug!("Loaded config from {:?}", path);
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check interval bounds and pattern
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fallback = &self.fallback;

        if fallback.min_interval_ms < MIN_INTERVAL_FLOOR_MS {
            return Err(ConfigError::InvalidInterval(format!(
                "min_interval_ms must be at least {}",
                MIN_INTERVAL_FLOOR_MS
            )));
        }
        if fallback.max_interval_ms > MAX_INTERVAL_CEILING_MS {
            return Err(ConfigError::InvalidInterval(format!(
                "max_interval_ms must be at most {}",
                MAX_INTERVAL_CEILING_MS
            )));
        }
        if fallback.min_interval_ms > fallback.max_interval_ms {
            return Err(ConfigError::InvalidInterval(format!(
                "min_interval_ms ({}) exceeds max_interval_ms ({})",
                fallback.min_interval_ms, fallback.max_interval_ms
            )));
        }
        if fallback.pattern.is_empty() {
            return Err(ConfigError::EmptyPattern);
        }

        Ok(())
    }
}
