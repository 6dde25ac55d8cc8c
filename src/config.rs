use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::protocol::UniformJitter;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Lower bound of the periodic re-advertisement delay.
    pub advertise_min_ms: u64,
    /// Upper bound of the periodic re-advertisement delay.
    pub advertise_max_ms: u64,
    /// How long stopping a router waits for its advertiser task.
    pub stop_timeout_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            advertise_min_ms: 5_000,   // 5 seconds
            advertise_max_ms: 15_000,  // 15 seconds
            stop_timeout_ms: 1_000,
        }
    }
}

impl SimulationConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: SimulationConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.advertise_min_ms > self.advertise_max_ms {
            return Err(ConfigError::InvalidWindow {
                min_ms: self.advertise_min_ms,
                max_ms: self.advertise_max_ms,
            });
        }
        Ok(())
    }

    pub fn schedule(&self) -> UniformJitter {
        UniformJitter::new(
            Duration::from_millis(self.advertise_min_ms),
            Duration::from_millis(self.advertise_max_ms),
        )
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}
