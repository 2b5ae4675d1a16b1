//! TOML-based application configuration.
//!
//! Stores user preferences for step tracking and workouts.
//! Configuration is stored at `~/.config/fittrack/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;

/// Step-tracking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Daily step goal shown against the accumulated total.
    #[serde(default = "default_step_goal")]
    pub daily_step_goal: u32,
}

/// Workout timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutConfig {
    /// Countdown duration used when `timer start` gives no explicit one.
    #[serde(default = "default_workout_min")]
    pub default_duration_min: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub workout: WorkoutConfig,
}

fn default_step_goal() -> u32 {
    10_000
}

fn default_workout_min() -> u32 {
    30
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            daily_step_goal: default_step_goal(),
        }
    }
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            default_duration_min: default_workout_min(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracking: TrackingConfig::default(),
            workout: WorkoutConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, std::io::Error> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing defaults on first run.
    ///
    /// # Errors
    /// Returns an error if an existing file cannot be parsed or the
    /// default config cannot be written.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
