//! Planner configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// An error that occurs while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot load the configuration file: {0}")]
    FileLoad(#[from] std::io::Error),

    #[error("Cannot read the configuration file: {0}")]
    Deserialise(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// The top level configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The arc length at which the track wraps back to zero, in m.
    pub max_s: f64,
    /// The planner parameters.
    pub planner: PlannerConfig,
}

/// The parameters of the planner loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// The time between consecutive path points in s.
    pub tick_interval: f64,
    /// Re-plan once fewer than this many path points remain unconsumed.
    pub min_buffer_points: usize,
    /// The number of points in the initial plan.
    pub seed_points: usize,
    /// The distance the initial plan advances along the track in m.
    pub seed_distance: f64,
    /// The number of points appended by each re-plan.
    pub replan_points: usize,
    /// The distance each re-plan advances along the track in m.
    pub replan_distance: f64,
    /// The speed every plan ends at, in m/s.
    pub cruise_speed: f64,
    /// The lateral offset every plan ends at, in m.
    pub target_d: f64,
    /// Derive the host's Frenet coordinates from its pose instead of trusting telemetry.
    pub recompute_host_frenet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_s: 6945.554,
            planner: Default::default(),
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            tick_interval: 0.02,
            min_buffer_points: 50,
            seed_points: 225,
            seed_distance: 40.0,
            replan_points: 100,
            replan_distance: 40.0,
            cruise_speed: 20.0,
            target_d: 6.0,
            recompute_host_frenet: false,
        }
    }
}

impl Config {
    /// Loads and validates a TOML configuration file.
    /// Keys missing from the file take their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Parses and validates a TOML configuration.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every parameter is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_s.is_finite() && self.max_s > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "max_s must be positive, found {}",
                self.max_s
            )));
        }
        self.planner.validate()
    }
}

impl PlannerConfig {
    /// The duration of the initial plan in s.
    pub fn seed_horizon(&self) -> f64 {
        self.seed_points as f64 * self.tick_interval
    }

    /// The duration of each re-planned segment in s.
    pub fn replan_horizon(&self) -> f64 {
        self.replan_points as f64 * self.tick_interval
    }

    /// Checks that every parameter is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("tick_interval", self.tick_interval),
            ("seed_distance", self.seed_distance),
            ("replan_distance", self.replan_distance),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be positive, found {}",
                    name, value
                )));
            }
        }
        for (name, value) in [("cruise_speed", self.cruise_speed), ("target_d", self.target_d)] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "{} must be finite, found {}",
                    name, value
                )));
            }
        }
        if self.cruise_speed < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "cruise_speed must not be negative, found {}",
                self.cruise_speed
            )));
        }
        for (name, value) in [
            ("seed_points", self.seed_points),
            ("replan_points", self.replan_points),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{} must be at least 1", name)));
            }
            // A single segment must refill an exhausted buffer
            if value < self.min_buffer_points {
                return Err(ConfigError::Invalid(format!(
                    "{} must be at least min_buffer_points ({}), found {}",
                    name, self.min_buffer_points, value
                )));
            }
        }
        Ok(())
    }
}
