//! Configuration loading and typed config structures for the robot factory.
//!
//! The canonical configuration lives in `factory-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.

use std::path::Path;

use serde::Deserialize;

use factory_robots::{EconomyConfig, RobotError};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The values parsed but are unusable.
    #[error("invalid config: {source}")]
    Invalid {
        /// The validation failure.
        source: RobotError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level factory configuration.
///
/// Mirrors the structure of `factory-config.yaml`. Every field has a default,
/// so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FactoryConfig {
    /// Fleet and run-loop settings.
    #[serde(default)]
    pub factory: FactorySettings,

    /// Action durations, odds and prices.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Items and currency present before the first tick.
    #[serde(default)]
    pub starting_stock: StartingStock,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FactoryConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values are unusable.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values are unusable.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.economy
            .validate()
            .map_err(|source| ConfigError::Invalid { source })?;
        if self.factory.max_name_attempts == Some(0) {
            return Err(ConfigError::Invalid {
                source: RobotError::InvalidConfig {
                    reason: String::from("max_name_attempts must be at least 1"),
                },
            });
        }
        Ok(())
    }
}

/// Fleet and run-loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FactorySettings {
    /// Display name of the factory.
    #[serde(default = "default_name")]
    pub name: String,

    /// Robots created before the first tick.
    #[serde(default = "default_seed_robots")]
    pub seed_robots: u32,

    /// Milliseconds between fleet updates.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Stop after this many updates (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Seed for all random draws. Absent means seed from entropy.
    #[serde(default)]
    pub rng_seed: Option<u64>,

    /// Give up naming a robot after this many collisions. Absent means
    /// retry until a unique name is found.
    #[serde(default)]
    pub max_name_attempts: Option<u32>,

    /// Fleet size that wins the game (0 = no victory condition).
    #[serde(default = "default_victory_robots")]
    pub victory_robots: u32,

    /// End the run once victory is reached.
    #[serde(default = "default_stop_on_victory")]
    pub stop_on_victory: bool,
}

impl Default for FactorySettings {
    fn default() -> Self {
        Self {
            name: default_name(),
            seed_robots: default_seed_robots(),
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: 0,
            rng_seed: None,
            max_name_attempts: None,
            victory_robots: default_victory_robots(),
            stop_on_victory: default_stop_on_victory(),
        }
    }
}

/// Items and currency present before the first tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct StartingStock {
    /// Unused Foo.
    #[serde(default)]
    pub foo: u32,
    /// Unused Bar.
    #[serde(default)]
    pub bar: u32,
    /// Unsold Foobar.
    #[serde(default)]
    pub foobar: u32,
    /// Currency balance.
    #[serde(default)]
    pub currency: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

const fn default_victory_robots() -> u32 {
    30
}

const fn default_stop_on_victory() -> bool {
    true
}

fn default_name() -> String {
    String::from("Foobar Factory")
}

const fn default_seed_robots() -> u32 {
    2
}

const fn default_tick_interval_ms() -> u64 {
    100
}

fn default_log_level() -> String {
    String::from("info")
}
