//! Configuration for the terminal game session.

use crate::error::ServerError;
use derive_getters::Getters;
use derive_more::{Display, Error};
use quantum_tictactoe::{EngineSettings, SeedStrategy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Environment variable overriding the measurement backend URL.
pub const MEASUREMENT_URL_VAR: &str = "QTTT_MEASUREMENT_URL";

/// Game session configuration, loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Base URL of the measurement backend; offline when unset.
    #[serde(default)]
    measurement_url: Option<String>,

    /// Milliseconds to wait for a measurement before falling back.
    #[serde(default = "default_timeout_ms")]
    measurement_timeout_ms: u64,

    /// Base seed passed to the measurement source; clock-derived when unset.
    #[serde(default)]
    seed: Option<u64>,

    /// Seed for the fallback coin; random when unset.
    #[serde(default)]
    fallback_seed: Option<u64>,
}

#[instrument]
fn default_timeout_ms() -> u64 {
    5000
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            measurement_url: None,
            measurement_timeout_ms: default_timeout_ms(),
            seed: None,
            fallback_seed: None,
        }
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(measurement_url = ?config.measurement_url, "Config loaded successfully");
        Ok(config)
    }

    /// Loads the file if it exists, otherwise defaults, then applies the
    /// `QTTT_MEASUREMENT_URL` environment override.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = if path.as_ref().exists() {
            Self::from_file(path)?
        } else {
            debug!("No config file, using defaults");
            Self::default()
        };
        if let Ok(url) = std::env::var(MEASUREMENT_URL_VAR) {
            debug!(%url, "Measurement URL from environment");
            config.measurement_url = Some(url);
        }
        Ok(config)
    }

    /// Overrides the measurement URL.
    pub fn with_measurement_url(mut self, url: Option<String>) -> Self {
        if url.is_some() {
            self.measurement_url = url;
        }
        self
    }

    /// Overrides the measurement seed.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        if seed.is_some() {
            self.seed = seed;
        }
        self
    }

    /// Measurement timeout as a duration.
    pub fn measurement_timeout(&self) -> Duration {
        Duration::from_millis(self.measurement_timeout_ms)
    }

    /// Engine settings derived from this configuration.
    pub fn engine_settings(&self) -> EngineSettings {
        let seed = match self.seed {
            Some(base) => SeedStrategy::Fixed(base),
            None => SeedStrategy::Clock,
        };
        EngineSettings::default()
            .with_seed(seed)
            .with_fallback_seed(self.fallback_seed)
            .with_measurement_timeout(self.measurement_timeout())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<ConfigError> for ServerError {
    #[track_caller]
    fn from(err: ConfigError) -> Self {
        ServerError::new(err.message)
    }
}
