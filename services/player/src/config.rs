//! services/player/src/config.rs
//!
//! Defines the player's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use crate::engine::state::EngineSettings;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub course_path: PathBuf,
    pub log_level: Level,
    pub controls_hide_delay: Duration,
    pub skip_seconds: f64,
    pub autoplay_next: bool,
    pub sim_tick: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let course_path = lookup("COURSE_PATH")
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::MissingVar("COURSE_PATH".to_string()))?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Engine Settings ---
        let controls_hide_delay =
            Duration::from_millis(parse_or(&lookup, "CONTROLS_HIDE_DELAY_MS", 3_000u64)?);

        let skip_seconds: f64 = parse_or(&lookup, "SKIP_SECONDS", 10.0)?;
        if !skip_seconds.is_finite() || skip_seconds <= 0.0 {
            return Err(ConfigError::InvalidValue(
                "SKIP_SECONDS".to_string(),
                format!("'{}' must be a positive number", skip_seconds),
            ));
        }

        let autoplay_next = parse_or(&lookup, "AUTOPLAY_NEXT", false)?;

        // --- Simulated Media Settings ---
        let sim_tick = Duration::from_millis(parse_or(&lookup, "SIM_TICK_MS", 250u64)?);
        if sim_tick.is_zero() {
            return Err(ConfigError::InvalidValue(
                "SIM_TICK_MS".to_string(),
                "tick interval must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            course_path,
            log_level,
            controls_hide_delay,
            skip_seconds,
            autoplay_next,
            sim_tick,
        })
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            controls_hide_delay: self.controls_hide_delay,
            skip_seconds: self.skip_seconds,
            autoplay_next: self.autoplay_next,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}
