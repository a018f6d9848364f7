//! services/player/src/error.rs
//!
//! Defines the error types for the player service.

use crate::config::ConfigError;
use lesson_player_core::{ports::PortError, CourseError, UnsupportedRate};

/// The primary error type for the `player` service.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// The supplied course cannot be presented.
    #[error("Course error: {0}")]
    Course(#[from] CourseError),

    /// A course fixture or host message was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Represents a standard Input/Output error (e.g., reading stdin).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// Commands the engine refuses to carry out.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("Unsupported playback rate: {0}")]
    UnsupportedPlaybackRate(f64),
}

impl From<UnsupportedRate> for EngineError {
    fn from(err: UnsupportedRate) -> Self {
        EngineError::UnsupportedPlaybackRate(err.0)
    }
}
