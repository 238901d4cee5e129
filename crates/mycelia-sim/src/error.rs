//! Error types for the simulator.

use mycelia_dynamics::ConfigError;
use thiserror::Error;

/// Result type for simulator operations.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors that stop a simulation before it starts.
#[derive(Debug, Error)]
pub enum SimError {
    /// Engine parameters out of range
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Configuration file unreadable
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file malformed
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
