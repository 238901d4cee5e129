//! Startup configuration errors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// A parameter that makes the engine meaningless. Fatal at startup; never
/// raised once cycles are running.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{name} must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("bulwark degree band is empty: min {min} > max {max}")]
    EmptyBulwarkBand { min: usize, max: usize },
}
