//! Error types for the price_forecast crate

use thiserror::Error;
use trade_math::MathError;

/// Custom error types for the price_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// No observations were supplied
    #[error("Empty price series")]
    EmptySeries,

    /// Two inputs that must line up do not
    #[error("Length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A model key that no model answers to
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Error from the numerical primitives
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Error from JSON (de)serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
