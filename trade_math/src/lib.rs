//! # Trade Math
//!
//! Numerical primitives behind the price forecasting models.
//! Every series transform here takes a slice of prices and returns a vector of
//! the same length, with `f64::NAN` marking positions where the transform is
//! not yet defined (warm-up windows and similar).

use thiserror::Error;

// Indicator modules
pub mod linalg;
pub mod moving_averages;
pub mod oscillators;
pub mod regression;

/// Errors that can occur in trading-related calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for trading math operations
pub type Result<T> = std::result::Result<T, MathError>;
