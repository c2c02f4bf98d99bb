//! Moving average models for price forecasting
//!
//! Both models treat the smoothed value at the last observation as the
//! forecast for the next step.

use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult};
use trade_math::moving_averages::{exponential_moving_average, moving_average};

/// Simple Moving Average model
#[derive(Debug, Clone)]
pub struct SimpleMA {
    /// Name of the model
    name: String,
    /// Window size
    window: usize,
}

/// Exponential Moving Average model
#[derive(Debug, Clone)]
pub struct ExponentialMA {
    /// Name of the model
    name: String,
    /// Smoothing factor
    alpha: f64,
}

impl SimpleMA {
    /// Create a new Simple Moving Average model
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(ForecastError::InvalidParameter(
                "Window size must be positive".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Simple Moving Average (window={})", window),
            window,
        })
    }

    /// Window size
    pub fn window(&self) -> usize {
        self.window
    }
}

impl ForecastModel for SimpleMA {
    fn fit(&self, series: &[f64]) -> Result<ForecastResult> {
        let values = moving_average(series, self.window)?;
        Ok(ForecastResult::from_trailing(values))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl ExponentialMA {
    /// Create a new Exponential Moving Average model
    pub fn new(alpha: f64) -> Result<Self> {
        if !alpha.is_finite() || alpha <= 0.0 || alpha > 1.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Alpha must be in (0, 1], got {}",
                alpha
            )));
        }

        Ok(Self {
            name: format!("Exponential Moving Average (alpha={:.4})", alpha),
            alpha,
        })
    }

    /// Smoothing factor
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl ForecastModel for ExponentialMA {
    fn fit(&self, series: &[f64]) -> Result<ForecastResult> {
        let values = exponential_moving_average(series, self.alpha)?;
        Ok(ForecastResult::from_trailing(values))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
