//! Sliding-window linear regression model

use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult};
use trade_math::regression::least_squares_predict;

/// Linear trend fitted over a trailing window and extrapolated one step
#[derive(Debug, Clone)]
pub struct LinearRegression {
    name: String,
    lookback: usize,
}

impl LinearRegression {
    /// Create a new model; `lookback` must be at least 2
    pub fn new(lookback: usize) -> Result<Self> {
        if lookback < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "Lookback must be at least 2 for linear regression, got {}",
                lookback
            )));
        }

        Ok(Self {
            name: format!("Linear Regression (lookback={})", lookback),
            lookback,
        })
    }

    /// Number of trailing points in each fit
    pub fn lookback(&self) -> usize {
        self.lookback
    }
}

impl ForecastModel for LinearRegression {
    fn fit(&self, series: &[f64]) -> Result<ForecastResult> {
        // Each position already holds the forecast for the position after it
        let values = least_squares_predict(series, self.lookback)?;
        Ok(ForecastResult::from_trailing(values))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_trend_extrapolation() {
        let series: Vec<f64> = (0..8).map(|i| 100.0 - 1.5 * i as f64).collect();
        let result = LinearRegression::new(3).unwrap().fit(&series).unwrap();

        assert_eq!(result.len(), series.len());
        assert_relative_eq!(result.next_step(), 100.0 - 1.5 * 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_lookback_validation() {
        assert!(LinearRegression::new(1).is_err());
        assert_eq!(LinearRegression::new(4).unwrap().lookback(), 4);
    }
}
