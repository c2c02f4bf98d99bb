//! Closed-form lagged-window regressor with a bounded non-linear adjustment
//!
//! A ridge regression maps the previous `lookback` prices to the next one.
//! Its raw output is then pulled toward the window mean through
//! `baseline + tanh(raw - baseline) * |raw - baseline|`, which keeps the sign
//! of the deviation but damps small deviations quadratically. This is the
//! model served under the `lstm` key; it has no recurrent state.

use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult};
use statrs::statistics::Statistics;
use trade_math::linalg::{ridge_normal_equations, solve_linear_system};

/// Diagonal regularisation added to `XᵀX`
pub const RIDGE_LAMBDA: f64 = 1e-3;

/// Weights learned from the lagged design matrix
#[derive(Debug, Clone)]
pub struct RidgeWeights {
    weights: Vec<f64>,
}

impl RidgeWeights {
    /// Fit weights on every complete window of `series`.
    ///
    /// Returns `None` when the series is too short to form a single
    /// `(window, next value)` pair.
    pub fn fit(series: &[f64], lookback: usize) -> Result<Option<Self>> {
        if lookback == 0 {
            return Err(ForecastError::InvalidParameter(
                "Lookback must be positive".to_string(),
            ));
        }
        if series.len() <= lookback {
            return Ok(None);
        }

        let rows: Vec<Vec<f64>> = series
            .windows(lookback + 1)
            .map(|w| w[..lookback].to_vec())
            .collect();
        let targets: Vec<f64> = series[lookback..].to_vec();

        let (xtx, xty) = ridge_normal_equations(&rows, &targets, RIDGE_LAMBDA)?;
        let weights = solve_linear_system(xtx, xty)?
            .into_iter()
            .map(|w| if w.is_finite() { w } else { 0.0 })
            .collect();

        Ok(Some(Self { weights }))
    }

    /// The fitted weights, oldest lag first
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Number of lags the weights expect
    pub fn lookback(&self) -> usize {
        self.weights.len()
    }

    /// Adjusted prediction for the value following `window`
    pub fn predict_window(&self, window: &[f64]) -> f64 {
        debug_assert_eq!(window.len(), self.weights.len(), "window length mismatch");
        let raw: f64 = window.iter().zip(&self.weights).map(|(x, w)| x * w).sum();
        let baseline = window.iter().mean();
        let baseline = if baseline.is_nan() { 0.0 } else { baseline };

        let deviation = raw - baseline;
        baseline + deviation.tanh() * deviation.abs()
    }
}

/// Closed-form lagged predictor over a whole series.
///
/// Position `i >= lookback` holds the prediction made from
/// `series[i - lookback..i]`; earlier positions are `NaN`.
pub fn nonlinear_predict_closed_form(series: &[f64], lookback: usize) -> Result<Vec<f64>> {
    Ok(LaggedRidge::new(lookback)?.fit(series)?.into_values())
}

/// Lagged ridge model
#[derive(Debug, Clone)]
pub struct LaggedRidge {
    name: String,
    lookback: usize,
}

impl LaggedRidge {
    /// Create a new model
    pub fn new(lookback: usize) -> Result<Self> {
        if lookback == 0 {
            return Err(ForecastError::InvalidParameter(
                "Lookback must be positive".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Lagged Ridge (lookback={})", lookback),
            lookback,
        })
    }
}

impl ForecastModel for LaggedRidge {
    fn fit(&self, series: &[f64]) -> Result<ForecastResult> {
        let mut values = vec![f64::NAN; series.len()];
        let Some(weights) = RidgeWeights::fit(series, self.lookback)? else {
            return Ok(ForecastResult::new(values, f64::NAN));
        };

        for i in self.lookback..series.len() {
            values[i] = weights.predict_window(&series[i - self.lookback..i]);
        }
        // The window ending at the last observation predicts the unseen step
        let next_step = weights.predict_window(&series[series.len() - self.lookback..]);

        Ok(ForecastResult::new(values, next_step))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
