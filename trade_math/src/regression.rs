//! Least-squares trend fitting
//!
//! Fits `y = slope * x + intercept` with the closed-form normal sums and
//! slides that fit along a series to produce one-step-ahead forecasts.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Slope and intercept of a fitted line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LineFit {
    /// Evaluate the line at `x`
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Ordinary least squares over paired points.
///
/// Uses Σx, Σy, Σxy and Σx². When `n·Σx² − (Σx)²` is zero the slope falls
/// back to 0 and the intercept to the mean of `ys`.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Result<LineFit> {
    if xs.len() != ys.len() {
        return Err(MathError::InvalidInput(format!(
            "x and y lengths differ ({} vs {})",
            xs.len(),
            ys.len()
        )));
    }
    if xs.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot fit a line through zero points".to_string(),
        ));
    }

    let n = xs.len() as f64;
    let sum_x: f64 = xs.iter().sum();
    let sum_y: f64 = ys.iter().sum();
    let sum_xy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();
    let sum_x2: f64 = xs.iter().map(|x| x * x).sum();

    let denom = n * sum_x2 - sum_x * sum_x;
    let slope = if denom != 0.0 {
        (n * sum_xy - sum_x * sum_y) / denom
    } else {
        0.0
    };
    let intercept = (sum_y - slope * sum_x) / n;

    Ok(LineFit { slope, intercept })
}

/// Sliding-window least-squares forecast.
///
/// For every `i >= lookback - 1` a line is fitted over the raw indices
/// `i + 1 - lookback ..= i` and evaluated at `i + 1`. The value stored at `i`
/// is therefore the forecast for the *next* position, and the last element is
/// the forecast one step past the end of the series.
pub fn least_squares_predict(series: &[f64], lookback: usize) -> Result<Vec<f64>> {
    if lookback < 2 {
        return Err(MathError::InvalidInput(
            "Lookback must be at least 2 for linear regression".to_string(),
        ));
    }

    let mut predictions = vec![f64::NAN; series.len()];
    if series.len() < lookback {
        return Ok(predictions);
    }

    let mut xs = Vec::with_capacity(lookback);
    for i in lookback - 1..series.len() {
        let start = i + 1 - lookback;
        xs.clear();
        xs.extend((start..=i).map(|x| x as f64));

        let fit = fit_line(&xs, &series[start..=i])?;
        predictions[i] = fit.at((i + 1) as f64);
    }

    Ok(predictions)
}
