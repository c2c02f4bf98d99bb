//! Per-step input features for the trained network
//!
//! Row `i` is `[close, close - previous close, EMA, RSI / 100]`. The first
//! difference is 0 at the first position and the scaled RSI is 0.5 until it
//! is defined, so every row is finite for a finite series.

use crate::error::Result;
use trade_math::moving_averages::exponential_moving_average;
use trade_math::oscillators::rsi;

/// Number of values in each feature row
pub const FEATURE_COUNT: usize = 4;

/// Build one feature row per position of `series`
pub fn feature_matrix(series: &[f64], ema_alpha: f64, rsi_period: usize) -> Result<Vec<Vec<f64>>> {
    let ema = exponential_moving_average(series, ema_alpha)?;
    let oscillator = rsi(series, rsi_period)?;

    let rows = series
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let diff = if i == 0 { 0.0 } else { close - series[i - 1] };
            let strength = if oscillator[i].is_finite() {
                oscillator[i] / 100.0
            } else {
                0.5
            };
            vec![close, diff, ema[i], strength]
        })
        .collect();

    Ok(rows)
}
