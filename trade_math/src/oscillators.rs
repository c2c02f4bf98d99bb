//! Oscillator indicator implementations
//!
//! Contains the Relative Strength Index (RSI) used as a model feature.
//! Gains and losses are averaged with a plain trailing window of first
//! differences rather than Wilder smoothing.

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Default look-back period for the RSI
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Relative Strength Index (RSI) implementation
#[derive(Debug, Clone)]
pub struct RelativeStrengthIndex {
    period: usize,
    previous_price: Option<f64>,
    gains: VecDeque<f64>,
    losses: VecDeque<f64>,
}

impl RelativeStrengthIndex {
    /// Create a new RSI with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            previous_price: None,
            gains: VecDeque::with_capacity(period + 1),
            losses: VecDeque::with_capacity(period + 1),
        })
    }

    /// Update the RSI with a new price value
    pub fn update(&mut self, price: f64) {
        if let Some(prev_price) = self.previous_price {
            let change = price - prev_price;
            let gain = change.max(0.0);
            let loss = (-change).max(0.0);

            self.gains.push_back(gain);
            self.losses.push_back(loss);

            if self.gains.len() > self.period {
                self.gains.pop_front();
                self.losses.pop_front();
            }
        }

        self.previous_price = Some(price);
    }

    /// Get the current RSI value (0-100)
    pub fn value(&self) -> Result<f64> {
        if self.gains.len() < self.period {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for RSI calculation. Need {} values, have {}.",
                self.period + 1,
                self.gains.len() + usize::from(self.previous_price.is_some())
            )));
        }

        // Summed from the window each time so a loss-free window is exactly zero
        let avg_gain = self.gains.iter().sum::<f64>() / self.period as f64;
        let avg_loss = self.losses.iter().sum::<f64>() / self.period as f64;

        Ok(rsi_score(avg_gain, avg_loss))
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }
}

/// Map average gain and loss to the 0-100 score.
///
/// A flat window (no gains, no losses) scores 0; a window with gains and no
/// losses saturates at 100.
fn rsi_score(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { 0.0 } else { 100.0 };
    }

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// RSI over a whole series. Positions before `period` are `NaN`.
pub fn rsi(series: &[f64], period: usize) -> Result<Vec<f64>> {
    let mut indicator = RelativeStrengthIndex::new(period)?;

    Ok(series
        .iter()
        .map(|&price| {
            indicator.update(price);
            indicator.value().unwrap_or(f64::NAN)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rsi_calculation() {
        let mut rsi = RelativeStrengthIndex::new(3).unwrap();

        rsi.update(10.0);
        rsi.update(10.5);
        rsi.update(11.0);
        assert!(rsi.value().is_err());

        rsi.update(10.5);
        // gains 0.5, 0.5, 0.0; losses 0.0, 0.0, 0.5
        let rsi_value = rsi.value().unwrap();
        assert_relative_eq!(rsi_value, 100.0 - 100.0 / 3.0, epsilon = 1e-9);

        // Downtrend: should produce lower RSI
        rsi.update(10.0);
        let new_rsi_value = rsi.value().unwrap();
        assert!(new_rsi_value < rsi_value);
    }

    #[test]
    fn test_rsi_monotonic_increase_saturates() {
        let series: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 0.5).collect();
        let values = rsi(&series, DEFAULT_RSI_PERIOD).unwrap();

        assert_eq!(values.len(), series.len());
        assert!(values[..DEFAULT_RSI_PERIOD].iter().all(|v| v.is_nan()));
        assert!(values[DEFAULT_RSI_PERIOD..].iter().all(|&v| v == 100.0));
    }

    #[test]
    fn test_rsi_flat_market_is_zero() {
        let values = rsi(&[5.0; 8], 3).unwrap();
        assert!(values[3..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_rsi_monotonic_decrease_is_zero() {
        let series: Vec<f64> = (0..10).map(|i| 50.0 - i as f64).collect();
        let values = rsi(&series, 4).unwrap();
        assert!(values[4..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_rsi_stays_in_range() {
        let series = vec![
            44.3, 44.1, 44.2, 43.6, 44.3, 44.8, 45.1, 45.4, 45.8, 46.1, 45.9, 46.3, 45.6, 46.3,
            46.3, 46.0, 46.4, 46.2, 45.6, 46.2,
        ];
        let values = rsi(&series, 5).unwrap();
        for v in &values[5..] {
            assert!((0.0..=100.0).contains(v));
        }
    }

    #[test]
    fn test_rsi_edge_cases() {
        assert!(rsi(&[], 14).unwrap().is_empty());
        assert!(rsi(&[1.0, 2.0], 0).is_err());
        // Exactly `period` points leave every position undefined
        assert!(rsi(&[1.0, 2.0, 3.0], 3).unwrap().iter().all(|v| v.is_nan()));
    }
}
