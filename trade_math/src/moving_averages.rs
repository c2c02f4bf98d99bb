//! Moving average calculation implementations
//!
//! Contains the two smoothing primitives used by every forecasting model:
//! - Simple Moving Average (SMA), trailing window, running sum
//! - Exponential Moving Average (EMA), seeded with the first observation
//!
//! Each comes as an incremental accumulator (`update` one value at a time)
//! and as a whole-series function producing one output per input position.

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Simple Moving Average (SMA) implementation
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period + 1),
            sum: 0.0,
        })
    }

    /// Update the SMA with a new value
    pub fn update(&mut self, value: f64) {
        self.values.push_back(value);
        self.sum += value;

        // Drop the value leaving the window
        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }
    }

    /// Get the current SMA value
    pub fn value(&self) -> Result<f64> {
        if self.values.len() < self.period {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for SMA calculation. Need {} values, have {}.",
                self.period,
                self.values.len()
            )));
        }

        Ok(self.sum / self.period as f64)
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }
}

/// Exponential Moving Average (EMA) implementation
///
/// The first observation seeds the average, so there is no warm-up period.
#[derive(Debug, Clone)]
pub struct ExponentialMovingAverage {
    alpha: f64,
    current_ema: Option<f64>,
}

impl ExponentialMovingAverage {
    /// Create a new EMA with smoothing factor `alpha` in `(0, 1]`
    pub fn new(alpha: f64) -> Result<Self> {
        if !alpha.is_finite() || alpha <= 0.0 || alpha > 1.0 {
            return Err(MathError::InvalidInput(format!(
                "Alpha must be in (0, 1], got {}",
                alpha
            )));
        }

        Ok(Self {
            alpha,
            current_ema: None,
        })
    }

    /// Create an EMA whose alpha is derived from a period as `2 / (period + 1)`
    pub fn with_period(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Self::new(2.0 / (period as f64 + 1.0))
    }

    /// Update the EMA with a new value and return the new average
    pub fn update(&mut self, value: f64) -> f64 {
        let next = match self.current_ema {
            None => value,
            Some(prev) => self.alpha * value + (1.0 - self.alpha) * prev,
        };
        self.current_ema = Some(next);
        next
    }

    /// Get the current EMA value
    pub fn value(&self) -> Result<f64> {
        self.current_ema.ok_or_else(|| {
            MathError::InsufficientData("No data available for EMA calculation".to_string())
        })
    }

    /// Get the smoothing factor
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

/// Trailing simple moving average over a whole series.
///
/// Position `i` holds the mean of `series[i + 1 - window..=i]`; the first
/// `window - 1` positions are `NaN`.
pub fn moving_average(series: &[f64], window: usize) -> Result<Vec<f64>> {
    let mut sma = SimpleMovingAverage::new(window)?;

    Ok(series
        .iter()
        .map(|&value| {
            sma.update(value);
            sma.value().unwrap_or(f64::NAN)
        })
        .collect())
}

/// Exponential moving average over a whole series, seeded with `series[0]`.
pub fn exponential_moving_average(series: &[f64], alpha: f64) -> Result<Vec<f64>> {
    let mut ema = ExponentialMovingAverage::new(alpha)?;

    Ok(series.iter().map(|&value| ema.update(value)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use rstest::rstest;

    #[test]
    fn test_sma_calculation() {
        let mut sma = SimpleMovingAverage::new(3).unwrap();

        // Not enough data yet
        assert!(sma.value().is_err());

        sma.update(2.0);
        sma.update(4.0);
        assert!(sma.value().is_err());

        sma.update(6.0);
        assert_eq!(sma.value().unwrap(), 4.0); // (2 + 4 + 6) / 3

        // The window slides, dropping the oldest value
        sma.update(8.0);
        assert_eq!(sma.value().unwrap(), 6.0); // (4 + 6 + 8) / 3
    }

    #[test]
    fn test_moving_average_scenario() {
        let series: Vec<f64> = (1..=10).map(f64::from).collect();
        let ma = moving_average(&series, 3).unwrap();

        assert_eq!(ma.len(), 10);
        assert!(ma[0].is_nan());
        assert!(ma[1].is_nan());
        assert_eq!(&ma[2..], &[2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(5)]
    #[case(13)]
    #[case(40)]
    fn test_moving_average_matches_brute_force(#[case] window: usize) {
        let mut rng = StdRng::seed_from_u64(window as u64);
        let series: Vec<f64> = (0..40).map(|_| rng.gen_range(50.0..150.0)).collect();

        let ma = moving_average(&series, window).unwrap();

        assert_eq!(ma.len(), series.len());
        assert_eq!(ma.iter().take_while(|v| v.is_nan()).count(), window - 1);
        for i in window - 1..series.len() {
            let expected = series[i + 1 - window..=i].iter().sum::<f64>() / window as f64;
            assert_relative_eq!(ma[i], expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_moving_average_shorter_than_window() {
        let ma = moving_average(&[1.0, 2.0], 5).unwrap();
        assert_eq!(ma.len(), 2);
        assert!(ma.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_moving_average_rejects_zero_window() {
        assert!(matches!(
            moving_average(&[1.0, 2.0], 0),
            Err(MathError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_ema_calculation() {
        let mut ema = ExponentialMovingAverage::new(0.3).unwrap();
        assert!(ema.value().is_err());

        assert_eq!(ema.update(10.0), 10.0); // seeded with the first value
        assert_relative_eq!(ema.update(20.0), 13.0); // 0.3 * 20 + 0.7 * 10
        assert_relative_eq!(ema.value().unwrap(), 13.0);
    }

    #[test]
    fn test_ema_with_period() {
        let ema = ExponentialMovingAverage::with_period(5).unwrap();
        assert_relative_eq!(ema.alpha(), 2.0 / 6.0);
        assert!(ExponentialMovingAverage::with_period(0).is_err());
    }

    #[test]
    fn test_ema_alpha_one_is_identity() {
        let series = vec![3.0, -1.5, 7.25, 7.25, 0.0, 42.0];
        assert_eq!(exponential_moving_average(&series, 1.0).unwrap(), series);
    }

    #[test]
    fn test_ema_series_recurrence() {
        let series = vec![10.0, 20.0, 30.0];
        let ema = exponential_moving_average(&series, 0.5).unwrap();
        assert_eq!(ema, vec![10.0, 15.0, 22.5]);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.2)]
    #[case(1.5)]
    #[case(f64::NAN)]
    fn test_ema_rejects_bad_alpha(#[case] alpha: f64) {
        assert!(exponential_moving_average(&[1.0], alpha).is_err());
    }

    #[test]
    fn test_empty_series() {
        assert!(moving_average(&[], 3).unwrap().is_empty());
        assert!(exponential_moving_average(&[], 0.5).unwrap().is_empty());
    }
}
