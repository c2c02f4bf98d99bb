//! Additive seasonal decomposition predictor
//!
//! The series is split into a fixed-period phase profile and a residual. The
//! residual is smoothed with a trailing moving average and the phase profile
//! is added back. There is no autoregressive or differencing component, so
//! this is not a seasonal ARIMA despite the `sarima` key it is served under.

use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult};
use trade_math::moving_averages::moving_average;

/// Seasonal period used when none is configured
pub const DEFAULT_SEASONAL_PERIOD: usize = 5;

/// Decomposition of a series into phase means and a smoothed residual
#[derive(Debug, Clone)]
pub struct SeasonalFit {
    /// Mean of the observations at each phase `i % period`
    pub(crate) phase_means: Vec<f64>,
    /// Moving average of the deseasonalised series
    pub(crate) smoothed: Vec<f64>,
}

impl SeasonalFit {
    /// Decompose `series` with the given smoothing window and period
    pub fn new(series: &[f64], window: usize, seasonal_period: usize) -> Result<Self> {
        if window == 0 {
            return Err(ForecastError::InvalidParameter(
                "Window size must be positive".to_string(),
            ));
        }
        if seasonal_period == 0 {
            return Err(ForecastError::InvalidParameter(
                "Seasonal period must be positive".to_string(),
            ));
        }

        let mut sums = vec![0.0; seasonal_period];
        let mut counts = vec![0usize; seasonal_period];
        for (i, &value) in series.iter().enumerate() {
            sums[i % seasonal_period] += value;
            counts[i % seasonal_period] += 1;
        }
        // A phase nobody visited contributes nothing
        let phase_means: Vec<f64> = sums
            .iter()
            .zip(&counts)
            .map(|(&sum, &count)| if count > 0 { sum / count as f64 } else { 0.0 })
            .collect();

        let deseasonalised: Vec<f64> = series
            .iter()
            .enumerate()
            .map(|(i, &value)| value - phase_means[i % seasonal_period])
            .collect();
        let smoothed = moving_average(&deseasonalised, window.max(2))?;

        Ok(Self {
            phase_means,
            smoothed,
        })
    }

    /// Mean of the observations at each phase
    pub fn phase_means(&self) -> &[f64] {
        &self.phase_means
    }

    /// Moving average of the deseasonalised series, `NaN` during warm-up
    pub fn smoothed(&self) -> &[f64] {
        &self.smoothed
    }

    /// Seasonal period of the decomposition
    pub fn period(&self) -> usize {
        self.phase_means.len()
    }

    /// Phase mean for position `i`
    pub fn phase_mean(&self, i: usize) -> f64 {
        self.phase_means[i % self.period()]
    }

    /// Recomposed prediction at every fitted position
    pub fn predictions(&self) -> Vec<f64> {
        self.smoothed
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                if s.is_finite() {
                    s + self.phase_mean(i)
                } else {
                    f64::NAN
                }
            })
            .collect()
    }

    /// Last smoothed residual carried forward onto the next phase
    pub fn next_step(&self) -> f64 {
        match self.smoothed.last() {
            Some(&s) if s.is_finite() => s + self.phase_mean(self.smoothed.len()),
            _ => f64::NAN,
        }
    }
}

/// Seasonal decomposition predictor over a whole series.
///
/// The residual is smoothed with a window of `max(2, window)`, so the first
/// `max(2, window) - 1` positions are `NaN`.
pub fn seasonal_predict(series: &[f64], window: usize, seasonal_period: usize) -> Result<Vec<f64>> {
    Ok(SeasonalFit::new(series, window, seasonal_period)?.predictions())
}

/// Seasonal decomposition model
#[derive(Debug, Clone)]
pub struct SeasonalDecomposition {
    name: String,
    window: usize,
    seasonal_period: usize,
}

impl SeasonalDecomposition {
    /// Create a new model
    pub fn new(window: usize, seasonal_period: usize) -> Result<Self> {
        if window == 0 || seasonal_period == 0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Window and seasonal period must be positive (window={}, period={})",
                window, seasonal_period
            )));
        }

        Ok(Self {
            name: format!(
                "Seasonal Decomposition (window={}, period={})",
                window, seasonal_period
            ),
            window,
            seasonal_period,
        })
    }
}

impl ForecastModel for SeasonalDecomposition {
    fn fit(&self, series: &[f64]) -> Result<ForecastResult> {
        let fit = SeasonalFit::new(series, self.window, self.seasonal_period)?;
        Ok(ForecastResult::new(fit.predictions(), fit.next_step()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
