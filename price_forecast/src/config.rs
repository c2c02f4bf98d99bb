//! Model configuration
//!
//! All model parameters travel in one [`ForecastConfig`]. Missing JSON fields
//! fall back to the defaults, and every constructor path ends in
//! [`ForecastConfig::validate`] so a bad value is reported before any model
//! runs.

use crate::error::{ForecastError, Result};
use crate::models::seasonal::DEFAULT_SEASONAL_PERIOD;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use trade_math::oscillators::DEFAULT_RSI_PERIOD;

/// Hyper-parameters of the trained lagged network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Number of tanh hidden layers
    pub hidden_layers: usize,
    /// Width of every hidden layer
    pub units: usize,
    /// Passes over the training samples
    pub epochs: usize,
    /// SGD step size
    pub learning_rate: f64,
    /// Seed of the weight initialisation
    pub seed: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            hidden_layers: 1,
            units: 8,
            epochs: 200,
            learning_rate: 0.01,
            seed: 42,
        }
    }
}

impl NetworkConfig {
    /// Check that the network can be built and trained
    pub fn validate(&self) -> Result<()> {
        if self.hidden_layers == 0 {
            return Err(ForecastError::InvalidParameter(
                "Network needs at least one hidden layer".to_string(),
            ));
        }
        if self.units == 0 {
            return Err(ForecastError::InvalidParameter(
                "Hidden layers need at least one unit".to_string(),
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Learning rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

/// Parameters shared by every model run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Base window for the smoothing, regression and seasonal models
    pub window: usize,
    /// Cycle length of the seasonal decomposition
    pub seasonal_period: usize,
    /// Lag depth of the lagged models
    pub lookback: usize,
    /// Share of the series, by position, used as the training range
    pub train_ratio: f64,
    /// Explicit EMA smoothing factor; derived from `window` when absent
    pub ema_alpha: Option<f64>,
    /// RSI period used for the network features
    pub rsi_period: usize,
    /// Trained network settings
    pub network: NetworkConfig,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            window: 5,
            seasonal_period: DEFAULT_SEASONAL_PERIOD,
            lookback: 3,
            train_ratio: 0.8,
            ema_alpha: None,
            rsi_period: DEFAULT_RSI_PERIOD,
            network: NetworkConfig::default(),
        }
    }
}

impl ForecastConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject values no model can run with
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("window", self.window),
            ("seasonal_period", self.seasonal_period),
            ("lookback", self.lookback),
            ("rsi_period", self.rsi_period),
        ] {
            if value == 0 {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} must be positive",
                    name
                )));
            }
        }
        if !self.train_ratio.is_finite() || self.train_ratio <= 0.0 || self.train_ratio >= 1.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "train_ratio must be in (0, 1), got {}",
                self.train_ratio
            )));
        }
        if let Some(alpha) = self.ema_alpha {
            if !alpha.is_finite() || alpha <= 0.0 || alpha > 1.0 {
                return Err(ForecastError::InvalidParameter(format!(
                    "ema_alpha must be in (0, 1], got {}",
                    alpha
                )));
            }
        }
        self.network.validate()
    }

    /// Moving-average window, never below 2
    pub fn ma_window(&self) -> usize {
        self.window.max(2)
    }

    /// EMA smoothing factor, `2 / (max(2, window) + 1)` unless set explicitly
    pub fn ema_alpha(&self) -> f64 {
        self.ema_alpha
            .unwrap_or_else(|| 2.0 / (self.ma_window() as f64 + 1.0))
    }

    /// Regression lookback, never below 3
    pub fn regression_lookback(&self) -> usize {
        self.window.max(3)
    }
}
