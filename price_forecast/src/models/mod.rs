//! Forecasting models for price series
//!
//! Every model turns a price series into a prediction series of the same
//! length plus a forecast for the first unseen step. Positions without enough
//! history hold `NaN`.
//!
//! | key       | model                                   |
//! |-----------|-----------------------------------------|
//! | `ma`      | [`moving_average::SimpleMA`]            |
//! | `ema`     | [`moving_average::ExponentialMA`]       |
//! | `lr`      | [`linear_regression::LinearRegression`] |
//! | `sarima`  | [`seasonal::SeasonalDecomposition`]     |
//! | `lstm`    | [`lagged_ridge::LaggedRidge`]           |
//! | `lstm_nn` | [`network::LaggedNetwork`]              |
//!
//! The `sarima` and `lstm` keys are the dashboard's labels. The models behind
//! them are an additive phase decomposition and lagged-window regressions; none
//! of them is a seasonal ARIMA or a recurrent network.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod lagged_ridge;
pub mod linear_regression;
pub mod moving_average;
pub mod network;
pub mod seasonal;

/// Output of fitting a model to a series
#[derive(Debug, Clone)]
pub struct ForecastResult {
    /// One prediction per input position, `NaN` where undefined
    pub(crate) values: Vec<f64>,
    /// Forecast for the position after the last observation
    pub(crate) next_step: f64,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(values: Vec<f64>, next_step: f64) -> Self {
        Self { values, next_step }
    }

    /// Build a result whose next-step forecast is the last prediction.
    ///
    /// Used by models that store a one-step-ahead value at each position.
    pub fn from_trailing(values: Vec<f64>) -> Self {
        let next_step = values.last().copied().unwrap_or(f64::NAN);
        Self { values, next_step }
    }

    /// Get the predicted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the forecast for the first unseen step
    pub fn next_step(&self) -> f64 {
        self.next_step
    }

    /// Number of predictions
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no predictions
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consume the result, returning the predicted values
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

/// Forecast model that can be fitted to a price series
pub trait ForecastModel: fmt::Debug {
    /// Fit the model and predict every position of `series`
    fn fit(&self, series: &[f64]) -> Result<ForecastResult>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// The models the orchestrator knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    #[serde(rename = "ma")]
    MovingAverage,
    #[serde(rename = "ema")]
    ExponentialMovingAverage,
    #[serde(rename = "lr")]
    LinearRegression,
    #[serde(rename = "sarima")]
    SeasonalDecomposition,
    #[serde(rename = "lstm")]
    LaggedRidge,
    #[serde(rename = "lstm_nn")]
    LaggedNetwork,
}

impl ModelKind {
    /// Every model, in report order
    pub const ALL: [ModelKind; 6] = [
        ModelKind::MovingAverage,
        ModelKind::ExponentialMovingAverage,
        ModelKind::LinearRegression,
        ModelKind::SeasonalDecomposition,
        ModelKind::LaggedRidge,
        ModelKind::LaggedNetwork,
    ];

    /// Wire key used by the dashboard
    pub fn key(&self) -> &'static str {
        match self {
            ModelKind::MovingAverage => "ma",
            ModelKind::ExponentialMovingAverage => "ema",
            ModelKind::LinearRegression => "lr",
            ModelKind::SeasonalDecomposition => "sarima",
            ModelKind::LaggedRidge => "lstm",
            ModelKind::LaggedNetwork => "lstm_nn",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ModelKind {
    type Err = ForecastError;

    /// Accepts exactly the wire keys serde accepts
    fn from_str(s: &str) -> Result<Self> {
        ModelKind::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| ForecastError::UnknownModel(s.to_string()))
    }
}
