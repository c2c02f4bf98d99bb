//! Runs a set of models over one price series and scores them
//!
//! Every model predicts over the whole series; only the positions from the
//! split index onward are scored against the actual prices.

use crate::config::ForecastConfig;
use crate::error::{ForecastError, Result};
use crate::metrics::{evaluate, ForecastMetrics};
use crate::models::lagged_ridge::LaggedRidge;
use crate::models::linear_regression::LinearRegression;
use crate::models::moving_average::{ExponentialMA, SimpleMA};
use crate::models::network::LaggedNetwork;
use crate::models::seasonal::SeasonalDecomposition;
use crate::models::{ForecastModel, ModelKind};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Everything produced by one orchestrator run
#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    /// First position of the test range
    pub split_index: usize,
    /// Full-length prediction series per model
    pub predictions: BTreeMap<ModelKind, Vec<f64>>,
    /// Accuracy over the test range per model
    pub metrics: BTreeMap<ModelKind, ForecastMetrics>,
    /// Forecast for the step after the last observation per model
    pub next_step_forecast: BTreeMap<ModelKind, f64>,
}

impl ForecastReport {
    /// Model with the lowest test RMSE, ignoring undefined scores
    pub fn best_model(&self) -> Option<ModelKind> {
        self.metrics
            .iter()
            .filter(|(_, m)| m.rmse.is_finite())
            .min_by(|(_, a), (_, b)| a.rmse.total_cmp(&b.rmse))
            .map(|(kind, _)| *kind)
    }
}

/// Position where the test range starts
pub fn split_index(len: usize, train_ratio: f64) -> usize {
    ((len as f64 * train_ratio).floor() as usize).min(len)
}

/// Instantiate the model behind `kind` with the derived parameters
pub fn build_model(kind: ModelKind, config: &ForecastConfig) -> Result<Box<dyn ForecastModel>> {
    let model: Box<dyn ForecastModel> = match kind {
        ModelKind::MovingAverage => Box::new(SimpleMA::new(config.ma_window())?),
        ModelKind::ExponentialMovingAverage => Box::new(ExponentialMA::new(config.ema_alpha())?),
        ModelKind::LinearRegression => {
            Box::new(LinearRegression::new(config.regression_lookback())?)
        }
        ModelKind::SeasonalDecomposition => Box::new(SeasonalDecomposition::new(
            config.window,
            config.seasonal_period,
        )?),
        ModelKind::LaggedRidge => Box::new(LaggedRidge::new(config.lookback)?),
        ModelKind::LaggedNetwork => Box::new(LaggedNetwork::from_config(config)?),
    };
    Ok(model)
}

fn validate_series(series: &[f64]) -> Result<()> {
    if series.is_empty() {
        return Err(ForecastError::EmptySeries);
    }
    if let Some(i) = series.iter().position(|v| !v.is_finite()) {
        return Err(ForecastError::DataError(format!(
            "Price at index {} is not finite ({})",
            i, series[i]
        )));
    }
    Ok(())
}

/// Run `models` over `series`, evaluate each on the test range and extend
/// each by one step.
///
/// Repeated model kinds run once. Input and configuration are checked before
/// any model runs.
pub fn run_models(
    series: &[f64],
    models: &[ModelKind],
    config: &ForecastConfig,
) -> Result<ForecastReport> {
    config.validate()?;
    validate_series(series)?;

    let requested: BTreeSet<ModelKind> = models.iter().copied().collect();
    let split = split_index(series.len(), config.train_ratio);
    let actual = &series[split..];

    let mut report = ForecastReport {
        split_index: split,
        predictions: BTreeMap::new(),
        metrics: BTreeMap::new(),
        next_step_forecast: BTreeMap::new(),
    };

    for kind in requested {
        let model = build_model(kind, config)?;
        debug!("Running {} as {}", kind, model.name());

        let result = model.fit(series)?;
        let metrics = evaluate(actual, &result.values()[split..]);
        if !metrics.is_defined() {
            warn!(
                "Model {} has no defined prediction in the test range ({} points)",
                kind,
                actual.len()
            );
        }

        report.next_step_forecast.insert(kind, result.next_step());
        report.metrics.insert(kind, metrics);
        report.predictions.insert(kind, result.into_values());
    }

    info!(
        "Evaluated {} models on {} prices (split at {}), best: {}",
        report.metrics.len(),
        series.len(),
        split,
        report
            .best_model()
            .map_or_else(|| "none".to_string(), |kind| kind.to_string())
    );

    Ok(report)
}
