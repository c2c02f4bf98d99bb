//! Request and response bodies of the dashboard's train-and-predict call
//!
//! These types only shape data; fetching the bars is the caller's job.

use crate::config::ForecastConfig;
use crate::data::PriceBar;
use crate::error::Result;
use crate::metrics::ForecastMetrics;
use crate::models::ModelKind;
use crate::orchestrator::ForecastReport;
use crate::timeline::{prediction_timeline, PredictionPoint};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_symbol() -> String {
    "AAPL".to_string()
}

fn default_range() -> String {
    "1y".to_string()
}

fn default_interval() -> String {
    "1d".to_string()
}

fn default_models() -> Vec<String> {
    ["ma", "lr", "ema"].iter().map(|k| k.to_string()).collect()
}

/// Body of a train-and-predict request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainRequest {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_range")]
    pub range: String,
    #[serde(default = "default_interval")]
    pub interval: String,
    /// Model keys, parsed by [`TrainRequest::model_kinds`]
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sarima_seasonal: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lstm_lookback: Option<usize>,
}

impl Default for TrainRequest {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            range: default_range(),
            interval: default_interval(),
            models: default_models(),
            window: None,
            sarima_seasonal: None,
            lstm_lookback: None,
        }
    }
}

impl TrainRequest {
    /// Requested models; an unknown key is an error
    pub fn model_kinds(&self) -> Result<Vec<ModelKind>> {
        self.models.iter().map(|key| key.parse()).collect()
    }

    /// Upper-cased ticker, as echoed in the response
    pub fn normalized_symbol(&self) -> String {
        self.symbol.trim().to_uppercase()
    }

    /// Validated configuration with the request's overrides on top of `base`
    pub fn to_config_with(&self, base: &ForecastConfig) -> Result<ForecastConfig> {
        let mut config = base.clone();
        if let Some(window) = self.window {
            config.window = window;
        }
        if let Some(period) = self.sarima_seasonal {
            config.seasonal_period = period;
        }
        if let Some(lookback) = self.lstm_lookback {
            config.lookback = lookback;
        }
        config.validate()?;
        Ok(config)
    }

    /// Validated configuration with the request's overrides on the defaults
    pub fn to_config(&self) -> Result<ForecastConfig> {
        self.to_config_with(&ForecastConfig::default())
    }
}

/// Body of a train-and-predict response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainResponse {
    pub symbol: String,
    pub range: String,
    pub interval: String,
    pub data: Vec<PriceBar>,
    pub split_index: usize,
    pub metrics: BTreeMap<ModelKind, ForecastMetrics>,
    pub predictions: BTreeMap<ModelKind, Vec<PredictionPoint>>,
    /// Only models with a finite next-step value appear
    pub next_day_prediction: BTreeMap<ModelKind, f64>,
}

impl TrainResponse {
    /// Shape an orchestrator report over `bars` into a response
    pub fn from_report(request: &TrainRequest, bars: Vec<PriceBar>, report: ForecastReport) -> Self {
        let predictions = report
            .predictions
            .iter()
            .map(|(kind, values)| (*kind, prediction_timeline(&bars, values)))
            .collect();
        let next_day_prediction = report
            .next_step_forecast
            .into_iter()
            .filter(|(_, value)| value.is_finite())
            .collect();

        Self {
            symbol: request.normalized_symbol(),
            range: request.range.clone(),
            interval: request.interval.clone(),
            data: bars,
            split_index: report.split_index,
            metrics: report.metrics,
            predictions,
            next_day_prediction,
        }
    }
}
