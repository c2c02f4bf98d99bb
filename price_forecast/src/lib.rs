//! # Price Forecast
//!
//! Forecasting models and accuracy metrics for stock and metals price series.
//!
//! ## Features
//!
//! - Smoothing, regression and seasonal predictors over close prices
//! - Lagged-window predictors: a closed-form ridge regressor and a small
//!   trained feed-forward network
//! - RMSE, MAE and MAPE over the test range of a train/test split
//! - An orchestrator that runs the requested models and forecasts one step
//!   past the end of the history
//! - Dashboard request/response types with a timestamped prediction timeline
//!
//! Every predictor returns one value per input position, with `f64::NAN` where
//! no prediction is defined.
//!
//! ## Quick Start
//!
//! ```rust
//! use price_forecast::{run_models, ForecastConfig, ModelKind};
//!
//! let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
//! let report = run_models(
//!     &closes,
//!     &[ModelKind::MovingAverage, ModelKind::SeasonalDecomposition],
//!     &ForecastConfig::default(),
//! )?;
//!
//! assert_eq!(report.split_index, 48);
//! assert_eq!(report.predictions[&ModelKind::MovingAverage].len(), closes.len());
//! # Ok::<(), price_forecast::ForecastError>(())
//! ```

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod timeline;

// Re-export commonly used types
pub use crate::api::{TrainRequest, TrainResponse};
pub use crate::config::{ForecastConfig, NetworkConfig};
pub use crate::data::PriceBar;
pub use crate::error::{ForecastError, Result};
pub use crate::metrics::ForecastMetrics;
pub use crate::models::{ForecastModel, ForecastResult, ModelKind};
pub use crate::orchestrator::{run_models, ForecastReport};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
