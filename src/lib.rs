//! # Price Forecast Workspace
//!
//! Facade over the workspace crates.
//!
//! - [`trade_math`]: moving averages, RSI, least-squares fitting and the
//!   linear solver
//! - [`price_forecast`]: models, metrics, configuration and the orchestrator
//!
//! ```
//! use price_forecast_workspace::price_forecast::{run_models, ForecastConfig, ModelKind};
//!
//! let closes = [10.0, 10.5, 10.2, 10.8, 11.0, 11.3, 11.1, 11.6, 11.9, 12.0];
//! let report = run_models(&closes, &[ModelKind::LinearRegression], &ForecastConfig::default())?;
//! assert_eq!(report.split_index, 8);
//! # Ok::<(), price_forecast_workspace::price_forecast::ForecastError>(())
//! ```

pub use price_forecast;
pub use trade_math;
