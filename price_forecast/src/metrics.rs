//! Metrics for evaluating forecast performance
//!
//! Each metric truncates both sequences to the shorter length and only counts
//! positions where the actual and the predicted value are both finite, so a
//! prediction series with a `NaN` warm-up can be scored directly. A metric
//! with no eligible position is `NaN`.

use serde::{Deserialize, Serialize};

fn finite_pairs<'a>(
    actual: &'a [f64],
    predicted: &'a [f64],
) -> impl Iterator<Item = (f64, f64)> + 'a {
    actual
        .iter()
        .zip(predicted)
        .map(|(&a, &p)| (a, p))
        .filter(|(a, p)| a.is_finite() && p.is_finite())
}

fn mean_of(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Root mean squared error
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    mean_of(finite_pairs(actual, predicted).map(|(a, p)| (a - p).powi(2))).sqrt()
}

/// Mean absolute error
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    mean_of(finite_pairs(actual, predicted).map(|(a, p)| (a - p).abs()))
}

/// Mean absolute percentage error, in percent. Zero actual values are skipped.
pub fn mape(actual: &[f64], predicted: &[f64]) -> f64 {
    mean_of(
        finite_pairs(actual, predicted)
            .filter(|(a, _)| *a != 0.0)
            .map(|(a, p)| ((a - p) / a).abs() * 100.0),
    )
}

/// Evaluate forecast accuracy against actual values
pub fn evaluate(actual: &[f64], predicted: &[f64]) -> ForecastMetrics {
    ForecastMetrics {
        rmse: rmse(actual, predicted),
        mae: mae(actual, predicted),
        mape: mape(actual, predicted),
    }
}

/// Forecast performance metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastMetrics {
    /// Root Mean Squared Error
    #[serde(with = "nan_as_null")]
    pub rmse: f64,
    /// Mean Absolute Error
    #[serde(with = "nan_as_null")]
    pub mae: f64,
    /// Mean Absolute Percentage Error
    #[serde(with = "nan_as_null")]
    pub mape: f64,
}

impl ForecastMetrics {
    /// Whether at least one metric could be computed
    pub fn is_defined(&self) -> bool {
        self.rmse.is_finite() || self.mae.is_finite() || self.mape.is_finite()
    }
}

impl std::fmt::Display for ForecastMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Performance Metrics:")?;
        writeln!(f, "  RMSE:    {:.4}", self.rmse)?;
        writeln!(f, "  MAE:     {:.4}", self.mae)?;
        writeln!(f, "  MAPE:    {:.4}%", self.mape)?;
        Ok(())
    }
}

/// Undefined metrics travel as JSON `null`
pub(crate) mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}
