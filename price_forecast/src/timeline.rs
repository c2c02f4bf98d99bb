//! Chart timeline: predictions joined back onto their timestamps

use crate::data::PriceBar;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One charted position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    pub date: DateTime<Utc>,
    pub actual: Option<f64>,
    pub predicted: Option<f64>,
}

fn defined(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Pair every bar with the prediction at its position.
///
/// Undefined predictions, and positions past the end of `predictions`, chart
/// as `None`.
pub fn prediction_timeline(bars: &[PriceBar], predictions: &[f64]) -> Vec<PredictionPoint> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| PredictionPoint {
            date: bar.date,
            actual: defined(bar.close),
            predicted: predictions.get(i).copied().and_then(defined),
        })
        .collect()
}

/// Bar length for a market-data interval key
pub fn interval_duration(interval: &str) -> Result<Duration> {
    match interval {
        "1d" => Ok(Duration::days(1)),
        "1wk" => Ok(Duration::weeks(1)),
        "1mo" => Ok(Duration::days(30)),
        "1h" => Ok(Duration::hours(1)),
        _ => Err(ForecastError::InvalidParameter(format!(
            "Unsupported interval: {}",
            interval
        ))),
    }
}

/// Timestamp of the bar after `last`
pub fn next_timestamp(last: DateTime<Utc>, interval: &str) -> Result<DateTime<Utc>> {
    Ok(last + interval_duration(interval)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_timeline_maps_nan_to_none() {
        let bars: Vec<PriceBar> = (0..3)
            .map(|i| PriceBar::from_close(start() + Duration::days(i), 10.0 + i as f64))
            .collect();
        let points = prediction_timeline(&bars, &[f64::NAN, 10.5]);

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].predicted, None);
        assert_eq!(points[1].predicted, Some(10.5));
        assert_eq!(points[2].predicted, None);
        assert_eq!(points[2].actual, Some(12.0));
        assert_eq!(points[1].date, start() + Duration::days(1));
    }

    #[test]
    fn test_next_timestamp() {
        assert_eq!(
            next_timestamp(start(), "1d").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap()
        );
        assert_eq!(
            next_timestamp(start(), "1wk").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap()
        );
        assert_eq!(
            next_timestamp(start(), "1mo").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap()
        );
        assert_eq!(
            next_timestamp(start(), "1h").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 1, 0, 0).unwrap()
        );
        assert!(matches!(
            next_timestamp(start(), "5m"),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_null_serialization() {
        let point = PredictionPoint {
            date: start(),
            actual: Some(1.0),
            predicted: None,
        };
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(
            json,
            r#"{"date":"2024-03-01T00:00:00Z","actual":1.0,"predicted":null}"#
        );
    }
}
