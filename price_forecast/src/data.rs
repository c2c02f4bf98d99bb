//! Price bars at the presentation boundary
//!
//! The models only see `&[f64]` close prices; bars keep the timestamps needed
//! to chart those predictions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLC bar of a price history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBar {
    /// Start of the bar
    pub date: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl PriceBar {
    /// Bar whose open, high, low and close are all `close`
    pub fn from_close(date: DateTime<Utc>, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }

    /// Whether the bar carries a usable close
    pub fn is_valid(&self) -> bool {
        self.close.is_finite() && self.close != 0.0
    }
}

/// Close prices of `bars`, in order
pub fn close_prices(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|bar| bar.close).collect()
}

/// Drop bars whose close is missing, non-finite or zero.
///
/// Returns the number of bars removed.
pub fn retain_valid_bars(bars: &mut Vec<PriceBar>) -> usize {
    let before = bars.len();
    bars.retain(PriceBar::is_valid);
    let removed = before - bars.len();
    if removed > 0 {
        log::debug!("Dropped {} price bars without a usable close", removed);
    }
    removed
}
