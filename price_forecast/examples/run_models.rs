use chrono::{Duration, TimeZone, Utc};
use price_forecast::data::{close_prices, retain_valid_bars};
use price_forecast::timeline::next_timestamp;
use price_forecast::{run_models, ForecastConfig, ModelKind, PriceBar, TrainRequest, TrainResponse};
use std::env;

fn synthetic_bars(len: usize) -> Vec<PriceBar> {
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    (0..len)
        .map(|i| {
            let t = i as f64;
            let close = 180.0 + 0.15 * t + 4.0 * (t * 0.35).sin() + [0.8, -0.4, 0.1, -0.9, 0.4][i % 5];
            PriceBar::from_close(start + Duration::days(i as i64), close)
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Optional JSON config file as the first argument
    let base = match env::args().nth(1) {
        Some(path) => ForecastConfig::from_json_file(path)?,
        None => ForecastConfig::default(),
    };

    let request = TrainRequest {
        models: ModelKind::ALL.iter().map(|k| k.key().to_string()).collect(),
        ..TrainRequest::default()
    };
    let config = request.to_config_with(&base)?;

    let mut bars = synthetic_bars(250);
    retain_valid_bars(&mut bars);
    let closes = close_prices(&bars);
    println!("Loaded {} data points", closes.len());

    let report = run_models(&closes, &request.model_kinds()?, &config)?;
    println!("Train/test split at index {}", report.split_index);

    for (kind, metrics) in &report.metrics {
        println!("\n[{}]", kind);
        print!("{}", metrics);
        println!("  Next:    {:.4}", report.next_step_forecast[kind]);
    }
    if let Some(best) = report.best_model() {
        println!("\nBest model on the test range: {}", best);
    }

    if let Some(last) = bars.last() {
        println!("Next bar at {}", next_timestamp(last.date, &request.interval)?);
    }

    let response = TrainResponse::from_report(&request, bars, report);
    let json = serde_json::to_string(&response.next_day_prediction)?;
    println!("Next-day predictions: {}", json);

    Ok(())
}
