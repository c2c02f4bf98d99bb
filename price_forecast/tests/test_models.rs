use approx::assert_relative_eq;
use price_forecast::models::lagged_ridge::nonlinear_predict_closed_form;
use price_forecast::models::network::nonlinear_predict_trained;
use price_forecast::models::seasonal::{seasonal_predict, DEFAULT_SEASONAL_PERIOD};
use price_forecast::orchestrator::build_model;
use price_forecast::{ForecastConfig, ModelKind, NetworkConfig};
use rstest::rstest;
use trade_math::moving_averages::{exponential_moving_average, moving_average};
use trade_math::oscillators::rsi;
use trade_math::regression::least_squares_predict;

fn wavy_series(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 100.0 + 0.2 * i as f64 + 2.0 * (i as f64 * 0.45).sin())
        .collect()
}

fn small_network() -> NetworkConfig {
    NetworkConfig {
        epochs: 15,
        ..NetworkConfig::default()
    }
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(4)]
#[case(40)]
fn test_every_model_keeps_length(#[case] len: usize) {
    let series = wavy_series(len);
    let config = ForecastConfig {
        network: small_network(),
        ..ForecastConfig::default()
    };

    for kind in ModelKind::ALL {
        let model = build_model(kind, &config).unwrap();
        let result = model.fit(&series).unwrap();
        assert_eq!(result.len(), len, "{kind} changed the length");
    }
}

#[test]
fn test_empty_input_yields_empty_output() {
    assert!(moving_average(&[], 3).unwrap().is_empty());
    assert!(exponential_moving_average(&[], 0.5).unwrap().is_empty());
    assert!(least_squares_predict(&[], 3).unwrap().is_empty());
    assert!(seasonal_predict(&[], 3, DEFAULT_SEASONAL_PERIOD)
        .unwrap()
        .is_empty());
    assert!(nonlinear_predict_closed_form(&[], 3).unwrap().is_empty());
    assert!(nonlinear_predict_trained(&[], &[], 3, &small_network())
        .unwrap()
        .is_empty());
    assert!(rsi(&[], 14).unwrap().is_empty());
}

#[test]
fn test_linear_series_is_extrapolated_exactly() {
    let series: Vec<f64> = (0..12).map(|i| 10.0 + 2.0 * i as f64).collect();
    let values = least_squares_predict(&series, 4).unwrap();

    for (i, v) in values.iter().enumerate().skip(3) {
        assert_relative_eq!(*v, 10.0 + 2.0 * (i + 1) as f64, epsilon = 1e-9);
    }

    let model = build_model(ModelKind::LinearRegression, &ForecastConfig::default()).unwrap();
    let result = model.fit(&series).unwrap();
    assert_relative_eq!(result.next_step(), 10.0 + 2.0 * 12.0, epsilon = 1e-9);
}

#[test]
fn test_perfect_seasonality_is_recovered() {
    let profile = [1.0, -2.0, 0.5, 3.0, -2.5, 0.0, 1.0];
    let series: Vec<f64> = (0..35).map(|i| 70.0 + profile[i % 7]).collect();
    let values = seasonal_predict(&series, 3, 7).unwrap();

    for i in 2..series.len() {
        assert_relative_eq!(values[i], series[i], epsilon = 1e-9);
    }
}

#[rstest]
#[case(ModelKind::MovingAverage)]
#[case(ModelKind::ExponentialMovingAverage)]
#[case(ModelKind::LinearRegression)]
fn test_trailing_models_do_not_look_ahead(#[case] kind: ModelKind) {
    let series = wavy_series(30);
    let model = build_model(kind, &ForecastConfig::default()).unwrap();
    let full = model.fit(&series).unwrap();

    for end in [8, 15, 29] {
        let prefix = model.fit(&series[..=end]).unwrap();
        let (a, b) = (prefix.values()[end], full.values()[end]);
        assert!(a.is_nan() && b.is_nan() || (a - b).abs() < 1e-9);
    }
}

#[test]
fn test_lagged_models_start_after_lookback() {
    let series = wavy_series(50);
    let config = ForecastConfig {
        lookback: 6,
        network: small_network(),
        ..ForecastConfig::default()
    };

    for kind in [ModelKind::LaggedRidge, ModelKind::LaggedNetwork] {
        let result = build_model(kind, &config).unwrap().fit(&series).unwrap();
        assert!(result.values()[..6].iter().all(|v| v.is_nan()), "{kind}");
        assert!(result.values()[6..].iter().all(|v| v.is_finite()), "{kind}");
        assert!(result.next_step().is_finite(), "{kind}");
    }
}

#[test]
fn test_rsi_saturates_on_rising_prices() {
    let series: Vec<f64> = (0..25).map(|i| 50.0 + i as f64).collect();
    let values = rsi(&series, 14).unwrap();
    assert!(values[14..].iter().all(|&v| v == 100.0));
}
