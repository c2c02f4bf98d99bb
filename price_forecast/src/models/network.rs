//! Feed-forward network over lagged feature windows
//!
//! The network sees the previous `lookback` feature rows, flattened oldest
//! first, and predicts the target at the current position. Hidden layers use
//! `tanh`, the single output unit is linear, and training is per-sample SGD on
//! the squared error with samples visited in time order.
//!
//! # Approximate gradient
//!
//! Back-propagation is exact for the output layer and for the hidden layer
//! that feeds it. Every hidden layer below that does not receive the
//! back-propagated term `Σ_k W[k][j]·δ[k]`; it uses `error · h[j]` instead,
//! its own activation scaled by the output error. With a single hidden layer
//! the update is therefore plain SGD. With more layers the lower updates
//! follow a non-canonical direction and the model's outputs depend on it, so
//! the rule must not be replaced by full back-propagation.

use crate::config::{ForecastConfig, NetworkConfig};
use crate::error::{ForecastError, Result};
use crate::features::feature_matrix;
use crate::models::{ForecastModel, ForecastResult};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::statistics::Statistics;

/// Half-width of the uniform weight initialisation
pub const INIT_SCALE: f64 = 0.1;

/// Dense layer, `weights[out][in]`
#[derive(Debug, Clone, PartialEq)]
struct Layer {
    weights: Vec<Vec<f64>>,
    biases: Vec<f64>,
}

impl Layer {
    fn random<R: Rng>(inputs: usize, outputs: usize, rng: &mut R) -> Self {
        let weights = (0..outputs)
            .map(|_| {
                (0..inputs)
                    .map(|_| rng.gen_range(-INIT_SCALE..=INIT_SCALE))
                    .collect()
            })
            .collect();

        Self {
            weights,
            biases: vec![0.0; outputs],
        }
    }

    fn affine(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.biases)
            .map(|(row, b)| row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect()
    }

    fn apply(&mut self, gradient: &LayerGradient, learning_rate: f64) {
        for (row, grad_row) in self.weights.iter_mut().zip(&gradient.weights) {
            for (w, g) in row.iter_mut().zip(grad_row) {
                *w -= learning_rate * g;
            }
        }
        for (b, g) in self.biases.iter_mut().zip(&gradient.biases) {
            *b -= learning_rate * g;
        }
    }
}

/// Gradient of the half squared error with respect to one layer
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGradient {
    /// `weights[out][in]`
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
}

impl LayerGradient {
    fn outer(delta: &[f64], input: &[f64]) -> Self {
        Self {
            weights: delta
                .iter()
                .map(|d| input.iter().map(|x| d * x).collect())
                .collect(),
            biases: delta.to_vec(),
        }
    }
}

/// Update directions computed for one training sample
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    /// One entry per hidden layer, input side first
    pub hidden: Vec<LayerGradient>,
    pub output: LayerGradient,
    /// `prediction - target`
    pub error: f64,
}

/// Tanh multi-layer perceptron with one linear output
#[derive(Debug, Clone, PartialEq)]
pub struct FeedForwardNetwork {
    hidden: Vec<Layer>,
    output: Layer,
}

impl FeedForwardNetwork {
    /// Build a network with weights drawn from `rng`
    pub fn new<R: Rng>(inputs: usize, config: &NetworkConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        if inputs == 0 {
            return Err(ForecastError::InvalidParameter(
                "Network needs at least one input".to_string(),
            ));
        }

        let mut hidden = Vec::with_capacity(config.hidden_layers);
        let mut width = inputs;
        for _ in 0..config.hidden_layers {
            hidden.push(Layer::random(width, config.units, rng));
            width = config.units;
        }
        let output = Layer::random(width, 1, rng);

        Ok(Self { hidden, output })
    }

    /// Number of inputs the first layer expects
    pub fn inputs(&self) -> usize {
        self.hidden
            .first()
            .and_then(|layer| layer.weights.first())
            .map_or(0, Vec::len)
    }

    /// Activations of every layer, the input itself first, and the output
    fn forward(&self, input: &[f64]) -> (Vec<Vec<f64>>, f64) {
        let mut activations = Vec::with_capacity(self.hidden.len() + 1);
        activations.push(input.to_vec());
        for layer in &self.hidden {
            let next: Vec<f64> = layer
                .affine(&activations[activations.len() - 1])
                .into_iter()
                .map(f64::tanh)
                .collect();
            activations.push(next);
        }
        let out = self.output.affine(&activations[activations.len() - 1])[0];
        (activations, out)
    }

    /// Network output for one input vector
    pub fn predict(&self, input: &[f64]) -> f64 {
        self.forward(input).1
    }

    /// Update directions for one `(input, target)` sample.
    ///
    /// Exact for the output layer and the top hidden layer; approximate below
    /// (see the module docs).
    pub fn gradients(&self, input: &[f64], target: f64) -> Gradients {
        let (activations, out) = self.forward(input);
        let error = out - target;
        let depth = self.hidden.len();

        let top = &activations[depth];
        let output = LayerGradient::outer(&[error], top);

        let mut hidden = Vec::with_capacity(depth);
        for l in 0..depth {
            let h = &activations[l + 1];
            let delta: Vec<f64> = if l + 1 == depth {
                h.iter()
                    .zip(&self.output.weights[0])
                    .map(|(h, w)| error * w * (1.0 - h * h))
                    .collect()
            } else {
                h.iter().map(|h| error * h * (1.0 - h * h)).collect()
            };
            hidden.push(LayerGradient::outer(&delta, &activations[l]));
        }

        Gradients {
            hidden,
            output,
            error,
        }
    }

    /// One SGD step; returns the squared error before the step
    pub fn train_sample(&mut self, input: &[f64], target: f64, learning_rate: f64) -> f64 {
        let gradients = self.gradients(input, target);
        for (layer, gradient) in self.hidden.iter_mut().zip(&gradients.hidden) {
            layer.apply(gradient, learning_rate);
        }
        self.output.apply(&gradients.output, learning_rate);
        gradients.error * gradients.error
    }
}

/// Z-score transform, a zero deviation is treated as one
#[derive(Debug, Clone, Copy, PartialEq)]
struct ZScore {
    mean: f64,
    std: f64,
}

impl ZScore {
    fn fit<'a, I>(values: I) -> Self
    where
        I: Iterator<Item = &'a f64> + Clone,
    {
        let mean = values.clone().mean();
        let std = values.population_std_dev();
        let std = if std.is_finite() && std > 0.0 { std } else { 1.0 };
        Self { mean, std }
    }

    fn scale(&self, value: f64) -> f64 {
        (value - self.mean) / self.std
    }

    fn unscale(&self, value: f64) -> f64 {
        value * self.std + self.mean
    }
}

/// A network trained on one feature matrix, with its standardisation
#[derive(Debug, Clone)]
pub struct TrainedNetwork {
    network: FeedForwardNetwork,
    inputs: Vec<ZScore>,
    target: ZScore,
    lookback: usize,
}

impl TrainedNetwork {
    /// Train on every complete window of `features`.
    ///
    /// Returns `None` when no `(window, target)` sample exists.
    pub fn train(
        features: &[Vec<f64>],
        targets: &[f64],
        lookback: usize,
        config: &NetworkConfig,
    ) -> Result<Option<Self>> {
        validate_inputs(features, targets, lookback)?;
        config.validate()?;
        if features.len() <= lookback {
            return Ok(None);
        }

        let samples: Vec<Vec<f64>> = (lookback..features.len())
            .map(|i| flatten(&features[i - lookback..i]))
            .collect();
        let sample_targets = &targets[lookback..];

        let width = samples[0].len();
        let inputs: Vec<ZScore> = (0..width)
            .map(|k| ZScore::fit(samples.iter().map(|s| &s[k])))
            .collect();
        let target = ZScore::fit(sample_targets.iter());

        let scaled: Vec<Vec<f64>> = samples
            .iter()
            .map(|s| s.iter().zip(&inputs).map(|(x, z)| z.scale(*x)).collect())
            .collect();
        let scaled_targets: Vec<f64> = sample_targets.iter().map(|y| target.scale(*y)).collect();

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut network = FeedForwardNetwork::new(width, config, &mut rng)?;

        for epoch in 0..config.epochs {
            let mut loss = 0.0;
            for (x, y) in scaled.iter().zip(&scaled_targets) {
                loss += network.train_sample(x, *y, config.learning_rate);
            }
            if !loss.is_finite() {
                warn!(
                    "Network diverged at epoch {} (learning rate {})",
                    epoch, config.learning_rate
                );
                break;
            }
            if epoch + 1 == config.epochs {
                debug!(
                    "Network trained: {} samples, final mean squared error {:.6}",
                    scaled.len(),
                    loss / scaled.len() as f64
                );
            }
        }

        Ok(Some(Self {
            network,
            inputs,
            target,
            lookback,
        }))
    }

    /// Number of feature rows in a window
    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// Prediction for the position following the `lookback` rows of `window`,
    /// `NaN` if the network output is not finite
    pub fn predict_window(&self, window: &[Vec<f64>]) -> f64 {
        let flat = flatten(window);
        debug_assert_eq!(flat.len(), self.inputs.len(), "window width mismatch");
        let input: Vec<f64> = flat
            .iter()
            .zip(&self.inputs)
            .map(|(x, z)| z.scale(*x))
            .collect();
        let value = self.target.unscale(self.network.predict(&input));
        if value.is_finite() {
            value
        } else {
            f64::NAN
        }
    }

    /// Predictions aligned with `features`, `NaN` before `lookback`
    pub fn predict_all(&self, features: &[Vec<f64>]) -> Vec<f64> {
        let mut values = vec![f64::NAN; features.len()];
        for i in self.lookback..features.len() {
            values[i] = self.predict_window(&features[i - self.lookback..i]);
        }
        values
    }
}

fn flatten(rows: &[Vec<f64>]) -> Vec<f64> {
    rows.iter().flatten().copied().collect()
}

fn validate_inputs(features: &[Vec<f64>], targets: &[f64], lookback: usize) -> Result<()> {
    if lookback == 0 {
        return Err(ForecastError::InvalidParameter(
            "Lookback must be positive".to_string(),
        ));
    }
    if features.len() != targets.len() {
        return Err(ForecastError::LengthMismatch {
            expected: features.len(),
            got: targets.len(),
        });
    }
    let Some(first) = features.first() else {
        return Ok(());
    };
    if first.is_empty() {
        return Err(ForecastError::DataError(
            "Feature rows must not be empty".to_string(),
        ));
    }
    for (i, row) in features.iter().enumerate() {
        if row.len() != first.len() {
            return Err(ForecastError::DataError(format!(
                "Feature row {} has {} values, expected {}",
                i,
                row.len(),
                first.len()
            )));
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::DataError(format!(
                "Feature row {} contains a non-finite value",
                i
            )));
        }
    }
    if let Some(i) = targets.iter().position(|v| !v.is_finite()) {
        return Err(ForecastError::DataError(format!(
            "Target {} is not finite",
            i
        )));
    }
    Ok(())
}

/// Train a network on `feature_matrix` and predict every position.
///
/// Position `i >= lookback` holds the prediction made from rows
/// `i - lookback..i`; earlier positions and non-finite outputs are `NaN`.
pub fn nonlinear_predict_trained(
    feature_matrix: &[Vec<f64>],
    targets: &[f64],
    lookback: usize,
    config: &NetworkConfig,
) -> Result<Vec<f64>> {
    match TrainedNetwork::train(feature_matrix, targets, lookback, config)? {
        Some(trained) => Ok(trained.predict_all(feature_matrix)),
        None => Ok(vec![f64::NAN; feature_matrix.len()]),
    }
}

/// Trained network over the default price features
#[derive(Debug, Clone)]
pub struct LaggedNetwork {
    name: String,
    lookback: usize,
    ema_alpha: f64,
    rsi_period: usize,
    network: NetworkConfig,
}

impl LaggedNetwork {
    /// Create a new model
    pub fn new(
        lookback: usize,
        ema_alpha: f64,
        rsi_period: usize,
        network: NetworkConfig,
    ) -> Result<Self> {
        if lookback == 0 {
            return Err(ForecastError::InvalidParameter(
                "Lookback must be positive".to_string(),
            ));
        }
        network.validate()?;

        Ok(Self {
            name: format!(
                "Lagged Network (lookback={}, layers={}, units={})",
                lookback, network.hidden_layers, network.units
            ),
            lookback,
            ema_alpha,
            rsi_period,
            network,
        })
    }

    /// Build the model from the shared configuration
    pub fn from_config(config: &ForecastConfig) -> Result<Self> {
        Self::new(
            config.lookback,
            config.ema_alpha(),
            config.rsi_period,
            config.network.clone(),
        )
    }
}

impl ForecastModel for LaggedNetwork {
    fn fit(&self, series: &[f64]) -> Result<ForecastResult> {
        let features = feature_matrix(series, self.ema_alpha, self.rsi_period)?;
        let Some(trained) = TrainedNetwork::train(&features, series, self.lookback, &self.network)?
        else {
            return Ok(ForecastResult::new(vec![f64::NAN; series.len()], f64::NAN));
        };

        let values = trained.predict_all(&features);
        let next_step = trained.predict_window(&features[features.len() - self.lookback..]);
        Ok(ForecastResult::new(values, next_step))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelKind;
    use crate::orchestrator::run_models;
    use approx::assert_relative_eq;

    fn config(hidden_layers: usize, epochs: usize) -> NetworkConfig {
        NetworkConfig {
            hidden_layers,
            units: 4,
            epochs,
            learning_rate: 0.05,
            seed: 7,
        }
    }

    fn single_feature(series: &[f64]) -> Vec<Vec<f64>> {
        series.iter().map(|v| vec![*v]).collect()
    }

    fn half_squared_error(network: &FeedForwardNetwork, input: &[f64], target: f64) -> f64 {
        let e = network.predict(input) - target;
        0.5 * e * e
    }

    #[test]
    fn test_initial_weights_are_small() {
        let mut rng = StdRng::seed_from_u64(1);
        let network = FeedForwardNetwork::new(6, &config(2, 0), &mut rng).unwrap();

        assert_eq!(network.inputs(), 6);
        assert_eq!(network.hidden.len(), 2);
        for layer in network.hidden.iter().chain(std::iter::once(&network.output)) {
            assert!(layer.biases.iter().all(|b| *b == 0.0));
            assert!(layer.weights.iter().flatten().all(|w| w.abs() <= INIT_SCALE));
        }
    }

    #[test]
    fn test_single_hidden_layer_gradient_is_exact() {
        let mut rng = StdRng::seed_from_u64(3);
        let network = FeedForwardNetwork::new(3, &config(1, 0), &mut rng).unwrap();
        let input = [0.4, -1.2, 0.9];
        let target = 1.5;
        let grads = network.gradients(&input, target);
        let h = 1e-6;

        for j in 0..4 {
            for i in 0..3 {
                let mut plus = network.clone();
                plus.hidden[0].weights[j][i] += h;
                let mut minus = network.clone();
                minus.hidden[0].weights[j][i] -= h;
                let numeric = (half_squared_error(&plus, &input, target)
                    - half_squared_error(&minus, &input, target))
                    / (2.0 * h);
                assert_relative_eq!(grads.hidden[0].weights[j][i], numeric, epsilon = 1e-7);
            }
        }
        for j in 0..4 {
            let mut plus = network.clone();
            plus.output.weights[0][j] += h;
            let mut minus = network.clone();
            minus.output.weights[0][j] -= h;
            let numeric = (half_squared_error(&plus, &input, target)
                - half_squared_error(&minus, &input, target))
                / (2.0 * h);
            assert_relative_eq!(grads.output.weights[0][j], numeric, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_deep_layers_use_approximate_gradient() {
        let mut rng = StdRng::seed_from_u64(5);
        let network = FeedForwardNetwork::new(2, &config(2, 0), &mut rng).unwrap();
        let input = [0.7, -0.3];
        let target = 2.0;
        let grads = network.gradients(&input, target);
        let (activations, _) = network.forward(&input);

        // The top hidden layer still matches finite differences
        let h = 1e-6;
        let mut plus = network.clone();
        plus.hidden[1].weights[0][0] += h;
        let mut minus = network.clone();
        minus.hidden[1].weights[0][0] -= h;
        let numeric = (half_squared_error(&plus, &input, target)
            - half_squared_error(&minus, &input, target))
            / (2.0 * h);
        assert_relative_eq!(grads.hidden[1].weights[0][0], numeric, epsilon = 1e-7);

        // The bottom layer follows error * h * (1 - h²) * input
        let mut deviation = 0.0;
        for j in 0..4 {
            let hj = activations[1][j];
            for i in 0..2 {
                let expected = grads.error * hj * (1.0 - hj * hj) * input[i];
                assert_relative_eq!(grads.hidden[0].weights[j][i], expected, epsilon = 1e-12);

                let mut plus = network.clone();
                plus.hidden[0].weights[j][i] += h;
                let mut minus = network.clone();
                minus.hidden[0].weights[j][i] -= h;
                let numeric = (half_squared_error(&plus, &input, target)
                    - half_squared_error(&minus, &input, target))
                    / (2.0 * h);
                deviation += (grads.hidden[0].weights[j][i] - numeric).abs();
            }
        }
        // and is not the true gradient
        assert!(deviation > 1e-6);
    }

    #[test]
    fn test_same_seed_same_output() {
        let series: Vec<f64> = (0..40).map(|i| 50.0 + (i as f64 * 0.4).sin() * 3.0).collect();
        let features = single_feature(&series);

        let a = nonlinear_predict_trained(&features, &series, 3, &config(2, 20)).unwrap();
        let b = nonlinear_predict_trained(&features, &series, 3, &config(2, 20)).unwrap();
        assert_eq!(a[3..], b[3..]);

        let other = NetworkConfig {
            seed: 8,
            ..config(2, 20)
        };
        let c = nonlinear_predict_trained(&features, &series, 3, &other).unwrap();
        assert_ne!(a[3..], c[3..]);
    }

    #[test]
    fn test_output_alignment() {
        let series: Vec<f64> = (0..25).map(|i| 10.0 + i as f64 * 0.5).collect();
        let features: Vec<Vec<f64>> = series.iter().map(|v| vec![*v, v * 2.0]).collect();
        let preds = nonlinear_predict_trained(&features, &series, 4, &config(1, 10)).unwrap();

        assert_eq!(preds.len(), series.len());
        assert!(preds[..4].iter().all(|v| v.is_nan()));
        assert!(preds[4..].iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_training_reduces_error() {
        let series: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let features = single_feature(&series);
        let mse = |preds: &[f64]| {
            preds[2..]
                .iter()
                .zip(&series[2..])
                .map(|(p, y)| (p - y).powi(2))
                .sum::<f64>()
        };

        let untrained = nonlinear_predict_trained(&features, &series, 2, &config(1, 0)).unwrap();
        let trained = nonlinear_predict_trained(&features, &series, 2, &config(1, 200)).unwrap();
        assert!(mse(&trained) < mse(&untrained));
    }

    #[test]
    fn test_short_and_empty_input() {
        let features = single_feature(&[1.0, 2.0]);
        let preds = nonlinear_predict_trained(&features, &[1.0, 2.0], 2, &config(1, 5)).unwrap();
        assert!(preds.iter().all(|v| v.is_nan()));
        assert!(nonlinear_predict_trained(&[], &[], 2, &config(1, 5))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        let features = single_feature(&[1.0, 2.0, 3.0]);
        assert!(matches!(
            nonlinear_predict_trained(&features, &[1.0, 2.0], 1, &config(1, 5)),
            Err(ForecastError::LengthMismatch {
                expected: 3,
                got: 2
            })
        ));
        assert!(nonlinear_predict_trained(&features, &[1.0, 2.0, 3.0], 0, &config(1, 5)).is_err());

        let ragged = vec![vec![1.0], vec![2.0, 3.0]];
        assert!(matches!(
            nonlinear_predict_trained(&ragged, &[1.0, 2.0], 1, &config(1, 5)),
            Err(ForecastError::DataError(_))
        ));
        assert!(LaggedNetwork::new(0, 0.5, 14, NetworkConfig::default()).is_err());
    }

    #[test]
    fn test_divergence_yields_nan_predictions() {
        let series: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let network = NetworkConfig {
            learning_rate: 1e8,
            ..config(3, 50)
        };

        let preds =
            nonlinear_predict_trained(&single_feature(&series), &series, 3, &network).unwrap();
        assert_eq!(preds.len(), series.len());
        assert!(preds.iter().all(|v| v.is_nan()));

        let forecast = ForecastConfig {
            network,
            ..ForecastConfig::default()
        };
        let report = run_models(&series, &[ModelKind::LaggedNetwork], &forecast).unwrap();
        assert!(report.predictions[&ModelKind::LaggedNetwork]
            .iter()
            .all(|v| v.is_nan()));
        assert!(!report.metrics[&ModelKind::LaggedNetwork].is_defined());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["next_step_forecast"]["lstm_nn"].is_null());
        assert!(json["metrics"]["lstm_nn"]["rmse"].is_null());
    }

    #[test]
    #[should_panic(expected = "window width mismatch")]
    fn test_window_of_wrong_width_is_rejected() {
        let series: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let trained = TrainedNetwork::train(&single_feature(&series), &series, 3, &config(1, 2))
            .unwrap()
            .unwrap();
        trained.predict_window(&single_feature(&series[..2]));
    }

    #[test]
    fn test_model_extends_one_step() {
        let series: Vec<f64> = (0..30).map(|i| 20.0 + (i as f64 * 0.5).cos()).collect();
        let model = LaggedNetwork::new(3, 0.3, 5, config(1, 30)).unwrap();
        let result = model.fit(&series).unwrap();

        assert_eq!(result.len(), series.len());
        assert!(result.values()[..3].iter().all(|v| v.is_nan()));
        assert!(result.next_step().is_finite());
    }
}
