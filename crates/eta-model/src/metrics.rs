//! Held-out evaluation.

use serde::{Deserialize, Serialize};

use eta_features::FeatureMatrix;

use crate::{ModelError, ModelResult, Regressor};

/// Error summary of one model on one dataset.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Metrics {
    pub n:    usize,
    /// Mean absolute error, minutes.
    pub mae:  f64,
    /// Root mean squared error, minutes.
    pub rmse: f64,
    /// Mean absolute percentage error, percent.  Rows with a zero target are
    /// skipped.
    pub mape: f64,
    pub r2:   f64,
}

impl Metrics {
    pub fn from_predictions(predicted: &[f64], actual: &[f64]) -> ModelResult<Self> {
        if actual.is_empty() {
            return Err(ModelError::Empty);
        }
        if predicted.len() != actual.len() {
            return Err(ModelError::ShapeMismatch { rows: predicted.len(), targets: actual.len() });
        }
        let n = actual.len();
        let nf = n as f64;

        let mae = predicted.iter().zip(actual).map(|(p, a)| (p - a).abs()).sum::<f64>() / nf;
        let sse = predicted.iter().zip(actual).map(|(p, a)| (p - a).powi(2)).sum::<f64>();
        let rmse = (sse / nf).sqrt();

        let (ape_sum, ape_n) = predicted
            .iter()
            .zip(actual)
            .filter(|(_, a)| **a != 0.0)
            .fold((0.0, 0usize), |(s, k), (p, a)| (s + ((p - a) / a).abs(), k + 1));
        let mape = if ape_n == 0 { 0.0 } else { 100.0 * ape_sum / ape_n as f64 };

        let mean = actual.iter().sum::<f64>() / nf;
        let sst = actual.iter().map(|a| (a - mean).powi(2)).sum::<f64>();
        let r2 = if sst > 0.0 { 1.0 - sse / sst } else if sse == 0.0 { 1.0 } else { 0.0 };

        Ok(Self { n, mae, rmse, mape, r2 })
    }
}

/// Score `model` on `x` against the realised durations `y`.
pub fn evaluate<M: Regressor + ?Sized>(model: &M, x: &FeatureMatrix, y: &[f64]) -> ModelResult<Metrics> {
    let predicted = model.predict_batch(x)?;
    let metrics = Metrics::from_predictions(&predicted, y)?;
    tracing::info!(
        model = model.name(),
        n = metrics.n,
        mae = metrics.mae,
        rmse = metrics.rmse,
        mape = metrics.mape,
        r2 = metrics.r2,
        "evaluation"
    );
    Ok(metrics)
}
