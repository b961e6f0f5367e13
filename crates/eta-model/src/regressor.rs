//! The `Regressor` trait shared by both model tiers.

use statrs::statistics::Statistics;

use eta_features::FeatureMatrix;

use crate::{ModelError, ModelResult};

/// A trained-once, read-many duration regressor.
///
/// Implementations are `Send + Sync` so a fitted model can sit behind an
/// `Arc` and serve concurrent requests without locking.
pub trait Regressor: Send + Sync {
    /// Short label reported alongside predictions (`"baseline"`, `"advanced"`).
    fn name(&self) -> &'static str;

    /// Fit on `x` (one row per trip) against `y` (minutes).
    fn fit(&mut self, x: &FeatureMatrix, y: &[f64]) -> ModelResult<()>;

    /// Point estimate for one feature row.
    fn predict(&self, row: &[f64]) -> ModelResult<f64>;

    /// Residual standard deviation recorded at fit time; `None` before
    /// fitting.
    fn residual_std(&self) -> Option<f64>;

    /// Point estimate plus the stored residual standard deviation.
    fn predict_with_uncertainty(&self, row: &[f64]) -> ModelResult<(f64, f64)> {
        let std = self.residual_std().ok_or(ModelError::NotFitted)?;
        Ok((self.predict(row)?, std))
    }

    fn predict_batch(&self, x: &FeatureMatrix) -> ModelResult<Vec<f64>> {
        x.rows().map(|r| self.predict(r)).collect()
    }
}

// ── Shared checks ─────────────────────────────────────────────────────────────

/// Reject training data no model can be fitted on.
pub(crate) fn check_training_data(x: &FeatureMatrix, y: &[f64]) -> ModelResult<()> {
    if x.n_rows() == 0 || y.is_empty() {
        return Err(ModelError::Empty);
    }
    if x.n_rows() != y.len() {
        return Err(ModelError::ShapeMismatch { rows: x.n_rows(), targets: y.len() });
    }
    if x.rows().flatten().any(|v| !v.is_finite()) {
        return Err(ModelError::NonFinite("features"));
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(ModelError::NonFinite("targets"));
    }
    if y.iter().all(|&v| v == y[0]) {
        return Err(ModelError::ZeroVarianceTargets);
    }
    Ok(())
}

pub(crate) fn check_width(expected: usize, row: &[f64]) -> ModelResult<()> {
    if row.len() != expected {
        return Err(ModelError::WidthMismatch { expected, found: row.len() });
    }
    Ok(())
}

/// Sample standard deviation of `actual − predicted`.
pub(crate) fn residual_std(predicted: &[f64], actual: &[f64]) -> f64 {
    if actual.len() < 2 {
        return 0.0;
    }
    let residuals: Vec<f64> = actual.iter().zip(predicted).map(|(a, p)| a - p).collect();
    residuals.std_dev()
}
