//! Ridge-regularised linear baseline.
//!
//! Features are standardised with the training mean and standard deviation,
//! then the ridge normal equations
//!
//! ```text
//! (ZᵀZ + αI) w = Zᵀ(y − ȳ)
//! ```
//!
//! are solved by Cholesky factorisation.  Centring makes the intercept
//! exactly `ȳ`.  Constant columns carry no information; they are pinned at
//! zero weight so the system stays positive definite even with `α = 0`.

use serde::{Deserialize, Serialize};

use eta_features::FeatureMatrix;

use crate::regressor::{check_training_data, check_width, residual_std};
use crate::{ModelError, ModelResult, Regressor};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BaselineModel {
    alpha:  f64,
    fitted: Option<LinearFit>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct LinearFit {
    means:        Vec<f64>,
    scales:       Vec<f64>,
    weights:      Vec<f64>,
    intercept:    f64,
    residual_std: f64,
}

impl BaselineModel {
    pub fn new(alpha: f64) -> Self {
        Self { alpha, fitted: None }
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Intercept, the training mean of the target.
    pub fn intercept(&self) -> Option<f64> {
        self.fitted.as_ref().map(|f| f.intercept)
    }

    /// Per-feature weights on the standardised scale.
    pub fn weights(&self) -> Option<&[f64]> {
        self.fitted.as_ref().map(|f| f.weights.as_slice())
    }

    /// Additive contribution of each feature to the prediction for `row`.
    /// The contributions plus [`intercept`](Self::intercept) equal
    /// [`predict`](Regressor::predict).
    pub fn contributions(&self, row: &[f64]) -> ModelResult<Vec<f64>> {
        let fit = self.fitted.as_ref().ok_or(ModelError::NotFitted)?;
        check_width(fit.weights.len(), row)?;
        Ok(row
            .iter()
            .enumerate()
            .map(|(j, &v)| fit.weights[j] * (v - fit.means[j]) / fit.scales[j])
            .collect())
    }
}

impl Default for BaselineModel {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Regressor for BaselineModel {
    fn name(&self) -> &'static str {
        "baseline"
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[f64]) -> ModelResult<()> {
        check_training_data(x, y)?;
        let (n, p) = (x.n_rows(), x.n_cols());

        // ── Standardise ───────────────────────────────────────────────────
        let means: Vec<f64> = (0..p).map(|j| x.column(j).sum::<f64>() / n as f64).collect();
        let scales: Vec<f64> = (0..p)
            .map(|j| {
                let var = x.column(j).map(|v| (v - means[j]).powi(2)).sum::<f64>() / n as f64;
                var.sqrt()
            })
            .collect();
        let constant: Vec<bool> = scales.iter().map(|&s| s < 1e-12).collect();
        let scales: Vec<f64> = scales.iter().map(|&s| if s < 1e-12 { 1.0 } else { s }).collect();
        let y_mean = y.iter().sum::<f64>() / n as f64;

        // ── Normal equations ──────────────────────────────────────────────
        let mut gram = vec![0.0; p * p];
        let mut rhs = vec![0.0; p];
        let mut z = vec![0.0; p];
        for (row, &target) in x.rows().zip(y) {
            for j in 0..p {
                z[j] = (row[j] - means[j]) / scales[j];
            }
            let centred = target - y_mean;
            for a in 0..p {
                rhs[a] += z[a] * centred;
                for b in 0..=a {
                    gram[a * p + b] += z[a] * z[b];
                }
            }
        }
        for a in 0..p {
            for b in 0..a {
                gram[b * p + a] = gram[a * p + b];
            }
            gram[a * p + a] += if constant[a] { 1.0 } else { self.alpha };
        }

        let weights = cholesky_solve(&mut gram, &rhs, p)?;

        let mut fit = LinearFit { means, scales, weights, intercept: y_mean, residual_std: 0.0 };
        let predicted: Vec<f64> = x.rows().map(|r| linear_predict(&fit, r)).collect();
        fit.residual_std = residual_std(&predicted, y);

        tracing::info!(rows = n, features = p, alpha = self.alpha, residual_std = fit.residual_std, "baseline fitted");
        self.fitted = Some(fit);
        Ok(())
    }

    fn predict(&self, row: &[f64]) -> ModelResult<f64> {
        let fit = self.fitted.as_ref().ok_or(ModelError::NotFitted)?;
        check_width(fit.weights.len(), row)?;
        Ok(linear_predict(fit, row))
    }

    fn residual_std(&self) -> Option<f64> {
        self.fitted.as_ref().map(|f| f.residual_std)
    }
}

fn linear_predict(fit: &LinearFit, row: &[f64]) -> f64 {
    fit.intercept
        + row
            .iter()
            .enumerate()
            .map(|(j, &v)| fit.weights[j] * (v - fit.means[j]) / fit.scales[j])
            .sum::<f64>()
}

// ── Cholesky ──────────────────────────────────────────────────────────────────

/// Solve `A w = b` for symmetric positive-definite `A` (row-major, `p × p`).
/// `A` is overwritten with its lower Cholesky factor.
fn cholesky_solve(a: &mut [f64], b: &[f64], p: usize) -> ModelResult<Vec<f64>> {
    for j in 0..p {
        let mut d = a[j * p + j];
        for k in 0..j {
            d -= a[j * p + k] * a[j * p + k];
        }
        if !d.is_finite() || d <= 1e-12 {
            return Err(ModelError::Singular);
        }
        let d = d.sqrt();
        a[j * p + j] = d;
        for i in j + 1..p {
            let mut s = a[i * p + j];
            for k in 0..j {
                s -= a[i * p + k] * a[j * p + k];
            }
            a[i * p + j] = s / d;
        }
    }

    // L u = b
    let mut u = vec![0.0; p];
    for i in 0..p {
        let mut s = b[i];
        for k in 0..i {
            s -= a[i * p + k] * u[k];
        }
        u[i] = s / a[i * p + i];
    }
    // Lᵀ w = u
    let mut w = vec![0.0; p];
    for i in (0..p).rev() {
        let mut s = u[i];
        for k in i + 1..p {
            s -= a[k * p + i] * w[k];
        }
        w[i] = s / a[i * p + i];
    }
    Ok(w)
}
