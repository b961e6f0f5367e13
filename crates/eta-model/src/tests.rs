//! Unit tests for eta-model.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use eta_features::FeatureMatrix;

use crate::{AdvancedModel, BaselineModel, GbdtParams, Regressor};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// `n` rows of `cols` uniform [0, 1) features and `f(row)` targets.
fn dataset(n: usize, cols: usize, seed: u64, f: impl Fn(&[f64]) -> f64) -> (FeatureMatrix, Vec<f64>) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut x = FeatureMatrix::new(cols);
    let mut y = Vec::with_capacity(n);
    for _ in 0..n {
        let row: Vec<f64> = (0..cols).map(|_| rng.r#gen::<f64>()).collect();
        y.push(f(&row));
        x.push_row(&row).unwrap();
    }
    (x, y)
}

fn small_params() -> GbdtParams {
    GbdtParams { n_trees: 60, max_depth: 4, min_samples_leaf: 5, ..GbdtParams::default() }
}

fn nonlinear(r: &[f64]) -> f64 {
    10.0 + 8.0 * (6.0 * r[0]).sin() + 5.0 * r[1] * r[1]
}

// ── BaselineModel ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod baseline {
    use super::*;
    use crate::ModelError;

    #[test]
    fn recovers_a_linear_relation() {
        let (x, y) = dataset(300, 3, 1, |r| 3.0 + 2.0 * r[0] - r[1]);
        let mut m = BaselineModel::new(1e-6);
        m.fit(&x, &y).unwrap();
        for (row, &target) in x.rows().zip(&y).take(20) {
            assert!((m.predict(row).unwrap() - target).abs() < 1e-3);
        }
        assert!(m.residual_std().unwrap() < 1e-3);
        assert!((m.predict(&[0.5, 0.5, 0.9]).unwrap() - 3.5).abs() < 1e-3);
    }

    #[test]
    fn contributions_sum_to_prediction() {
        let (x, y) = dataset(200, 4, 2, nonlinear);
        let mut m = BaselineModel::default();
        m.fit(&x, &y).unwrap();
        let row = x.row(7);
        let total: f64 = m.contributions(row).unwrap().iter().sum::<f64>() + m.intercept().unwrap();
        assert!((total - m.predict(row).unwrap()).abs() < 1e-9);
        assert_eq!(m.weights().unwrap().len(), 4);
    }

    #[test]
    fn constant_column_gets_zero_weight() {
        let (x, y) = dataset(100, 2, 3, |r| 1.0 + r[0]);
        let mut padded = FeatureMatrix::new(3);
        for r in x.rows() {
            padded.push_row(&[r[0], r[1], 7.0]).unwrap();
        }
        let mut m = BaselineModel::new(0.0);
        m.fit(&padded, &y).unwrap();
        assert_eq!(m.weights().unwrap()[2], 0.0);
    }

    #[test]
    fn uncertainty_is_the_stored_residual_std() {
        let (x, y) = dataset(200, 2, 4, nonlinear);
        let mut m = BaselineModel::default();
        m.fit(&x, &y).unwrap();
        let (point, std) = m.predict_with_uncertainty(x.row(0)).unwrap();
        assert_eq!(point, m.predict(x.row(0)).unwrap());
        assert_eq!(Some(std), m.residual_std());
        assert!(std > 0.0);
    }

    #[test]
    fn bad_training_data_is_a_typed_error() {
        let mut m = BaselineModel::default();
        assert!(matches!(m.fit(&FeatureMatrix::new(2), &[]), Err(ModelError::Empty)));

        let (x, _) = dataset(10, 2, 5, |_| 0.0);
        assert!(matches!(m.fit(&x, &[1.0; 9]), Err(ModelError::ShapeMismatch { .. })));
        assert!(matches!(m.fit(&x, &[4.0; 10]), Err(ModelError::ZeroVarianceTargets)));

        let mut y = vec![1.0; 10];
        y[0] = f64::NAN;
        assert!(matches!(m.fit(&x, &y), Err(ModelError::NonFinite("targets"))));

        let mut nan_x = FeatureMatrix::new(1);
        nan_x.push_row(&[f64::INFINITY]).unwrap();
        nan_x.push_row(&[1.0]).unwrap();
        assert!(matches!(m.fit(&nan_x, &[1.0, 2.0]), Err(ModelError::NonFinite("features"))));
        assert!(!m.is_fitted());
    }

    #[test]
    fn unfitted_and_misshapen_predictions_fail() {
        let m = BaselineModel::default();
        assert!(matches!(m.predict(&[1.0]), Err(ModelError::NotFitted)));
        assert!(matches!(m.predict_with_uncertainty(&[1.0]), Err(ModelError::NotFitted)));

        let (x, y) = dataset(50, 2, 6, nonlinear);
        let mut m = BaselineModel::default();
        m.fit(&x, &y).unwrap();
        assert!(matches!(
            m.predict(&[1.0, 2.0, 3.0]),
            Err(ModelError::WidthMismatch { expected: 2, found: 3 })
        ));
    }
}

// ── AdvancedModel ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod advanced {
    use super::*;
    use crate::{ModelError, evaluate};

    #[test]
    fn learns_a_step_function() {
        let (x, y) = dataset(400, 3, 7, |r| if r[0] > 0.5 { 10.0 } else { 2.0 });
        let mut m = AdvancedModel::new(small_params());
        m.fit(&x, &y).unwrap();
        assert!((m.predict(&[0.9, 0.1, 0.1]).unwrap() - 10.0).abs() < 0.5);
        assert!((m.predict(&[0.1, 0.9, 0.9]).unwrap() - 2.0).abs() < 0.5);
        // Only the bin straddling 0.5 can stay wrong.
        assert!(m.residual_std().unwrap() < 1.0);

        let importance = m.feature_importance().unwrap();
        assert!((importance.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(importance[0] > 0.9);
    }

    #[test]
    fn trees_respect_max_depth() {
        let (x, y) = dataset(300, 4, 8, nonlinear);
        let mut m = AdvancedModel::new(GbdtParams { max_depth: 3, ..small_params() });
        m.fit(&x, &y).unwrap();
        assert_eq!(m.n_trees(), 60);
        assert!(m.max_tree_depth() <= 3);
        assert!(m.max_tree_depth() >= 1);
    }

    #[test]
    fn beats_the_baseline_on_nonlinear_data() {
        let (x, y) = dataset(800, 4, 9, nonlinear);
        let (tx, ty) = dataset(200, 4, 10, nonlinear);

        let mut baseline = BaselineModel::default();
        baseline.fit(&x, &y).unwrap();
        let mut advanced = AdvancedModel::new(small_params());
        advanced.fit(&x, &y).unwrap();

        let b = evaluate(&baseline, &tx, &ty).unwrap();
        let a = evaluate(&advanced, &tx, &ty).unwrap();
        assert!(a.rmse < b.rmse, "advanced {} vs baseline {}", a.rmse, b.rmse);
        assert!(a.r2 > 0.9);
    }

    #[test]
    fn validation_truncates_the_ensemble() {
        let (x, y) = dataset(300, 3, 11, nonlinear);
        let (vx, vy) = dataset(100, 3, 12, nonlinear);
        let mut m = AdvancedModel::new(GbdtParams { n_trees: 120, ..small_params() });
        m.fit_with_validation(&x, &y, Some((&vx, vy.as_slice()))).unwrap();

        assert!(m.n_trees() >= 1 && m.n_trees() <= 120);
        let rmse = m.validation_rmse().unwrap();
        let direct = evaluate(&m, &vx, &vy).unwrap().rmse;
        assert!((rmse - direct).abs() < 1e-9);
    }

    #[test]
    fn uncertainty_comes_from_validation_residuals() {
        let (x, y) = dataset(300, 3, 16, nonlinear);
        let (vx, vy) = dataset(100, 3, 17, |r| nonlinear(r) + 4.0 * (r[2] - 0.5));
        let mut m = AdvancedModel::new(small_params());
        m.fit_with_validation(&x, &y, Some((&vx, vy.as_slice()))).unwrap();

        let residuals: Vec<f64> = vx.rows().zip(&vy).map(|(r, t)| t - m.predict(r).unwrap()).collect();
        let mean = residuals.iter().sum::<f64>() / residuals.len() as f64;
        let var = residuals.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / (residuals.len() - 1) as f64;
        assert!((m.residual_std().unwrap() - var.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn validation_width_must_match() {
        let (x, y) = dataset(50, 3, 13, nonlinear);
        let (vx, vy) = dataset(10, 2, 14, nonlinear);
        let mut m = AdvancedModel::new(small_params());
        assert!(matches!(
            m.fit_with_validation(&x, &y, Some((&vx, vy.as_slice()))),
            Err(ModelError::WidthMismatch { .. })
        ));
    }

    #[test]
    fn fitting_is_deterministic() {
        let (x, y) = dataset(200, 3, 15, nonlinear);
        let mut a = AdvancedModel::new(small_params());
        let mut b = AdvancedModel::new(small_params());
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        for row in x.rows().take(25) {
            assert_eq!(a.predict(row).unwrap(), b.predict(row).unwrap());
        }
    }

    #[test]
    fn unfitted_model_reports_not_fitted() {
        let m = AdvancedModel::default();
        assert!(matches!(m.predict(&[0.0]), Err(ModelError::NotFitted)));
        assert_eq!(m.residual_std(), None);
        assert_eq!(m.n_trees(), 0);
    }
}

// ── Metrics ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod metrics {
    use crate::{Metrics, ModelError};

    #[test]
    fn known_values() {
        let m = Metrics::from_predictions(&[11.0, 18.0, 30.0], &[10.0, 20.0, 30.0]).unwrap();
        assert_eq!(m.n, 3);
        assert!((m.mae - 1.0).abs() < 1e-12);
        assert!((m.rmse - (5.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((m.mape - 100.0 * (0.1 + 0.1) / 3.0).abs() < 1e-9);
        assert!((m.r2 - (1.0 - 5.0 / 200.0)).abs() < 1e-12);
    }

    #[test]
    fn perfect_and_invalid_inputs() {
        let m = Metrics::from_predictions(&[5.0, 5.0], &[5.0, 5.0]).unwrap();
        assert_eq!((m.mae, m.rmse, m.r2), (0.0, 0.0, 1.0));
        assert!(matches!(Metrics::from_predictions(&[], &[]), Err(ModelError::Empty)));
        assert!(matches!(
            Metrics::from_predictions(&[1.0], &[1.0, 2.0]),
            Err(ModelError::ShapeMismatch { .. })
        ));
    }
}
