//! Histogram gradient-boosted regression trees.
//!
//! # Algorithm
//!
//! Squared-error boosting from the target mean.  Each round fits one tree to
//! the current residuals:
//!
//! 1. Every feature column is quantile-binned once, up front
//!    ([`BinMapper`]).
//! 2. A node accumulates per-bin residual sums and counts for every feature,
//!    then scans the bins left to right for the split with the largest gain
//!
//!    ```text
//!    gain = G_L²/(n_L+λ) + G_R²/(n_R+λ) − G²/(n+λ)
//!    ```
//!
//!    subject to `min_samples_leaf` on both sides.
//! 3. Leaves predict `η · G/(n+λ)`.
//!
//! Nodes split depth-first until `max_depth` or no split gains anything.
//! Splits are stored as raw-value thresholds, so inference never touches the
//! binning.
//!
//! When a validation set is supplied the ensemble is truncated to the round
//! with the lowest validation RMSE, and the stored residual standard
//! deviation is measured on the validation rows instead of the training rows.

use serde::{Deserialize, Serialize};

use eta_core::ModelConfig;
use eta_features::FeatureMatrix;

use crate::binning::BinMapper;
use crate::regressor::{check_training_data, check_width, residual_std};
use crate::{ModelError, ModelResult, Regressor};

/// Split gains at or below this are treated as no improvement.
const MIN_SPLIT_GAIN: f64 = 1e-9;

// ── Parameters ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GbdtParams {
    pub n_trees:          usize,
    pub max_depth:        usize,
    pub learning_rate:    f64,
    pub n_bins:           usize,
    pub min_samples_leaf: usize,
    pub l2_penalty:       f64,
}

impl From<&ModelConfig> for GbdtParams {
    fn from(m: &ModelConfig) -> Self {
        Self {
            n_trees:          m.n_trees,
            max_depth:        m.max_depth,
            learning_rate:    m.learning_rate,
            n_bins:           m.n_bins.clamp(2, 256),
            min_samples_leaf: m.min_samples_leaf.max(1),
            l2_penalty:       m.l2_penalty,
        }
    }
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self::from(&ModelConfig::default())
    }
}

// ── Tree ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
enum Node {
    Leaf(f64),
    Split { feature: usize, threshold: f64, left: u32, right: u32 },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn predict(&self, row: &[f64]) -> f64 {
        let mut i = 0usize;
        loop {
            match &self.nodes[i] {
                Node::Leaf(v) => return *v,
                Node::Split { feature, threshold, left, right } => {
                    let next = if row[*feature] <= *threshold { *left } else { *right };
                    i = next as usize;
                }
            }
        }
    }

    fn depth(&self) -> usize {
        fn walk(nodes: &[Node], i: usize) -> usize {
            match &nodes[i] {
                Node::Leaf(_) => 0,
                Node::Split { left, right, .. } => {
                    1 + walk(nodes, *left as usize).max(walk(nodes, *right as usize))
                }
            }
        }
        walk(&self.nodes, 0)
    }
}

// ── Tree growing ──────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug)]
struct SplitCandidate {
    feature: usize,
    bin:     u8,
    gain:    f64,
}

struct TreeBuilder<'a> {
    mapper:    &'a BinMapper,
    /// Column-major bins, `bins[feature][row]`.
    bins:      &'a [Vec<u8>],
    residuals: &'a [f64],
    params:    &'a GbdtParams,
    gains:     Vec<f64>,
}

impl TreeBuilder<'_> {
    fn build(mut self, rows: &[u32]) -> (Tree, Vec<f64>) {
        let mut nodes = Vec::new();
        self.grow(&mut nodes, rows, 0);
        (Tree { nodes }, self.gains)
    }

    fn grow(&mut self, nodes: &mut Vec<Node>, rows: &[u32], depth: usize) -> u32 {
        let p = self.params;
        let n = rows.len();
        let sum: f64 = rows.iter().map(|&r| self.residuals[r as usize]).sum();

        let index = nodes.len() as u32;
        nodes.push(Node::Leaf(p.learning_rate * sum / (n as f64 + p.l2_penalty)));

        if depth >= p.max_depth || n < 2 * p.min_samples_leaf {
            return index;
        }
        let Some(split) = self.best_split(rows, sum) else {
            return index;
        };
        self.gains[split.feature] += split.gain;

        let column = &self.bins[split.feature];
        let (left_rows, right_rows): (Vec<u32>, Vec<u32>) =
            rows.iter().partition(|&&r| column[r as usize] <= split.bin);

        let left = self.grow(nodes, &left_rows, depth + 1);
        let right = self.grow(nodes, &right_rows, depth + 1);
        nodes[index as usize] = Node::Split {
            feature:   split.feature,
            threshold: self.mapper.threshold(split.feature, split.bin as usize),
            left,
            right,
        };
        index
    }

    /// Highest-gain split over all features; ties go to the lower feature
    /// index so the result does not depend on search order.
    fn best_split(&self, rows: &[u32], sum: f64) -> Option<SplitCandidate> {
        let n_features = self.bins.len();

        #[cfg(feature = "parallel")]
        let candidates: Vec<Option<SplitCandidate>> = {
            use rayon::prelude::*;
            (0..n_features)
                .into_par_iter()
                .map(|j| self.feature_split(j, rows, sum))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let candidates: Vec<Option<SplitCandidate>> =
            (0..n_features).map(|j| self.feature_split(j, rows, sum)).collect();

        candidates
            .into_iter()
            .flatten()
            .fold(None, |best: Option<SplitCandidate>, c| match best {
                Some(b) if b.gain >= c.gain => Some(b),
                _ => Some(c),
            })
    }

    fn feature_split(&self, feature: usize, rows: &[u32], sum: f64) -> Option<SplitCandidate> {
        let n_bins = self.mapper.n_bins(feature);
        if n_bins < 2 {
            return None;
        }
        let column = &self.bins[feature];
        let mut grad = vec![0.0; n_bins];
        let mut count = vec![0usize; n_bins];
        for &r in rows {
            let b = column[r as usize] as usize;
            grad[b] += self.residuals[r as usize];
            count[b] += 1;
        }

        let (lambda, min_leaf) = (self.params.l2_penalty, self.params.min_samples_leaf);
        let n = rows.len();
        let parent = sum * sum / (n as f64 + lambda);

        let mut best: Option<SplitCandidate> = None;
        let (mut g_left, mut n_left) = (0.0, 0usize);
        for b in 0..n_bins - 1 {
            g_left += grad[b];
            n_left += count[b];
            let n_right = n - n_left;
            if n_left < min_leaf || n_right < min_leaf {
                continue;
            }
            let g_right = sum - g_left;
            let gain = g_left * g_left / (n_left as f64 + lambda)
                + g_right * g_right / (n_right as f64 + lambda)
                - parent;
            if gain > MIN_SPLIT_GAIN && best.is_none_or(|s| gain > s.gain) {
                best = Some(SplitCandidate { feature, bin: b as u8, gain });
            }
        }
        best
    }
}

// ── AdvancedModel ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdvancedModel {
    params: GbdtParams,
    fitted: Option<Ensemble>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Ensemble {
    n_features:      usize,
    base:            f64,
    trees:           Vec<Tree>,
    /// Normalised split gain per feature.
    importance:      Vec<f64>,
    residual_std:    f64,
    validation_rmse: Option<f64>,
}

impl AdvancedModel {
    pub fn new(params: GbdtParams) -> Self {
        Self { params, fitted: None }
    }

    pub fn params(&self) -> &GbdtParams {
        &self.params
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Trees kept after any validation truncation.
    pub fn n_trees(&self) -> usize {
        self.fitted.as_ref().map_or(0, |e| e.trees.len())
    }

    /// Deepest tree in the ensemble.
    pub fn max_tree_depth(&self) -> usize {
        self.fitted
            .as_ref()
            .map_or(0, |e| e.trees.iter().map(Tree::depth).max().unwrap_or(0))
    }

    /// Share of total split gain earned by each feature; sums to 1 unless no
    /// split was ever made.
    pub fn feature_importance(&self) -> Option<&[f64]> {
        self.fitted.as_ref().map(|e| e.importance.as_slice())
    }

    /// Validation RMSE at the kept round, when fitted with a validation set.
    pub fn validation_rmse(&self) -> Option<f64> {
        self.fitted.as_ref().and_then(|e| e.validation_rmse)
    }

    /// Fit, optionally truncating at the round with the best validation RMSE.
    pub fn fit_with_validation(
        &mut self,
        x: &FeatureMatrix,
        y: &[f64],
        validation: Option<(&FeatureMatrix, &[f64])>,
    ) -> ModelResult<()> {
        check_training_data(x, y)?;
        let validation = match validation {
            Some((vx, vy)) if vx.n_rows() > 0 => {
                if vx.n_cols() != x.n_cols() {
                    return Err(ModelError::WidthMismatch { expected: x.n_cols(), found: vx.n_cols() });
                }
                if vx.n_rows() != vy.len() {
                    return Err(ModelError::ShapeMismatch { rows: vx.n_rows(), targets: vy.len() });
                }
                Some((vx, vy))
            }
            _ => None,
        };

        let (n, p) = (x.n_rows(), x.n_cols());
        let params = &self.params;
        let mapper = BinMapper::fit(x, params.n_bins);
        let bins = mapper.transform(x);
        let base = y.iter().sum::<f64>() / n as f64;
        let all_rows: Vec<u32> = (0..n as u32).collect();

        let mut predicted = vec![base; n];
        let mut val_predicted = validation.map(|(vx, _)| vec![base; vx.n_rows()]);
        let mut trees: Vec<Tree> = Vec::with_capacity(params.n_trees);
        let mut tree_gains: Vec<Vec<f64>> = Vec::with_capacity(params.n_trees);
        let mut best: Option<(f64, usize)> = None;

        for round in 0..params.n_trees {
            let residuals: Vec<f64> = y.iter().zip(&predicted).map(|(t, p)| t - p).collect();
            let builder = TreeBuilder {
                mapper:    &mapper,
                bins:      &bins,
                residuals: &residuals,
                params,
                gains:     vec![0.0; p],
            };
            let (tree, gains) = builder.build(&all_rows);

            for (i, row) in x.rows().enumerate() {
                predicted[i] += tree.predict(row);
            }
            if let (Some((vx, vy)), Some(vp)) = (validation, val_predicted.as_mut()) {
                for (i, row) in vx.rows().enumerate() {
                    vp[i] += tree.predict(row);
                }
                let rmse = rmse(vp, vy);
                if best.is_none_or(|(b, _)| rmse < b) {
                    best = Some((rmse, round + 1));
                }
            }
            trees.push(tree);
            tree_gains.push(gains);

            if (round + 1) % 50 == 0 {
                tracing::debug!(round = round + 1, "boosting");
            }
        }

        let validation_rmse = best.map(|(rmse, _)| rmse);
        if let Some((_, keep)) = best {
            if keep < trees.len() {
                trees.truncate(keep);
                tree_gains.truncate(keep);
                predicted = x
                    .rows()
                    .map(|r| base + trees.iter().map(|t| t.predict(r)).sum::<f64>())
                    .collect();
            }
        }

        // Held-out residuals when there are enough of them; in-sample
        // residuals understate the error of a boosted ensemble.
        let residual_std = match validation {
            Some((vx, vy)) if vy.len() >= 2 => {
                let vp: Vec<f64> = vx
                    .rows()
                    .map(|r| base + trees.iter().map(|t| t.predict(r)).sum::<f64>())
                    .collect();
                residual_std(&vp, vy)
            }
            _ => residual_std(&predicted, y),
        };

        let mut importance = vec![0.0; p];
        for gains in &tree_gains {
            for (acc, g) in importance.iter_mut().zip(gains) {
                *acc += g;
            }
        }
        let total: f64 = importance.iter().sum();
        if total > 0.0 {
            importance.iter_mut().for_each(|v| *v /= total);
        }

        let ensemble = Ensemble {
            n_features: p,
            base,
            residual_std,
            trees,
            importance,
            validation_rmse,
        };
        tracing::info!(
            rows = n,
            trees = ensemble.trees.len(),
            residual_std = ensemble.residual_std,
            validation_rmse = ?ensemble.validation_rmse,
            "gradient-boosted ensemble fitted"
        );
        self.fitted = Some(ensemble);
        Ok(())
    }
}

impl Default for AdvancedModel {
    fn default() -> Self {
        Self::new(GbdtParams::default())
    }
}

impl Regressor for AdvancedModel {
    fn name(&self) -> &'static str {
        "advanced"
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[f64]) -> ModelResult<()> {
        self.fit_with_validation(x, y, None)
    }

    fn predict(&self, row: &[f64]) -> ModelResult<f64> {
        let e = self.fitted.as_ref().ok_or(ModelError::NotFitted)?;
        check_width(e.n_features, row)?;
        Ok(e.base + e.trees.iter().map(|t| t.predict(row)).sum::<f64>())
    }

    fn residual_std(&self) -> Option<f64> {
        self.fitted.as_ref().map(|e| e.residual_std)
    }
}

fn rmse(predicted: &[f64], actual: &[f64]) -> f64 {
    let sse: f64 = predicted.iter().zip(actual).map(|(p, a)| (p - a).powi(2)).sum();
    (sse / actual.len().max(1) as f64).sqrt()
}
