//! Quantile binning of feature columns for histogram split search.
//!
//! Each column gets up to `n_bins − 1` ascending thresholds.  A value's bin
//! is the number of thresholds strictly below it, so
//!
//! ```text
//! value <= thresholds[b]  ⇔  bin(value) <= b
//! ```
//!
//! and a split found on bins can be replayed on raw values at inference time
//! without keeping the binning around.

use eta_features::FeatureMatrix;

/// Per-column thresholds fitted on training data.
#[derive(Clone, Debug)]
pub(crate) struct BinMapper {
    thresholds: Vec<Vec<f64>>,
}

impl BinMapper {
    pub(crate) fn fit(x: &FeatureMatrix, n_bins: usize) -> Self {
        let thresholds = (0..x.n_cols())
            .map(|j| {
                let mut values: Vec<f64> = x.column(j).collect();
                values.sort_by(f64::total_cmp);
                values.dedup();
                column_thresholds(&values, n_bins)
            })
            .collect();
        Self { thresholds }
    }

    /// Bins per column (thresholds + 1).
    #[inline]
    pub(crate) fn n_bins(&self, col: usize) -> usize {
        self.thresholds[col].len() + 1
    }

    #[inline]
    pub(crate) fn threshold(&self, col: usize, bin: usize) -> f64 {
        self.thresholds[col][bin]
    }

    #[inline]
    pub(crate) fn bin(&self, col: usize, value: f64) -> u8 {
        self.thresholds[col].partition_point(|&t| t < value) as u8
    }

    /// Column-major bin indices for every cell of `x`.
    pub(crate) fn transform(&self, x: &FeatureMatrix) -> Vec<Vec<u8>> {
        (0..x.n_cols())
            .map(|j| x.column(j).map(|v| self.bin(j, v)).collect())
            .collect()
    }
}

/// Thresholds for one column given its sorted distinct values.
fn column_thresholds(distinct: &[f64], n_bins: usize) -> Vec<f64> {
    if distinct.len() <= n_bins {
        // Few distinct values: split between every neighbouring pair.
        return distinct.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();
    }
    let mut out: Vec<f64> = (1..n_bins)
        .map(|k| distinct[k * distinct.len() / n_bins - 1])
        .collect();
    out.dedup();
    out
}
