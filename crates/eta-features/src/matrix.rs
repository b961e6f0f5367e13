//! Feature vectors and row-major feature matrices.

use std::ops::Index;

use crate::schema::{FEATURE_COUNT, feature_index};
use crate::{FeatureError, FeatureResult};

// ── FeatureVector ─────────────────────────────────────────────────────────────

/// One transformed request, in schema order.
#[derive(Clone, PartialEq, Debug)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub(crate) fn from_values(values: Vec<f64>) -> FeatureResult<Self> {
        let found = values.len();
        <[f64; FEATURE_COUNT]>::try_from(values)
            .map(FeatureVector)
            .map_err(|_| FeatureError::WidthMismatch { expected: FEATURE_COUNT, found })
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Value of the named feature, `None` for names outside the schema.
    pub fn get(&self, name: &str) -> Option<f64> {
        feature_index(name).map(|i| self.0[i])
    }
}

impl Index<usize> for FeatureVector {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

// ── FeatureMatrix ─────────────────────────────────────────────────────────────

/// Dense row-major matrix with a fixed column count.
#[derive(Clone, PartialEq, Debug)]
pub struct FeatureMatrix {
    n_cols: usize,
    data:   Vec<f64>,
}

impl FeatureMatrix {
    pub fn new(n_cols: usize) -> Self {
        Self { n_cols, data: Vec::new() }
    }

    pub fn with_capacity(n_cols: usize, n_rows: usize) -> Self {
        Self { n_cols, data: Vec::with_capacity(n_cols * n_rows) }
    }

    /// Build from equally wide rows.
    pub fn from_rows<R: AsRef<[f64]>>(n_cols: usize, rows: &[R]) -> FeatureResult<Self> {
        let mut m = Self::with_capacity(n_cols, rows.len());
        for r in rows {
            m.push_row(r.as_ref())?;
        }
        Ok(m)
    }

    pub fn push_row(&mut self, row: &[f64]) -> FeatureResult<()> {
        if row.len() != self.n_cols {
            return Err(FeatureError::WidthMismatch { expected: self.n_cols, found: row.len() });
        }
        self.data.extend_from_slice(row);
        Ok(())
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        if self.n_cols == 0 { 0 } else { self.data.len() / self.n_cols }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n_cols..(i + 1) * self.n_cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.data.chunks_exact(self.n_cols.max(1))
    }

    /// Values of column `j`, top to bottom.
    pub fn column(&self, j: usize) -> impl Iterator<Item = f64> + '_ {
        self.rows().map(move |r| r[j])
    }
}
