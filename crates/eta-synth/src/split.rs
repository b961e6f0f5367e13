//! Chronological train / validation / test split.

use crate::TripRecord;

#[derive(Clone, Debug, Default)]
pub struct CorpusSplit {
    pub train:      Vec<TripRecord>,
    pub validation: Vec<TripRecord>,
    pub test:       Vec<TripRecord>,
}

impl CorpusSplit {
    /// Sort `trips` by request time and cut at `train_ratio` and
    /// `train_ratio + val_ratio`.  The test split takes the remainder, so the
    /// three subsets are disjoint and together hold every trip.
    pub fn chronological(mut trips: Vec<TripRecord>, train_ratio: f64, val_ratio: f64) -> Self {
        trips.sort_by_key(|t| (t.request_time, t.id));
        let n = trips.len();
        let n_train = ((n as f64 * train_ratio.clamp(0.0, 1.0)).floor() as usize).min(n);
        let n_val = ((n as f64 * val_ratio.clamp(0.0, 1.0)).floor() as usize).min(n - n_train);

        let test = trips.split_off(n_train + n_val);
        let validation = trips.split_off(n_train);
        tracing::debug!(train = trips.len(), validation = validation.len(), test = test.len(), "corpus split");
        Self { train: trips, validation, test }
    }

    pub fn len(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
