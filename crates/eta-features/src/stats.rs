//! Historical duration statistics fitted on the training split.
//!
//! The store is built once by [`ZonePairStatsStore::fit`] and never mutated
//! afterwards; it is serialised into the model artifact so inference sees
//! exactly the snapshot the models were trained against.
//!
//! Every lookup has a fallback.  An unseen zone pair reports the corpus-wide
//! mean and standard deviation with `count = 0`; an unseen hour, weekday, or
//! zone-type pairing reports the corpus-wide mean.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use eta_core::{CityGrid, ZoneId, ZoneType};
use eta_synth::TripRecord;

use crate::{FeatureError, FeatureResult};

const HOURS: usize = 24;
const WEEKDAYS: usize = 7;
const TYPE_PAIRS: usize = ZoneType::ALL.len() * ZoneType::ALL.len();

// ── ZonePairStats ─────────────────────────────────────────────────────────────

/// Duration summary for one ordered `(pickup, dropoff)` pair.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ZonePairStats {
    /// Training trips observed for the pair; `0` marks the global fallback.
    pub count: u32,
    pub mean:  f64,
    /// Sample standard deviation (n − 1); `0` when fewer than two trips.
    pub std:   f64,
}

impl ZonePairStats {
    fn from_durations(durations: &[f64]) -> Self {
        let count = durations.len() as u32;
        let mean = durations.mean();
        let std = if count < 2 { 0.0 } else { durations.std_dev() };
        Self { count, mean, std }
    }

    /// The summary with one observed `duration` taken back out.  Call only
    /// with `count >= 2`.
    fn without(&self, duration: f64) -> Self {
        let n = self.count as f64;
        let count = self.count - 1;
        let mean = (n * self.mean - duration) / (n - 1.0);
        let std = if count < 2 {
            0.0
        } else {
            // Reverse Welford step on the sum of squared deviations.
            let ss = (n - 1.0) * self.std * self.std - (duration - self.mean) * (duration - mean);
            (ss.max(0.0) / (n - 2.0)).sqrt()
        };
        Self { count, mean, std }
    }

    #[inline]
    pub fn is_fallback(&self) -> bool {
        self.count == 0
    }
}

/// Position of a pickup/dropoff type pairing in `0..16`.
#[inline]
pub fn type_pair_index(pickup: ZoneType, dropoff: ZoneType) -> usize {
    pickup.ordinal() * ZoneType::ALL.len() + dropoff.ordinal()
}

// ── ZonePairStatsStore ────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ZonePairStatsStore {
    pairs:      FxHashMap<(ZoneId, ZoneId), ZonePairStats>,
    global:     ZonePairStats,
    hour_means: Vec<Option<f64>>,
    dow_means:  Vec<Option<f64>>,
    type_means: Vec<Option<f64>>,
}

impl ZonePairStatsStore {
    /// Fit on `trips`, normally the training split.
    pub fn fit(grid: CityGrid, trips: &[TripRecord]) -> FeatureResult<Self> {
        if trips.is_empty() {
            return Err(FeatureError::EmptyCorpus);
        }

        let mut by_pair: FxHashMap<(ZoneId, ZoneId), Vec<f64>> = FxHashMap::default();
        let mut by_hour = vec![Vec::new(); HOURS];
        let mut by_dow = vec![Vec::new(); WEEKDAYS];
        let mut by_type = vec![Vec::new(); TYPE_PAIRS];

        for t in trips {
            let d = t.duration_minutes;
            by_pair.entry((t.pickup, t.dropoff)).or_default().push(d);
            by_hour[t.request_time.hour() as usize].push(d);
            by_dow[t.request_time.day_of_week() as usize].push(d);
            let pair = type_pair_index(grid.zone_type(t.pickup)?, grid.zone_type(t.dropoff)?);
            by_type[pair].push(d);
        }

        let all: Vec<f64> = trips.iter().map(|t| t.duration_minutes).collect();
        let global = ZonePairStats::from_durations(&all);
        let pairs: FxHashMap<_, _> = by_pair
            .into_iter()
            .map(|(k, v)| (k, ZonePairStats::from_durations(&v)))
            .collect();

        tracing::info!(
            trips = trips.len(),
            pairs = pairs.len(),
            global_mean = global.mean,
            "zone pair statistics fitted"
        );

        Ok(Self {
            pairs,
            global,
            hour_means: group_means(by_hour),
            dow_means:  group_means(by_dow),
            type_means: group_means(by_type),
        })
    }

    /// Exact statistics for the ordered pair, or the global fallback with
    /// `count = 0`.
    pub fn pair(&self, pickup: ZoneId, dropoff: ZoneId) -> ZonePairStats {
        self.pairs.get(&(pickup, dropoff)).copied().unwrap_or_else(|| self.fallback())
    }

    /// Statistics for the pair as if one of its training trips, lasting
    /// `duration`, had not been seen.  Encoding a training trip through this
    /// keeps its own duration out of its features; a pair seen only once
    /// reports the global fallback.
    pub fn pair_excluding(&self, pickup: ZoneId, dropoff: ZoneId, duration: f64) -> ZonePairStats {
        match self.pairs.get(&(pickup, dropoff)) {
            Some(stats) if stats.count >= 2 => stats.without(duration),
            _ => self.fallback(),
        }
    }

    fn fallback(&self) -> ZonePairStats {
        ZonePairStats { count: 0, ..self.global }
    }

    /// Corpus-wide statistics; `count` is the number of training trips.
    #[inline]
    pub fn global(&self) -> ZonePairStats {
        self.global
    }

    /// Number of distinct pairs seen in training.
    #[inline]
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    pub fn hour_mean(&self, hour: u32) -> f64 {
        self.lookup(&self.hour_means, hour as usize)
    }

    /// Mean for a weekday, Monday = 0.
    pub fn dow_mean(&self, day_of_week: u32) -> f64 {
        self.lookup(&self.dow_means, day_of_week as usize)
    }

    pub fn type_pair_mean(&self, pickup: ZoneType, dropoff: ZoneType) -> f64 {
        self.lookup(&self.type_means, type_pair_index(pickup, dropoff))
    }

    fn lookup(&self, means: &[Option<f64>], i: usize) -> f64 {
        means.get(i).copied().flatten().unwrap_or(self.global.mean)
    }
}

fn group_means(groups: Vec<Vec<f64>>) -> Vec<Option<f64>> {
    groups
        .into_iter()
        .map(|g| if g.is_empty() { None } else { Some(g.mean()) })
        .collect()
}
