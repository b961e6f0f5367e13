//! Request → feature vector transform.
//!
//! [`FeatureEngineer::transform`] is a pure function of the request, the
//! grid, the traffic calendar, and the fitted statistics snapshot.  Training
//! and inference call the same code path, so the two can only disagree if the
//! statistics differ, and those travel with the model artifact.  Training
//! rows go through [`FeatureEngineer::transform_training`], which encodes the
//! zone-pair statistics with the row's own duration left out.

use std::f64::consts::TAU;

use eta_core::{CityGrid, EtaConfig, TimeContext, TrafficConfig, ZoneType};
use eta_synth::{TripRecord, TripRequest, Weather};

use crate::schema::FEATURE_COUNT;
use crate::{FeatureMatrix, FeatureResult, FeatureVector, ZonePairStats, ZonePairStatsStore};

#[inline]
fn flag(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

/// Time-of-day windows, inclusive on both ends.
fn is_morning(hour: u32) -> bool {
    (6..=10).contains(&hour)
}

fn is_afternoon(hour: u32) -> bool {
    (12..=16).contains(&hour)
}

fn is_evening(hour: u32) -> bool {
    (17..=21).contains(&hour)
}

fn is_night(hour: u32) -> bool {
    hour >= 22 || hour <= 5
}

// ── FeatureEngineer ───────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct FeatureEngineer {
    grid:    CityGrid,
    traffic: TrafficConfig,
    stats:   ZonePairStatsStore,
}

impl FeatureEngineer {
    pub fn new(config: &EtaConfig, stats: ZonePairStatsStore) -> Self {
        Self::from_parts(config.city_grid(), config.traffic.clone(), stats)
    }

    pub fn from_parts(grid: CityGrid, traffic: TrafficConfig, stats: ZonePairStatsStore) -> Self {
        Self { grid, traffic, stats }
    }

    #[inline]
    pub fn grid(&self) -> CityGrid {
        self.grid
    }

    #[inline]
    pub fn stats(&self) -> &ZonePairStatsStore {
        &self.stats
    }

    /// Transform one request.  Zone ids outside the grid are rejected.
    pub fn transform(&self, request: &TripRequest) -> FeatureResult<FeatureVector> {
        self.encode(request, self.stats.pair(request.pickup, request.dropoff))
    }

    /// Transform a trip the statistics were fitted on.  The zone-pair columns
    /// leave the trip's own duration out, so a training row looks like an
    /// unseen request drawn from the same pair.
    pub fn transform_training(&self, trip: &TripRecord) -> FeatureResult<FeatureVector> {
        let pair = self.stats.pair_excluding(trip.pickup, trip.dropoff, trip.duration_minutes);
        self.encode(&trip.request(), pair)
    }

    fn encode(&self, request: &TripRequest, pair: ZonePairStats) -> FeatureResult<FeatureVector> {
        let pickup = self.grid.zone(request.pickup)?;
        let dropoff = self.grid.zone(request.dropoff)?;
        let distance = self.grid.distance(request.pickup, request.dropoff)? as f64;
        let ctx = TimeContext::new(request.request_time, &self.traffic);
        let (pt, dt) = (pickup.zone_type, dropoff.zone_type);
        let airport = pt == ZoneType::Airport || dt == ZoneType::Airport;
        let hour = ctx.hour as f64;
        let dow = ctx.day_of_week as f64;

        let mut v = Vec::with_capacity(FEATURE_COUNT);

        v.extend([distance, distance * distance]);
        v.extend([
            (TAU * hour / 24.0).sin(),
            (TAU * hour / 24.0).cos(),
            (TAU * dow / 7.0).sin(),
            (TAU * dow / 7.0).cos(),
        ]);
        v.extend(
            [
                ctx.is_rush_hour,
                ctx.is_weekend,
                ctx.is_friday_prayer,
                ctx.is_late_night,
                is_morning(ctx.hour),
                is_afternoon(ctx.hour),
                is_evening(ctx.hour),
                is_night(ctx.hour),
            ]
            .map(flag),
        );
        v.extend(ZoneType::ALL.map(|t| flag(pt == t)));
        v.extend(ZoneType::ALL.map(|t| flag(dt == t)));
        for p in ZoneType::ALL {
            v.extend(ZoneType::ALL.map(|d| flag(pt == p && dt == d)));
        }
        v.extend([flag(pt == dt), flag(airport)]);
        v.extend([pickup.row, pickup.col, dropoff.row, dropoff.col].map(f64::from));
        v.extend([
            pair.mean,
            pair.std,
            pair.count as f64,
            flag(pair.is_fallback()),
            self.stats.hour_mean(ctx.hour),
            self.stats.dow_mean(ctx.day_of_week),
            self.stats.type_pair_mean(pt, dt),
        ]);
        v.extend(Weather::ALL.map(|w| flag(request.weather == w)));
        v.extend(
            [
                ctx.is_rush_hour,
                ctx.is_weekend,
                ctx.is_friday_prayer,
                ctx.is_late_night,
                airport,
                request.weather == Weather::Sandstorm,
                request.weather == Weather::Rain,
            ]
            .map(|b| distance * flag(b)),
        );

        FeatureVector::from_values(v)
    }

    /// Transform every trip's request into one matrix, rows in input order.
    pub fn transform_batch(&self, trips: &[TripRecord]) -> FeatureResult<FeatureMatrix> {
        self.batch(trips, |t| self.transform(&t.request()))
    }

    /// [`transform_training`](Self::transform_training) over the split the
    /// statistics were fitted on.
    pub fn transform_training_batch(&self, trips: &[TripRecord]) -> FeatureResult<FeatureMatrix> {
        self.batch(trips, |t| self.transform_training(t))
    }

    fn batch<F>(&self, trips: &[TripRecord], encode: F) -> FeatureResult<FeatureMatrix>
    where
        F: Fn(&TripRecord) -> FeatureResult<FeatureVector> + Send + Sync,
    {
        #[cfg(feature = "parallel")]
        let vectors: Vec<FeatureVector> = {
            use rayon::prelude::*;
            trips.par_iter().map(&encode).collect::<FeatureResult<_>>()?
        };

        #[cfg(not(feature = "parallel"))]
        let vectors: Vec<FeatureVector> = trips.iter().map(&encode).collect::<FeatureResult<_>>()?;

        let mut matrix = FeatureMatrix::with_capacity(FEATURE_COUNT, vectors.len());
        for v in &vectors {
            matrix.push_row(v.as_slice())?;
        }
        tracing::debug!(rows = matrix.n_rows(), cols = FEATURE_COUNT, "feature batch transformed");
        Ok(matrix)
    }
}

/// Realised durations, aligned with [`FeatureEngineer::transform_batch`] rows.
pub fn targets(trips: &[TripRecord]) -> Vec<f64> {
    trips.iter().map(|t| t.duration_minutes).collect()
}
