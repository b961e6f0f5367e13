//! Synthetic trip generator.
//!
//! # Per-trip pipeline
//!
//! ```text
//! TripRng::new(seed, id)
//!   → request time   uniform over simulated_days
//!   → pickup/dropoff hour-weighted zone popularity, resampled until distinct
//!   → traffic        rule centre ± 10 %
//!   → weather        sandstorm (p) else rain (p) else clear; penalty ± 10 %
//!   → zone           rule value, not jittered
//!   → event          calendar lookup; rule centre ± 20 %
//!   → efficiency     N(1, σ) clamped to [0.7, 1.3]
//! duration = max(1, Σ factors × efficiency)
//! ```
//!
//! Every trip owns its RNG stream, so the corpus does not depend on the
//! order (or thread) in which trips are produced.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

use eta_core::{
    CityGrid, EtaConfig, RequestTime, SimRng, TimeContext, TripId, TripRng, ValidationError,
    ZoneId, ZoneType,
};

use crate::rules::MIN_TRIP_MINUTES;
use crate::{DurationFactors, DurationRules, EventCalendar, SynthError, SynthResult, TripRecord, Weather};

/// Spread of the uniform jitter on traffic and weather adjustments.
const ADJUSTMENT_JITTER: f64 = 0.10;

/// Spread of the uniform jitter on event congestion.
const EVENT_JITTER: f64 = 0.20;

/// Driver efficiency is clamped to this range.
const EFFICIENCY_BOUNDS: (f64, f64) = (0.7, 1.3);

/// `SimRng::child` offset of the event-calendar stream.
const EVENT_STREAM: u64 = 1;

const SECONDS_PER_DAY: i64 = 86_400;

// ── Zone popularity ───────────────────────────────────────────────────────────

fn popularity(zone_type: ZoneType, hour: u32) -> f64 {
    match zone_type {
        ZoneType::Business if (7..=18).contains(&hour)  => 3.0,
        ZoneType::Coastal  if (18..=23).contains(&hour) => 2.5,
        ZoneType::Airport                               => 2.0,
        _                                               => 1.0,
    }
}

// ── SyntheticTripGenerator ────────────────────────────────────────────────────

pub struct SyntheticTripGenerator {
    config:   EtaConfig,
    rules:    DurationRules,
    calendar: EventCalendar,
    /// Zone sampling weights, `[hour][zone]`.
    weights:  Vec<Vec<f64>>,
}

impl SyntheticTripGenerator {
    /// Validate `config` and draw the event calendar.
    pub fn new(config: &EtaConfig) -> SynthResult<Self> {
        config.validate()?;
        let grid = config.city_grid();
        let g = &config.generator;

        let mut root = SimRng::new(g.seed);
        let calendar = EventCalendar::generate(
            grid,
            g.start_date,
            g.simulated_days,
            g.special_event_probability,
            &mut root.child(EVENT_STREAM),
        );

        let weights = (0..24)
            .map(|hour| grid.zones().map(|z| popularity(z.zone_type, hour)).collect())
            .collect();

        tracing::debug!(
            seed = g.seed,
            zones = grid.zone_count(),
            event_days = calendar.event_days(),
            "trip generator ready"
        );

        Ok(Self {
            config: config.clone(),
            rules: DurationRules::from_config(config),
            calendar,
            weights,
        })
    }

    #[inline]
    pub fn grid(&self) -> CityGrid {
        self.rules.grid()
    }

    #[inline]
    pub fn rules(&self) -> &DurationRules {
        &self.rules
    }

    #[inline]
    pub fn calendar(&self) -> &EventCalendar {
        &self.calendar
    }

    // ── Corpus ────────────────────────────────────────────────────────────

    /// Generate the configured number of trips.
    pub fn generate_corpus(&self) -> SynthResult<Vec<TripRecord>> {
        self.generate(self.config.generator.n_trips)
    }

    /// Generate `n_trips` trips sorted by request time (ties by id).
    pub fn generate(&self, n_trips: usize) -> SynthResult<Vec<TripRecord>> {
        let n = u32::try_from(n_trips)
            .map_err(|_| SynthError::Degenerate(format!("{n_trips} trips exceed the trip id range")))?;

        tracing::info!(n_trips, seed = self.config.generator.seed, "generating synthetic corpus");

        #[cfg(feature = "parallel")]
        let mut trips: Vec<TripRecord> = {
            use rayon::prelude::*;
            (0..n)
                .into_par_iter()
                .map(|i| self.generate_trip(TripId(i)))
                .collect::<SynthResult<_>>()?
        };

        #[cfg(not(feature = "parallel"))]
        let mut trips: Vec<TripRecord> = (0..n)
            .map(|i| self.generate_trip(TripId(i)))
            .collect::<SynthResult<_>>()?;

        trips.sort_by_key(|t| (t.request_time, t.id));
        Ok(trips)
    }

    /// Generate trip `id`: sample its request, then its duration.
    pub fn generate_trip(&self, id: TripId) -> SynthResult<TripRecord> {
        let mut rng = TripRng::new(self.config.generator.seed, id);
        let time = self.sample_time(&mut rng);

        let hour = time.hour() as usize;
        let pickup = self.sample_zone(&mut rng, hour)?;
        let mut dropoff = self.sample_zone(&mut rng, hour)?;
        while dropoff == pickup {
            dropoff = self.sample_zone(&mut rng, hour)?;
        }

        self.simulate_with(&mut rng, id, pickup, dropoff, time)
    }

    /// Realise a duration for a given request.  Deterministic in
    /// `(seed, id, pickup, dropoff, time)`.
    pub fn simulate(
        &self,
        id: TripId,
        pickup: ZoneId,
        dropoff: ZoneId,
        time: RequestTime,
    ) -> SynthResult<TripRecord> {
        let mut rng = TripRng::new(self.config.generator.seed, id);
        self.simulate_with(&mut rng, id, pickup, dropoff, time)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn sample_time(&self, rng: &mut TripRng) -> RequestTime {
        let g = &self.config.generator;
        let span = g.simulated_days as i64 * SECONDS_PER_DAY;
        let start = NaiveDateTime::new(g.start_date, NaiveTime::MIN);
        RequestTime::from_naive(start + TimeDelta::seconds(rng.gen_range(0..span)))
    }

    fn sample_zone(&self, rng: &mut TripRng, hour: usize) -> SynthResult<ZoneId> {
        let index = rng
            .weighted_index(&self.weights[hour])
            .ok_or_else(|| SynthError::Degenerate("zone weights are all zero".into()))?;
        ZoneId::try_from(index).map_err(|_| SynthError::Degenerate(format!("zone index {index} overflows")))
    }

    fn sample_weather(&self, rng: &mut TripRng) -> Weather {
        let w = self.rules.weather();
        if rng.gen_bool(w.sandstorm_probability) {
            Weather::Sandstorm
        } else if rng.gen_bool(w.rain_probability) {
            Weather::Rain
        } else {
            Weather::Clear
        }
    }

    fn simulate_with(
        &self,
        rng: &mut TripRng,
        id: TripId,
        pickup: ZoneId,
        dropoff: ZoneId,
        time: RequestTime,
    ) -> SynthResult<TripRecord> {
        let grid = self.grid();
        if pickup == dropoff {
            return Err(ValidationError::SameZone(pickup.0 as i64).into());
        }
        let pickup_type = grid.zone_type(pickup)?;
        let dropoff_type = grid.zone_type(dropoff)?;
        let distance = grid.distance(pickup, dropoff)?;
        let ctx = TimeContext::new(time, self.rules.traffic());

        let base = self.rules.base_minutes(distance);
        let traffic = rng.jitter(
            self.rules.traffic_minutes(base, &ctx, pickup_type, dropoff_type),
            ADJUSTMENT_JITTER,
        );
        let weather = self.sample_weather(rng);
        let weather_minutes = rng.jitter(self.rules.weather_minutes(base, weather), ADJUSTMENT_JITTER);
        let zone = self.rules.zone_minutes(base, pickup_type, dropoff_type);

        let special_event = self.calendar.affects(&grid, time.date(), ctx.hour, pickup, dropoff);
        let event = if special_event {
            rng.jitter(self.rules.event_minutes(base), EVENT_JITTER)
        } else {
            0.0
        };

        let (lo, hi) = EFFICIENCY_BOUNDS;
        let driver_efficiency = rng
            .normal(1.0, self.config.generator.driver_efficiency_std)
            .clamp(lo, hi);

        let factors = DurationFactors { base, traffic, weather: weather_minutes, zone, event };
        Ok(TripRecord {
            id,
            pickup,
            dropoff,
            request_time: time,
            weather,
            special_event,
            driver_efficiency,
            distance,
            factors,
            duration_minutes: (factors.total() * driver_efficiency).max(MIN_TRIP_MINUTES),
        })
    }
}

// ── Corpus checks ─────────────────────────────────────────────────────────────

/// Reject a corpus no model could learn from: empty, non-finite or
/// sub-minute durations, or durations without any variance.
pub fn check_corpus(trips: &[TripRecord]) -> SynthResult<()> {
    let Some(first) = trips.first() else {
        return Err(SynthError::Degenerate("corpus is empty".into()));
    };
    if let Some(bad) = trips
        .iter()
        .find(|t| !t.duration_minutes.is_finite() || t.duration_minutes < MIN_TRIP_MINUTES)
    {
        return Err(SynthError::Degenerate(format!(
            "trip {} has duration {}",
            bad.id.0, bad.duration_minutes
        )));
    }
    if trips.iter().all(|t| t.duration_minutes == first.duration_minutes) {
        return Err(SynthError::Degenerate("every trip has the same duration".into()));
    }
    Ok(())
}
