//! Trip requests, labelled trip records, and the factors behind a duration.

use std::fmt;

use serde::{Deserialize, Serialize};

use eta_core::{RequestTime, TripId, ZoneId};

// ── Weather ───────────────────────────────────────────────────────────────────

/// Weather at request time.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    #[default]
    Clear,
    Sandstorm,
    Rain,
}

impl Weather {
    /// All variants in one-hot column order.
    pub const ALL: [Weather; 3] = [Weather::Clear, Weather::Sandstorm, Weather::Rain];

    pub fn as_str(self) -> &'static str {
        match self {
            Weather::Clear     => "clear",
            Weather::Sandstorm => "sandstorm",
            Weather::Rain      => "rain",
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── TripRequest ───────────────────────────────────────────────────────────────

/// The inputs known when a trip is requested.  Zone ids are not yet checked
/// against any grid; every consumer validates them on use.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct TripRequest {
    pub pickup:       ZoneId,
    pub dropoff:      ZoneId,
    pub request_time: RequestTime,
    pub weather:      Weather,
}

// ── DurationFactors ───────────────────────────────────────────────────────────

/// Additive minute components of a trip, before driver noise.
///
/// On a generated [`TripRecord`] these are the sampled values; from
/// [`DurationRules::expected`](crate::DurationRules::expected) they are the
/// rule centre values.
#[derive(Copy, Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct DurationFactors {
    pub base:    f64,
    pub traffic: f64,
    pub weather: f64,
    pub zone:    f64,
    pub event:   f64,
}

impl DurationFactors {
    #[inline]
    pub fn total(&self) -> f64 {
        self.base + self.traffic + self.weather + self.zone + self.event
    }
}

// ── TripRecord ────────────────────────────────────────────────────────────────

/// One labelled synthetic trip.  Created only by the generator (or read back
/// from its CSV export) and never modified.
#[derive(Clone, PartialEq, Debug)]
pub struct TripRecord {
    pub id:                TripId,
    pub pickup:            ZoneId,
    pub dropoff:           ZoneId,
    pub request_time:      RequestTime,
    pub weather:           Weather,
    pub special_event:     bool,
    /// Multiplicative driver noise, clamped to `[0.7, 1.3]`.
    pub driver_efficiency: f64,
    pub distance:          u32,
    pub factors:           DurationFactors,
    /// Realised duration: `max(1, factors.total() × driver_efficiency)`.
    pub duration_minutes:  f64,
}

impl TripRecord {
    /// The request this trip answered.
    pub fn request(&self) -> TripRequest {
        TripRequest {
            pickup:       self.pickup,
            dropoff:      self.dropoff,
            request_time: self.request_time,
            weather:      self.weather,
        }
    }
}
