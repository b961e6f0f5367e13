//! Duration rules: the deterministic centre of every trip-time component.
//!
//! The generator samples around these values (`±10 %` on traffic and weather,
//! `±20 %` on events) and the engine reports them as the explanation of a
//! prediction.  Keeping both sides on one implementation means a change to a
//! rule moves the corpus and the explanations together.

use eta_core::{
    CityGrid, EtaConfig, GridConfig, TimeContext, TrafficConfig, ValidationResult, WeatherConfig,
    ZoneType,
};

use crate::{DurationFactors, TripRequest, Weather};

/// Share of base time recovered on the airport highway.
pub const AIRPORT_HIGHWAY_SHARE: f64 = 0.25;

/// Event congestion minutes per base minute.
pub const EVENT_SLOWDOWN: f64 = 0.5;

/// Flat event congestion, minutes.
pub const EVENT_FIXED_MINUTES: f64 = 5.0;

/// Shortest trip the generator or the engine will ever report.
pub const MIN_TRIP_MINUTES: f64 = 1.0;

/// Extra rush-hour minutes for a trip starting or ending in a zone of this type.
fn rush_congestion(t: ZoneType) -> f64 {
    match t {
        ZoneType::Business    => 3.0,
        ZoneType::Coastal     => 1.0,
        ZoneType::Airport     => 1.0,
        ZoneType::Residential => 0.5,
    }
}

/// Fixed access/parking minutes for a trip endpoint of this type.
fn endpoint_minutes(t: ZoneType) -> f64 {
    match t {
        ZoneType::Business    => 3.0,
        ZoneType::Coastal     => 1.5,
        ZoneType::Airport     => 2.0,
        ZoneType::Residential => 0.0,
    }
}

// ── DurationRules ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct DurationRules {
    grid:    CityGrid,
    spacing: GridConfig,
    traffic: TrafficConfig,
    weather: WeatherConfig,
}

impl DurationRules {
    /// Rules for a validated configuration.
    pub fn from_config(config: &EtaConfig) -> Self {
        Self {
            grid:    config.city_grid(),
            spacing: config.grid.clone(),
            traffic: config.traffic.clone(),
            weather: config.weather.clone(),
        }
    }

    #[inline]
    pub fn grid(&self) -> CityGrid {
        self.grid
    }

    #[inline]
    pub fn traffic(&self) -> &TrafficConfig {
        &self.traffic
    }

    #[inline]
    pub fn weather(&self) -> &WeatherConfig {
        &self.weather
    }

    /// Free-flow minutes for `distance` grid steps.
    #[inline]
    pub fn base_minutes(&self, distance: u32) -> f64 {
        distance as f64 * self.spacing.minutes_per_zone
    }

    /// Time-of-day and day-of-week adjustment.  Negative on weekends outside
    /// leisure hours and late at night.
    pub fn traffic_minutes(
        &self,
        base: f64,
        ctx: &TimeContext,
        pickup: ZoneType,
        dropoff: ZoneType,
    ) -> f64 {
        let t = &self.traffic;
        let mut minutes = 0.0;
        if ctx.is_rush_hour {
            minutes += t.rush_slowdown * base + rush_congestion(pickup) + rush_congestion(dropoff);
        }
        if ctx.is_friday_prayer {
            minutes += t.friday_prayer_slowdown * base;
        }
        if ctx.is_weekend {
            minutes += if ctx.is_leisure {
                t.weekend_leisure_slowdown * base
            } else {
                -t.weekend_relief * base
            };
        }
        if ctx.is_late_night {
            minutes -= t.late_night_speedup * base;
        }
        minutes
    }

    pub fn weather_minutes(&self, base: f64, weather: Weather) -> f64 {
        match weather {
            Weather::Clear     => 0.0,
            Weather::Sandstorm => self.weather.sandstorm_penalty * base,
            Weather::Rain      => self.weather.rain_penalty * base,
        }
    }

    /// Endpoint access time, less the highway share for airport runs.
    pub fn zone_minutes(&self, base: f64, pickup: ZoneType, dropoff: ZoneType) -> f64 {
        let mut minutes = endpoint_minutes(pickup) + endpoint_minutes(dropoff);
        if pickup == ZoneType::Airport || dropoff == ZoneType::Airport {
            minutes -= AIRPORT_HIGHWAY_SHARE * base;
        }
        minutes
    }

    #[inline]
    pub fn event_minutes(&self, base: f64) -> f64 {
        EVENT_SLOWDOWN * base + EVENT_FIXED_MINUTES
    }

    /// Centre values of every component for `request`, assuming no special
    /// event.
    pub fn expected(&self, request: &TripRequest) -> ValidationResult<DurationFactors> {
        let pickup = self.grid.zone_type(request.pickup)?;
        let dropoff = self.grid.zone_type(request.dropoff)?;
        let distance = self.grid.distance(request.pickup, request.dropoff)?;
        let ctx = TimeContext::new(request.request_time, &self.traffic);

        let base = self.base_minutes(distance);
        Ok(DurationFactors {
            base,
            traffic: self.traffic_minutes(base, &ctx, pickup, dropoff),
            weather: self.weather_minutes(base, request.weather),
            zone:    self.zone_minutes(base, pickup, dropoff),
            event:   0.0,
        })
    }
}
