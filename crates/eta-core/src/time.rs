//! Request time model.
//!
//! # Design
//!
//! Request times are **local wall-clock** times.  A timestamp carrying a UTC
//! offset (`2024-01-16T08:30:00+04:00`) is interpreted at its own offset,
//! since traffic follows the hour the rider sees.  The offset is dropped
//! after parsing and [`RequestTime`] wraps a `NaiveDateTime`.
//!
//! [`TimeContext`] derives every calendar flag the duration rules and the
//! feature transform need from one `RequestTime` and the traffic config.
//! Both sides compute flags through it so training and inference can never
//! disagree on what "rush hour" means.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::config::TrafficConfig;
use crate::{ValidationError, ValidationResult};

/// Friday prayer congestion, hours `[12, 14)`.
pub const FRIDAY_PRAYER_HOURS: HourWindow = HourWindow(12, 14);

/// Late-night free flow, hours `[0, 6)`.
pub const LATE_NIGHT_HOURS: HourWindow = HourWindow(0, 6);

/// Weekend leisure peak, hours `[10, 15)`.
pub const WEEKEND_LEISURE_HOURS: HourWindow = HourWindow(10, 15);

/// Evening window in which special events draw crowds, hours `[18, 24)`.
pub const EVENING_HOURS: HourWindow = HourWindow(18, 24);

// ── HourWindow ────────────────────────────────────────────────────────────────

/// Half-open range of hours of day, `[start, end)`.  Serialised as
/// `[start, end]`.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct HourWindow(pub u32, pub u32);

impl HourWindow {
    #[inline]
    pub fn contains(self, hour: u32) -> bool {
        self.0 <= hour && hour < self.1
    }

    /// `true` if the window lies within a single day and is non-empty.
    pub fn is_valid(self) -> bool {
        self.0 < self.1 && self.1 <= 24
    }
}

// ── RequestTime ───────────────────────────────────────────────────────────────

/// A validated local request timestamp.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestTime(NaiveDateTime);

impl RequestTime {
    const NAIVE_FORMATS: [&'static str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];

    /// Parse an ISO-8601 timestamp, with or without a UTC offset.
    pub fn parse(raw: &str) -> ValidationResult<Self> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(ValidationError::MissingTimestamp);
        }
        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
            return Ok(RequestTime(dt.naive_local()));
        }
        Self::NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(RequestTime)
            .ok_or_else(|| ValidationError::InvalidTimestamp(raw.to_owned()))
    }

    #[inline]
    pub fn from_naive(dt: NaiveDateTime) -> Self {
        RequestTime(dt)
    }

    #[inline]
    pub fn naive(self) -> NaiveDateTime {
        self.0
    }

    #[inline]
    pub fn date(self) -> NaiveDate {
        self.0.date()
    }

    #[inline]
    pub fn hour(self) -> u32 {
        self.0.hour()
    }

    #[inline]
    pub fn weekday(self) -> Weekday {
        self.0.weekday()
    }

    /// Monday = 0 … Sunday = 6.
    #[inline]
    pub fn day_of_week(self) -> u32 {
        self.0.weekday().num_days_from_monday()
    }
}

impl fmt::Display for RequestTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S"))
    }
}

// ── TimeContext ───────────────────────────────────────────────────────────────

/// Calendar flags for one request time under one traffic configuration.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TimeContext {
    pub hour:             u32,
    /// Monday = 0 … Sunday = 6.
    pub day_of_week:      u32,
    pub is_weekend:       bool,
    /// Rush windows only apply on working days.
    pub is_rush_hour:     bool,
    pub is_friday_prayer: bool,
    pub is_late_night:    bool,
    /// Weekend day inside [`WEEKEND_LEISURE_HOURS`].
    pub is_leisure:       bool,
    pub is_evening:       bool,
}

impl TimeContext {
    pub fn new(time: RequestTime, traffic: &TrafficConfig) -> Self {
        let hour = time.hour();
        let weekday = time.weekday();
        let is_weekend = traffic.weekend_days.contains(&weekday);
        let in_rush_window = traffic.rush_hour_windows.iter().any(|w| w.contains(hour));

        Self {
            hour,
            day_of_week:      time.day_of_week(),
            is_weekend,
            is_rush_hour:     in_rush_window && !is_weekend,
            is_friday_prayer: weekday == Weekday::Fri && FRIDAY_PRAYER_HOURS.contains(hour),
            is_late_night:    LATE_NIGHT_HOURS.contains(hour),
            is_leisure:       is_weekend && WEEKEND_LEISURE_HOURS.contains(hour),
            is_evening:       EVENING_HOURS.contains(hour),
        }
    }
}
