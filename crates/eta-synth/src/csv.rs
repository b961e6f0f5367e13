//! Trip corpus CSV export and import.
//!
//! # CSV format
//!
//! One row per trip, in corpus order:
//!
//! ```csv
//! trip_id,pickup_zone,dropoff_zone,request_time,weather,special_event,driver_efficiency,distance,base_minutes,traffic_minutes,weather_minutes,zone_minutes,event_minutes,duration_minutes
//! 17,44,55,2024-01-16T08:30:00,clear,0,1.02,2,6,8.7,0,6,0,21.11
//! ```
//!
//! Floats are written in Rust's shortest round-trip form, so a corpus read
//! back is value-identical to the one written.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::Deserialize;

use eta_core::{RequestTime, TripId, ZoneId};

use crate::{DurationFactors, SynthError, SynthResult, TripRecord, Weather};

const HEADER: [&str; 14] = [
    "trip_id",
    "pickup_zone",
    "dropoff_zone",
    "request_time",
    "weather",
    "special_event",
    "driver_efficiency",
    "distance",
    "base_minutes",
    "traffic_minutes",
    "weather_minutes",
    "zone_minutes",
    "event_minutes",
    "duration_minutes",
];

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TripRow {
    trip_id:           u32,
    pickup_zone:       u16,
    dropoff_zone:      u16,
    request_time:      String,
    weather:           Weather,
    special_event:     u8,
    driver_efficiency: f64,
    distance:          u32,
    base_minutes:      f64,
    traffic_minutes:   f64,
    weather_minutes:   f64,
    zone_minutes:      f64,
    event_minutes:     f64,
    duration_minutes:  f64,
}

impl TryFrom<TripRow> for TripRecord {
    type Error = SynthError;

    fn try_from(r: TripRow) -> SynthResult<Self> {
        Ok(TripRecord {
            id:                TripId(r.trip_id),
            pickup:            ZoneId(r.pickup_zone),
            dropoff:           ZoneId(r.dropoff_zone),
            request_time:      RequestTime::parse(&r.request_time)?,
            weather:           r.weather,
            special_event:     match r.special_event {
                0 => false,
                1 => true,
                n => return Err(SynthError::Parse(format!("trip {}: special_event {n} is not 0 or 1", r.trip_id))),
            },
            driver_efficiency: r.driver_efficiency,
            distance:          r.distance,
            factors:           DurationFactors {
                base:    r.base_minutes,
                traffic: r.traffic_minutes,
                weather: r.weather_minutes,
                zone:    r.zone_minutes,
                event:   r.event_minutes,
            },
            duration_minutes:  r.duration_minutes,
        })
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

pub fn write_trips_csv(path: &Path, trips: &[TripRecord]) -> SynthResult<()> {
    let file = File::create(path)?;
    write_trips(file, trips)?;
    tracing::info!(path = %path.display(), trips = trips.len(), "trip corpus written");
    Ok(())
}

/// Like [`write_trips_csv`] but accepts any `Write` sink.
pub fn write_trips<W: Write>(sink: W, trips: &[TripRecord]) -> SynthResult<()> {
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record(HEADER)?;
    for t in trips {
        let f = &t.factors;
        writer.write_record(&[
            t.id.0.to_string(),
            t.pickup.0.to_string(),
            t.dropoff.0.to_string(),
            t.request_time.to_string(),
            t.weather.to_string(),
            (t.special_event as u8).to_string(),
            t.driver_efficiency.to_string(),
            t.distance.to_string(),
            f.base.to_string(),
            f.traffic.to_string(),
            f.weather.to_string(),
            f.zone.to_string(),
            f.event.to_string(),
            t.duration_minutes.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_trips_csv(path: &Path) -> SynthResult<Vec<TripRecord>> {
    read_trips(File::open(path)?)
}

/// Like [`read_trips_csv`] but accepts any `Read` source.
pub fn read_trips<R: Read>(source: R) -> SynthResult<Vec<TripRecord>> {
    let mut reader = csv::Reader::from_reader(source);
    reader
        .deserialize::<TripRow>()
        .map(|row| TripRecord::try_from(row?))
        .collect()
}
