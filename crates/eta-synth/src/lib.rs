//! `eta-synth` — labelled synthetic trips for the trip-duration estimator.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`record`]    | `Weather`, `TripRequest`, `TripRecord`, `DurationFactors`  |
//! | [`rules`]     | `DurationRules`: centre value of every duration component  |
//! | [`events`]    | `EventCalendar`: per-day special-event venues              |
//! | [`generator`] | `SyntheticTripGenerator`, `check_corpus`                   |
//! | [`split`]     | `CorpusSplit`: chronological train/validation/test         |
//! | [`csv`]       | corpus export / import                                     |
//! | [`error`]     | `SynthError`, `SynthResult`                                |
//!
//! # Feature flags
//!
//! - `parallel`: generate trips on Rayon's thread pool.  Output is identical
//!   to the sequential path.

pub mod csv;
pub mod error;
pub mod events;
pub mod generator;
pub mod record;
pub mod rules;
pub mod split;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use crate::csv::{read_trips, read_trips_csv, write_trips, write_trips_csv};
pub use error::{SynthError, SynthResult};
pub use events::EventCalendar;
pub use generator::{SyntheticTripGenerator, check_corpus};
pub use record::{DurationFactors, TripRecord, TripRequest, Weather};
pub use rules::{DurationRules, MIN_TRIP_MINUTES};
pub use split::CorpusSplit;
