//! `eta-core` — foundational types for the trip-duration estimation workspace.
//!
//! This crate is a dependency of every other `eta-*` crate and has no
//! `eta-*` dependencies of its own.
//!
//! # What lives here
//!
//! | Module     | Contents                                                    |
//! |------------|-------------------------------------------------------------|
//! | [`ids`]    | `ZoneId`, `TripId`                                          |
//! | [`grid`]   | `CityGrid`, `Zone`, `ZoneType`, Manhattan distance          |
//! | [`time`]   | `RequestTime` (ISO-8601 parsing), `HourWindow`, `TimeContext` |
//! | [`config`] | `EtaConfig` and its sections, JSON loading + validation     |
//! | [`rng`]    | `TripRng` (per-trip), `SimRng` (corpus-level)               |
//! | [`error`]  | `ValidationError`, `ConfigError`                            |

pub mod config;
pub mod error;
pub mod grid;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{
    EtaConfig, GeneratorConfig, GridConfig, InferenceConfig, ModelConfig, TrafficConfig,
    WeatherConfig,
};
pub use error::{ConfigError, ConfigResult, ValidationError, ValidationResult};
pub use grid::{CityGrid, Zone, ZoneType};
pub use ids::{TripId, ZoneId};
pub use rng::{SimRng, TripRng};
pub use time::{HourWindow, RequestTime, TimeContext};
