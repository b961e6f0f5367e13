//! `eta-features` — historical statistics and the feature transform.
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`stats`]    | `ZonePairStatsStore`: pair / hour / weekday / type means  |
//! | [`schema`]   | the 61 feature names, in column order                     |
//! | [`engineer`] | `FeatureEngineer::transform`, `transform_training`, batches |
//! | [`matrix`]   | `FeatureVector`, `FeatureMatrix`                          |
//! | [`error`]    | `FeatureError`, `FeatureResult`                           |

pub mod engineer;
pub mod error;
pub mod matrix;
pub mod schema;
pub mod stats;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use engineer::{FeatureEngineer, targets};
pub use error::{FeatureError, FeatureResult};
pub use matrix::{FeatureMatrix, FeatureVector};
pub use schema::{FEATURE_COUNT, FEATURE_NAMES, feature_index, matches_schema, schema};
pub use stats::{ZonePairStats, ZonePairStatsStore, type_pair_index};
