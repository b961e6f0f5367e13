//! The feature schema: column names in transform order.
//!
//! The list is fixed at compile time.  It is written into every model
//! artifact and compared on load, so a model is never fed columns in an order
//! it was not trained on.

pub const FEATURE_COUNT: usize = 61;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    // Distance
    "distance",
    "distance_sq",
    // Cyclical time
    "hour_sin",
    "hour_cos",
    "dow_sin",
    "dow_cos",
    // Calendar flags
    "is_rush_hour",
    "is_weekend",
    "is_friday_prayer",
    "is_late_night",
    "is_morning",
    "is_afternoon",
    "is_evening",
    "is_night",
    // Pickup type
    "pickup_business",
    "pickup_coastal",
    "pickup_airport",
    "pickup_residential",
    // Dropoff type
    "dropoff_business",
    "dropoff_coastal",
    "dropoff_airport",
    "dropoff_residential",
    // Type pairings, pickup-major
    "pair_business_business",
    "pair_business_coastal",
    "pair_business_airport",
    "pair_business_residential",
    "pair_coastal_business",
    "pair_coastal_coastal",
    "pair_coastal_airport",
    "pair_coastal_residential",
    "pair_airport_business",
    "pair_airport_coastal",
    "pair_airport_airport",
    "pair_airport_residential",
    "pair_residential_business",
    "pair_residential_coastal",
    "pair_residential_airport",
    "pair_residential_residential",
    "same_zone_type",
    "involves_airport",
    // Coordinates
    "pickup_row",
    "pickup_col",
    "dropoff_row",
    "dropoff_col",
    // Historical statistics
    "zone_pair_mean",
    "zone_pair_std",
    "zone_pair_count",
    "zone_pair_is_fallback",
    "hour_mean",
    "dow_mean",
    "type_pair_mean",
    // Weather
    "weather_clear",
    "weather_sandstorm",
    "weather_rain",
    // Interactions
    "distance_x_rush",
    "distance_x_weekend",
    "distance_x_friday_prayer",
    "distance_x_late_night",
    "distance_x_airport",
    "distance_x_sandstorm",
    "distance_x_rain",
];

/// Column names in transform order.
#[inline]
pub fn schema() -> &'static [&'static str] {
    &FEATURE_NAMES
}

/// Column index of `name`, if it is part of the schema.
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_NAMES.iter().position(|&n| n == name)
}

/// `true` if `names` is exactly this schema, in order.
pub fn matches_schema<S: AsRef<str>>(names: &[S]) -> bool {
    names.len() == FEATURE_COUNT && names.iter().zip(FEATURE_NAMES).all(|(a, b)| a.as_ref() == b)
}
