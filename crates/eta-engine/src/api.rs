//! Request and response shapes at the service boundary.
//!
//! These are plain serde types so any transport (the CLI, an HTTP layer) can
//! move them as JSON:
//!
//! ```json
//! { "pickup_zone": 44, "dropoff_zone": 55, "request_time": "2024-01-16T08:30:00" }
//! ```
//!
//! ```json
//! {
//!   "estimated_duration_minutes": 20.7,
//!   "confidence_interval": [15.1, 26.3],
//!   "factors": { "base_time": 6.0, "traffic_adjustment": 8.4,
//!                "weather_impact": 0.0, "zone_complexity": 6.3 },
//!   "model": "advanced"
//! }
//! ```

use serde::{Deserialize, Serialize};

use eta_synth::Weather;

/// Which regressor answers a request.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Baseline,
    /// Falls back to the baseline when the artifact has no advanced model.
    #[default]
    Advanced,
}

impl ModelTier {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelTier::Baseline => "baseline",
            ModelTier::Advanced => "advanced",
        }
    }
}

/// An incoming prediction request, not yet validated.
///
/// Zone ids are signed so negative input reaches validation instead of
/// failing deserialisation with a less useful message.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub pickup_zone:  i64,
    pub dropoff_zone: i64,
    /// ISO-8601, with or without a UTC offset.
    #[serde(default)]
    pub request_time: Option<String>,
    #[serde(default)]
    pub weather:      Weather,
    #[serde(default)]
    pub model:        ModelTier,
}

impl PredictionRequest {
    pub fn new(pickup_zone: i64, dropoff_zone: i64, request_time: impl Into<String>) -> Self {
        Self {
            pickup_zone,
            dropoff_zone,
            request_time: Some(request_time.into()),
            weather:      Weather::Clear,
            model:        ModelTier::default(),
        }
    }

    pub fn with_weather(mut self, weather: Weather) -> Self {
        self.weather = weather;
        self
    }

    pub fn with_model(mut self, model: ModelTier) -> Self {
        self.model = model;
        self
    }
}

/// Rule-based explanation of a prediction, in minutes.  The four terms sum
/// to the point estimate.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Factors {
    pub base_time:          f64,
    pub traffic_adjustment: f64,
    pub weather_impact:     f64,
    /// Zone access time plus whatever the model adds beyond the rules.
    pub zone_complexity:    f64,
}

impl Factors {
    pub fn total(&self) -> f64 {
        self.base_time + self.traffic_adjustment + self.weather_impact + self.zone_complexity
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub estimated_duration_minutes: f64,
    /// `[lower, upper]`, `lower <= estimate <= upper`.
    pub confidence_interval:        [f64; 2],
    pub factors:                    Factors,
    /// Tier that produced the estimate.
    pub model:                      ModelTier,
}

/// Liveness and readiness.  A process can be alive without a model.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub alive:        bool,
    pub model_loaded: bool,
    pub detail:       String,
    pub version:      String,
}
