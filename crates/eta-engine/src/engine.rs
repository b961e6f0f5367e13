//! Per-request prediction.
//!
//! # Request lifecycle
//!
//! ```text
//! PredictionRequest
//!   → validate          zones in range, pickup ≠ dropoff, timestamp parses
//!   → transform         FeatureEngineer against the artifact's stats snapshot
//!   → infer             advanced model (baseline if absent or requested)
//!   → interval          point ± z·σ, lower bound clamped to 0
//!   → decompose         rule centre values; model residual → zone_complexity
//! PredictionResponse
//! ```
//!
//! The engine holds no per-request state and is never mutated after
//! construction, so one instance serves any number of threads.

use eta_core::{CityGrid, EtaConfig, RequestTime, ValidationError, ValidationResult, Zone};
use eta_features::FeatureEngineer;
use eta_model::{AdvancedModel, BaselineModel, Regressor};
use eta_synth::{DurationRules, MIN_TRIP_MINUTES, TripRequest};

use crate::api::{Factors, ModelTier, PredictionRequest, PredictionResponse};
use crate::{ArtifactError, ArtifactResult, EngineResult, ModelBundle};

pub struct PredictionEngine {
    grid:         CityGrid,
    rules:        DurationRules,
    features:     FeatureEngineer,
    baseline:     BaselineModel,
    advanced:     Option<AdvancedModel>,
    confidence_z: f64,
}

impl PredictionEngine {
    /// Build from a loaded artifact.
    ///
    /// Features and the factor decomposition follow the configuration the
    /// models were trained with; `runtime` contributes only inference options
    /// and must describe the same grid.  Both configurations are validated,
    /// so a bad `confidence_z` is rejected here rather than per request.
    pub fn from_bundle(runtime: &EtaConfig, bundle: ModelBundle) -> ArtifactResult<Self> {
        bundle.check_schema()?;
        bundle.config.validate()?;
        runtime.validate()?;
        if bundle.config.grid.size != bundle.grid_size {
            return Err(ArtifactError::InconsistentGrid {
                header:  bundle.grid_size,
                trained: bundle.config.grid.size,
            });
        }
        if bundle.grid_size != runtime.grid.size {
            return Err(ArtifactError::GridMismatch {
                artifact:   bundle.grid_size,
                configured: runtime.grid.size,
            });
        }
        if bundle.config.traffic != runtime.traffic {
            tracing::warn!("runtime traffic settings differ from training; using the training settings");
        }

        let trained = &bundle.config;
        Ok(Self {
            grid:         trained.city_grid(),
            rules:        DurationRules::from_config(trained),
            features:     FeatureEngineer::new(trained, bundle.stats),
            baseline:     bundle.baseline,
            advanced:     bundle.advanced,
            confidence_z: runtime.inference.confidence_z,
        })
    }

    #[inline]
    pub fn grid(&self) -> CityGrid {
        self.grid
    }

    pub fn has_advanced(&self) -> bool {
        self.advanced.is_some()
    }

    /// Every zone in id order.
    pub fn zones(&self) -> Vec<Zone> {
        self.grid.zones().collect()
    }

    /// Check a raw request and convert it to a typed trip request.
    pub fn validate(&self, request: &PredictionRequest) -> ValidationResult<TripRequest> {
        let pickup = self.grid.check(request.pickup_zone)?;
        let dropoff = self.grid.check(request.dropoff_zone)?;
        if pickup == dropoff {
            return Err(ValidationError::SameZone(request.pickup_zone));
        }
        let raw_time = request.request_time.as_deref().ok_or(ValidationError::MissingTimestamp)?;
        Ok(TripRequest {
            pickup,
            dropoff,
            request_time: RequestTime::parse(raw_time)?,
            weather: request.weather,
        })
    }

    pub fn predict(&self, request: &PredictionRequest) -> EngineResult<PredictionResponse> {
        let trip = self.validate(request)?;
        let features = self.features.transform(&trip)?;

        let (model, tier): (&dyn Regressor, ModelTier) = match (&self.advanced, request.model) {
            (Some(advanced), ModelTier::Advanced) => (advanced, ModelTier::Advanced),
            _ => (&self.baseline, ModelTier::Baseline),
        };
        let (raw, std) = model.predict_with_uncertainty(features.as_slice())?;
        let point = raw.max(MIN_TRIP_MINUTES);

        let half_width = self.confidence_z * std;
        let lower = (point - half_width).max(0.0);
        let upper = point + half_width;

        let expected = self.rules.expected(&trip)?;
        let rule_total = expected.base + expected.traffic + expected.weather + expected.zone;
        let factors = Factors {
            base_time:          expected.base,
            traffic_adjustment: expected.traffic,
            weather_impact:     expected.weather,
            zone_complexity:    expected.zone + (point - rule_total),
        };

        tracing::debug!(
            pickup = trip.pickup.0,
            dropoff = trip.dropoff.0,
            model = tier.as_str(),
            estimate = point,
            "prediction"
        );

        Ok(PredictionResponse {
            estimated_duration_minutes: point,
            confidence_interval:        [lower, upper],
            factors,
            model:                      tier,
        })
    }
}
