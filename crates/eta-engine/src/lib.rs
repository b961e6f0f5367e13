//! `eta-engine` — training pipeline, model artifact, and the prediction
//! service.
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`train`]    | `train`, `train_on_trips`: corpus → fitted `ModelBundle`   |
//! | [`artifact`] | `ModelBundle`, `TrainingMetadata`, bincode save / load     |
//! | [`engine`]   | `PredictionEngine`: validate → features → infer → explain  |
//! | [`service`]  | `PredictionService`: readiness, health, request routing    |
//! | [`api`]      | serde request / response / health shapes                   |
//! | [`error`]    | `EngineError`, `TrainingFailure`, `ArtifactError`          |
//!
//! Training and serving share one process boundary: the artifact.  It carries
//! the configuration the models were trained with, so a serving process
//! computes features exactly as training did.

pub mod api;
pub mod artifact;
pub mod engine;
pub mod error;
pub mod service;
pub mod train;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use api::{Factors, HealthStatus, ModelTier, PredictionRequest, PredictionResponse};
pub use artifact::{ARTIFACT_MAGIC, FORMAT_VERSION, ModelBundle, TrainingMetadata};
pub use engine::PredictionEngine;
pub use error::{ArtifactError, ArtifactResult, EngineError, EngineResult, TrainingFailure};
pub use service::PredictionService;
pub use train::{train, train_on_trips};
