//! Engine-level errors.
//!
//! | Type              | Raised by                      | Meaning                           |
//! |-------------------|--------------------------------|-----------------------------------|
//! | `EngineError`     | `PredictionEngine`, service    | one request could not be scored   |
//! | `TrainingFailure` | `train`, `train_on_trips`      | the training run is aborted       |
//! | `ArtifactError`   | `ModelBundle::save` / `load`   | the artifact cannot be used       |

use thiserror::Error;

use eta_core::{ConfigError, ValidationError};
use eta_features::FeatureError;
use eta_model::ModelError;
use eta_synth::SynthError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed request.  Never retried.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No usable model is loaded; the request is rejected, not queued.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("inference failed: {0}")]
    Inference(#[from] ModelError),
}

impl From<FeatureError> for EngineError {
    fn from(e: FeatureError) -> Self {
        match e {
            FeatureError::Validation(v) => EngineError::Validation(v),
            other => EngineError::Inference(ModelError::Feature(other)),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Fatal to a training run.  There is no automatic retry.
#[derive(Debug, Error)]
pub enum TrainingFailure {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("trip generation failed: {0}")]
    Synth(#[from] SynthError),

    #[error("feature preparation failed: {0}")]
    Feature(#[from] FeatureError),

    #[error("model fitting failed: {0}")]
    Model(#[from] ModelError),

    #[error("the {0} split is empty")]
    EmptySplit(&'static str),
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact decode error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("not a model artifact")]
    BadMagic,

    #[error("artifact format version {found}, expected {expected}")]
    Version { found: u32, expected: u32 },

    #[error("artifact feature schema does not match this build: {0}")]
    Schema(String),

    #[error("invalid training or runtime configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("artifact was trained on a {artifact}×{artifact} grid, configuration says {configured}×{configured}")]
    GridMismatch { artifact: u16, configured: u16 },

    #[error("artifact header records a {header}×{header} grid but its training configuration says {trained}×{trained}")]
    InconsistentGrid { header: u16, trained: u16 },
}

pub type ArtifactResult<T> = Result<T, ArtifactError>;
