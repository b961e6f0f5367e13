use thiserror::Error;

use eta_features::FeatureError;

/// Fitting or inference failure.  Every variant is fatal to a training run.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no training rows")]
    Empty,

    #[error("{rows} feature rows but {targets} targets")]
    ShapeMismatch { rows: usize, targets: usize },

    #[error("model expects {expected} features, got {found}")]
    WidthMismatch { expected: usize, found: usize },

    #[error("non-finite value in {0}")]
    NonFinite(&'static str),

    #[error("training targets have zero variance")]
    ZeroVarianceTargets,

    #[error("normal equations are singular")]
    Singular,

    #[error("model has not been fitted")]
    NotFitted,

    #[error(transparent)]
    Feature(#[from] FeatureError),
}

pub type ModelResult<T> = Result<T, ModelError>;
