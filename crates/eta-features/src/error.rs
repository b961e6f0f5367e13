use thiserror::Error;

use eta_core::ValidationError;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("cannot fit statistics on an empty training corpus")]
    EmptyCorpus,

    #[error("feature row has {found} columns, expected {expected}")]
    WidthMismatch { expected: usize, found: usize },
}

pub type FeatureResult<T> = Result<T, FeatureError>;
