use thiserror::Error;

use eta_core::{ConfigError, ValidationError};

#[derive(Debug, Error)]
pub enum SynthError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The generator produced (or was asked to produce) an unusable corpus.
    #[error("degenerate corpus: {0}")]
    Degenerate(String),

    #[error("trip CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("trip CSV parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SynthResult<T> = Result<T, SynthError>;
