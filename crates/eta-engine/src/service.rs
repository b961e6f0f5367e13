//! Service boundary: owns the engine if one could be built and answers
//! health checks either way.
//!
//! Loading never panics.  A missing, corrupt, or incompatible artifact leaves
//! the service alive but not ready: `health()` says why and every `predict`
//! is rejected with [`EngineError::ModelUnavailable`].

use std::path::Path;

use eta_core::{EtaConfig, Zone};

use crate::api::{HealthStatus, PredictionRequest, PredictionResponse};
use crate::{EngineError, EngineResult, ModelBundle, PredictionEngine};

enum State {
    Ready(Box<PredictionEngine>),
    Unavailable { reason: String },
}

pub struct PredictionService {
    state: State,
}

impl PredictionService {
    /// Load the artifact at `path` and build an engine against `config`.
    pub fn load(config: &EtaConfig, path: &Path) -> Self {
        let built = ModelBundle::load(path).and_then(|bundle| PredictionEngine::from_bundle(config, bundle));
        match built {
            Ok(engine) => Self::from_engine(engine),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "model not loaded; service is not ready");
                Self::unavailable(format!("{}: {e}", path.display()))
            }
        }
    }

    pub fn from_engine(engine: PredictionEngine) -> Self {
        Self { state: State::Ready(Box::new(engine)) }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self { state: State::Unavailable { reason: reason.into() } }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    pub fn engine(&self) -> Option<&PredictionEngine> {
        match &self.state {
            State::Ready(engine) => Some(engine.as_ref()),
            State::Unavailable { .. } => None,
        }
    }

    pub fn health(&self) -> HealthStatus {
        let detail = match &self.state {
            State::Ready(engine) if engine.has_advanced() => "ready".to_owned(),
            State::Ready(_) => "ready (baseline only)".to_owned(),
            State::Unavailable { reason } => reason.clone(),
        };
        HealthStatus {
            alive:        true,
            model_loaded: self.is_ready(),
            detail,
            version:      env!("CARGO_PKG_VERSION").to_owned(),
        }
    }

    pub fn predict(&self, request: &PredictionRequest) -> EngineResult<PredictionResponse> {
        match &self.state {
            State::Ready(engine) => engine.predict(request),
            State::Unavailable { reason } => Err(EngineError::ModelUnavailable(reason.clone())),
        }
    }

    /// Zone layout of the loaded model's grid.
    pub fn zones(&self) -> EngineResult<Vec<Zone>> {
        match &self.state {
            State::Ready(engine) => Ok(engine.zones()),
            State::Unavailable { reason } => Err(EngineError::ModelUnavailable(reason.clone())),
        }
    }
}
