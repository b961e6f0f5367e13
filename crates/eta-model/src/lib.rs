//! `eta-model` — the two duration regressors and their evaluation.
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`regressor`] | `Regressor` trait: fit / predict / uncertainty          |
//! | [`linear`]    | `BaselineModel`: ridge regression, Cholesky solve       |
//! | [`gbdt`]      | `AdvancedModel`: histogram gradient-boosted trees       |
//! | [`metrics`]   | `Metrics` (MAE, RMSE, MAPE, R²), `evaluate`             |
//! | [`error`]     | `ModelError`, `ModelResult`                             |
//!
//! Both models report the training-residual standard deviation as their
//! uncertainty.  It is computed once at fit time and serialised with the
//! model.
//!
//! # Feature flags
//!
//! - `parallel`: evaluate split candidates across features on Rayon's thread
//!   pool.  Fitted ensembles are identical to the sequential path.

mod binning;
pub mod error;
pub mod gbdt;
pub mod linear;
pub mod metrics;
pub mod regressor;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{ModelError, ModelResult};
pub use gbdt::{AdvancedModel, GbdtParams};
pub use linear::BaselineModel;
pub use metrics::{Metrics, evaluate};
pub use regressor::Regressor;
