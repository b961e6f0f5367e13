//! Offline training pipeline.
//!
//! ```text
//! EtaConfig
//!   → generate        SyntheticTripGenerator::generate_corpus
//!   → check           reject empty or constant corpora
//!   → split           chronological train / validation / test
//!   → stats           ZonePairStatsStore::fit on the train split only
//!   → features        61 columns for every split; train rows leave their
//!                     own duration out of the zone-pair columns
//!   → fit             ridge baseline; GBDT truncated on validation RMSE
//!   → evaluate        both tiers on the held-out test split
//! ModelBundle
//! ```

use eta_core::EtaConfig;
use eta_features::{FEATURE_NAMES, FeatureEngineer, ZonePairStatsStore, targets};
use eta_model::{AdvancedModel, BaselineModel, GbdtParams, Regressor, evaluate};
use eta_synth::{CorpusSplit, SyntheticTripGenerator, TripRecord, check_corpus};

use crate::{ModelBundle, TrainingFailure, TrainingMetadata};

/// Generate a corpus from `config` and train both model tiers on it.
pub fn train(config: &EtaConfig) -> Result<ModelBundle, TrainingFailure> {
    config.validate()?;
    let generator = SyntheticTripGenerator::new(config)?;
    let trips = generator.generate_corpus()?;
    train_on_trips(config, trips)
}

/// Train on an existing corpus, e.g. one read back from CSV.  `config` is
/// validated here too, so a bad configuration surfaces as
/// [`TrainingFailure::Config`].
pub fn train_on_trips(config: &EtaConfig, trips: Vec<TripRecord>) -> Result<ModelBundle, TrainingFailure> {
    config.validate()?;
    check_corpus(&trips)?;
    let n_trips = trips.len();
    let gen_cfg = &config.generator;
    let split = CorpusSplit::chronological(trips, gen_cfg.train_ratio, gen_cfg.val_ratio);
    if split.train.is_empty() {
        return Err(TrainingFailure::EmptySplit("train"));
    }
    if split.test.is_empty() {
        return Err(TrainingFailure::EmptySplit("test"));
    }

    let stats = ZonePairStatsStore::fit(config.city_grid(), &split.train)?;
    tracing::info!(pairs = stats.pair_count(), global_mean = stats.global().mean, "zone-pair statistics fitted");

    let engineer = FeatureEngineer::new(config, stats);
    let (x_train, y_train) = (engineer.transform_training_batch(&split.train)?, targets(&split.train));
    let (x_test, y_test) = (engineer.transform_batch(&split.test)?, targets(&split.test));
    let x_val = engineer.transform_batch(&split.validation)?;
    let y_val = targets(&split.validation);

    let mut baseline = BaselineModel::new(config.model.ridge_alpha);
    baseline.fit(&x_train, &y_train)?;
    let baseline_metrics = evaluate(&baseline, &x_test, &y_test)?;

    let mut advanced = AdvancedModel::new(GbdtParams::from(&config.model));
    let validation = (!split.validation.is_empty()).then_some((&x_val, y_val.as_slice()));
    advanced.fit_with_validation(&x_train, &y_train, validation)?;
    let advanced_metrics = evaluate(&advanced, &x_test, &y_test)?;
    if advanced_metrics.rmse >= baseline_metrics.rmse {
        tracing::warn!(
            baseline = baseline_metrics.rmse,
            advanced = advanced_metrics.rmse,
            "advanced model does not beat the baseline on the test split"
        );
    }

    let mut feature_importance: Vec<(String, f64)> = advanced
        .feature_importance()
        .unwrap_or_default()
        .iter()
        .zip(FEATURE_NAMES)
        .map(|(&share, name)| (name.to_owned(), share))
        .collect();
    feature_importance.sort_by(|a, b| b.1.total_cmp(&a.1));

    let metadata = TrainingMetadata {
        seed: gen_cfg.seed,
        n_trips,
        train_rows: split.train.len(),
        validation_rows: split.validation.len(),
        test_rows: split.test.len(),
        baseline_metrics,
        advanced_metrics: Some(advanced_metrics),
        advanced_trees: advanced.n_trees(),
        feature_importance,
        trainer_version: env!("CARGO_PKG_VERSION").to_owned(),
    };

    Ok(ModelBundle {
        feature_names: FEATURE_NAMES.iter().map(|&n| n.to_owned()).collect(),
        grid_size: config.grid.size,
        config: config.clone(),
        stats: engineer.stats().clone(),
        baseline,
        advanced: Some(advanced),
        metadata,
    })
}
