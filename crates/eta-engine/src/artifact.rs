//! On-disk model artifact.
//!
//! # Layout
//!
//! Two bincode values back to back:
//!
//! 1. [`ArtifactHeader`]: magic bytes and format version, decoded and
//!    checked before anything else so an old or foreign file fails with a
//!    precise error instead of a decode error halfway through.
//! 2. [`ModelBundle`]: everything inference needs, including the training
//!    configuration, the fitted statistics snapshot, and the feature schema.
//!
//! Decoding is size-limited, so a corrupt length prefix cannot make the
//! loader allocate without bound.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use bincode::Options;
use serde::{Deserialize, Serialize};

use eta_core::EtaConfig;
use eta_features::{ZonePairStatsStore, matches_schema};
use eta_model::{AdvancedModel, BaselineModel, Metrics};

use crate::{ArtifactError, ArtifactResult};

pub const ARTIFACT_MAGIC: [u8; 4] = *b"ETAM";

/// Bump whenever [`ModelBundle`] or anything it contains changes shape.
pub const FORMAT_VERSION: u32 = 1;

const MAX_ARTIFACT_BYTES: u64 = 512 * 1024 * 1024;

fn codec() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_ARTIFACT_BYTES)
}

#[derive(Serialize, Deserialize)]
struct ArtifactHeader {
    magic:          [u8; 4],
    format_version: u32,
}

// ── Metadata ──────────────────────────────────────────────────────────────────

/// What the training run saw and how the models scored on the test split.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct TrainingMetadata {
    pub seed:               u64,
    pub n_trips:            usize,
    pub train_rows:         usize,
    pub validation_rows:    usize,
    pub test_rows:          usize,
    pub baseline_metrics:   Metrics,
    pub advanced_metrics:   Option<Metrics>,
    /// Trees kept after validation truncation.
    pub advanced_trees:     usize,
    /// `(feature, share of split gain)`, most important first.
    pub feature_importance: Vec<(String, f64)>,
    /// Version of the crate that trained the models.
    pub trainer_version:    String,
}

// ── ModelBundle ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelBundle {
    pub feature_names: Vec<String>,
    pub grid_size:     u16,
    /// Configuration the corpus was generated and the models trained with.
    pub config:        EtaConfig,
    pub stats:         ZonePairStatsStore,
    pub baseline:      BaselineModel,
    pub advanced:      Option<AdvancedModel>,
    pub metadata:      TrainingMetadata,
}

impl ModelBundle {
    pub fn save(&self, path: &Path) -> ArtifactResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        tracing::info!(path = %path.display(), "model artifact written");
        Ok(())
    }

    pub fn load(path: &Path) -> ArtifactResult<Self> {
        let bundle = Self::read_from(BufReader::new(File::open(path)?))?;
        tracing::info!(
            path = %path.display(),
            trips = bundle.metadata.n_trips,
            advanced = bundle.advanced.is_some(),
            "model artifact loaded"
        );
        Ok(bundle)
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> ArtifactResult<()> {
        let header = ArtifactHeader { magic: ARTIFACT_MAGIC, format_version: FORMAT_VERSION };
        codec().serialize_into(&mut writer, &header)?;
        codec().serialize_into(&mut writer, self)?;
        Ok(())
    }

    /// Decode and check magic, version, and feature schema.
    pub fn read_from<R: Read>(mut reader: R) -> ArtifactResult<Self> {
        let header: ArtifactHeader = codec().deserialize_from(&mut reader)?;
        if header.magic != ARTIFACT_MAGIC {
            return Err(ArtifactError::BadMagic);
        }
        if header.format_version != FORMAT_VERSION {
            return Err(ArtifactError::Version {
                found:    header.format_version,
                expected: FORMAT_VERSION,
            });
        }
        let bundle: ModelBundle = codec().deserialize_from(&mut reader)?;
        bundle.check_schema()?;
        Ok(bundle)
    }

    pub fn check_schema(&self) -> ArtifactResult<()> {
        if matches_schema(&self.feature_names) {
            Ok(())
        } else {
            Err(ArtifactError::Schema(format!(
                "artifact has {} features, this build expects {}",
                self.feature_names.len(),
                eta_features::FEATURE_COUNT
            )))
        }
    }
}
