//! Startup configuration.
//!
//! Every recognised option is a field below with a documented default.  The
//! JSON loader rejects unknown keys at every level (`deny_unknown_fields`),
//! so a typo surfaces at startup instead of silently running with a default.
//!
//! ```json
//! {
//!   "grid":      { "size": 10, "minutes_per_zone": 3.0 },
//!   "traffic":   { "rush_hour_windows": [[7, 10], [17, 21]], "weekend_days": ["Sat", "Sun"] },
//!   "weather":   { "sandstorm_probability": 0.05, "rain_probability": 0.02 },
//!   "generator": { "seed": 42, "n_trips": 20000 },
//!   "inference": { "confidence_z": 1.645 }
//! }
//! ```
//!
//! Omitted sections and fields take their defaults.

use std::path::Path;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::time::HourWindow;
use crate::{CityGrid, ConfigError, ConfigResult};

// ── Sections ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Grid dimension `N`; the city has `N²` zones.  Default 10.
    pub size: u16,
    /// Free-flow minutes per grid step; `base = distance × this`.  Default 3.0.
    pub minutes_per_zone: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { size: 10, minutes_per_zone: 3.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrafficConfig {
    /// Hours of rush traffic on working days.  Default 07–10 and 17–21.
    pub rush_hour_windows: Vec<HourWindow>,
    /// Days with the weekend pattern and no rush hour.  Default Sat, Sun.
    pub weekend_days: Vec<Weekday>,
    /// Rush minutes added per base minute.  Default 0.4.
    pub rush_slowdown: f64,
    /// Friday prayer (12–14) minutes added per base minute.  Default 0.3.
    pub friday_prayer_slowdown: f64,
    /// Weekend leisure (10–15) minutes added per base minute.  Default 0.2.
    pub weekend_leisure_slowdown: f64,
    /// Other weekend hours: minutes removed per base minute.  Default 0.1.
    pub weekend_relief: f64,
    /// Late night (00–06): minutes removed per base minute.  Default 0.2.
    pub late_night_speedup: f64,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            rush_hour_windows:        vec![HourWindow(7, 10), HourWindow(17, 21)],
            weekend_days:             vec![Weekday::Sat, Weekday::Sun],
            rush_slowdown:            0.4,
            friday_prayer_slowdown:   0.3,
            weekend_leisure_slowdown: 0.2,
            weekend_relief:           0.1,
            late_night_speedup:       0.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeatherConfig {
    /// Per-trip sandstorm chance.  Default 0.05.
    pub sandstorm_probability: f64,
    /// Sandstorm minutes added per base minute.  Default 0.4.
    pub sandstorm_penalty: f64,
    /// Per-trip rain chance (drawn only when there is no sandstorm).  Default 0.02.
    pub rain_probability: f64,
    /// Rain minutes added per base minute.  Default 0.25.
    pub rain_penalty: f64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            sandstorm_probability: 0.05,
            sandstorm_penalty:     0.4,
            rain_probability:      0.02,
            rain_penalty:          0.25,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Master RNG seed.  The same seed always produces the same corpus.
    pub seed: u64,
    /// Trips per generated corpus.  Default 20 000.
    pub n_trips: usize,
    /// First simulated day.  Default 2024-01-01.
    pub start_date: NaiveDate,
    /// Request times are spread over this many days.  Default 91.
    pub simulated_days: u32,
    /// Standard deviation of the driver-efficiency multiplier.  Default 0.15.
    pub driver_efficiency_std: f64,
    /// Share of simulated days with a special event.  Default 0.10.
    pub special_event_probability: f64,
    /// Chronological share of the corpus used for training.  Default 0.70.
    pub train_ratio: f64,
    /// Chronological share used for validation.  Default 0.15.
    pub val_ratio: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed:                      42,
            n_trips:                   20_000,
            start_date:                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            simulated_days:            91,
            driver_efficiency_std:     0.15,
            special_event_probability: 0.10,
            train_ratio:               0.70,
            val_ratio:                 0.15,
        }
    }
}

/// Hyperparameters for both model tiers.  The defaults are the tuned values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub n_trees:          usize,
    pub max_depth:        usize,
    pub learning_rate:    f64,
    /// Quantile bins per feature for split finding.
    pub n_bins:           usize,
    pub min_samples_leaf: usize,
    /// L2 penalty on leaf values.
    pub l2_penalty:       f64,
    /// Ridge penalty for the baseline linear model.
    pub ridge_alpha:      f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_trees:          200,
            max_depth:        6,
            learning_rate:    0.1,
            n_bins:           64,
            min_samples_leaf: 10,
            l2_penalty:       1.0,
            ridge_alpha:      1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InferenceConfig {
    /// Interval half-width in residual standard deviations.  1.645 ≈ 90 %.
    pub confidence_z: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self { confidence_z: 1.645 }
    }
}

// ── EtaConfig ─────────────────────────────────────────────────────────────────

/// Top-level configuration, consumed once at startup.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EtaConfig {
    pub grid:      GridConfig,
    pub traffic:   TrafficConfig,
    pub weather:   WeatherConfig,
    pub generator: GeneratorConfig,
    pub model:     ModelConfig,
    pub inference: InferenceConfig,
}

impl EtaConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: EtaConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON file.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        tracing::info!(path = %path.display(), grid = config.grid.size, "configuration loaded");
        Ok(config)
    }

    /// The grid described by this configuration.  Call after [`validate`](Self::validate).
    pub fn city_grid(&self) -> CityGrid {
        CityGrid::new(self.grid.size)
    }

    /// Range-check every option.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(2..=CityGrid::MAX_SIZE).contains(&self.grid.size) {
            return invalid("grid.size", format!("must be in 2..={}", CityGrid::MAX_SIZE));
        }
        positive("grid.minutes_per_zone", self.grid.minutes_per_zone)?;

        if let Some(w) = self.traffic.rush_hour_windows.iter().find(|w| !w.is_valid()) {
            return invalid("traffic.rush_hour_windows", format!("[{}, {}] is not a window within one day", w.0, w.1));
        }
        for (name, v) in [
            ("traffic.rush_slowdown",            self.traffic.rush_slowdown),
            ("traffic.friday_prayer_slowdown",   self.traffic.friday_prayer_slowdown),
            ("traffic.weekend_leisure_slowdown", self.traffic.weekend_leisure_slowdown),
            ("weather.sandstorm_penalty",        self.weather.sandstorm_penalty),
            ("weather.rain_penalty",             self.weather.rain_penalty),
        ] {
            non_negative(name, v)?;
        }
        // Speed-ups subtract from base time; keep every trip strictly positive.
        for (name, v) in [
            ("traffic.weekend_relief",     self.traffic.weekend_relief),
            ("traffic.late_night_speedup", self.traffic.late_night_speedup),
        ] {
            if !(0.0..0.5).contains(&v) {
                return invalid(name, format!("{v} must be in [0, 0.5)"));
            }
        }

        for (name, p) in [
            ("weather.sandstorm_probability",           self.weather.sandstorm_probability),
            ("weather.rain_probability",                self.weather.rain_probability),
            ("generator.special_event_probability",     self.generator.special_event_probability),
        ] {
            probability(name, p)?;
        }

        let g = &self.generator;
        if g.n_trips == 0 {
            return invalid("generator.n_trips", "must be at least 1".into());
        }
        if g.simulated_days == 0 {
            return invalid("generator.simulated_days", "must be at least 1".into());
        }
        positive("generator.driver_efficiency_std", g.driver_efficiency_std)?;
        if !(g.train_ratio > 0.0 && g.val_ratio >= 0.0 && g.train_ratio + g.val_ratio < 1.0) {
            return invalid(
                "generator.train_ratio",
                format!("train {} + val {} must leave a non-empty test split", g.train_ratio, g.val_ratio),
            );
        }

        let m = &self.model;
        if m.n_trees == 0 || m.max_depth == 0 || m.min_samples_leaf == 0 {
            return invalid("model", "n_trees, max_depth and min_samples_leaf must be at least 1".into());
        }
        if !(2..=256).contains(&m.n_bins) {
            return invalid("model.n_bins", "must be in 2..=256".into());
        }
        if !(m.learning_rate > 0.0 && m.learning_rate <= 1.0) {
            return invalid("model.learning_rate", format!("{} must be in (0, 1]", m.learning_rate));
        }
        non_negative("model.l2_penalty", m.l2_penalty)?;
        non_negative("model.ridge_alpha", m.ridge_alpha)?;

        positive("inference.confidence_z", self.inference.confidence_z)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn invalid(option: &'static str, reason: String) -> ConfigResult<()> {
    Err(ConfigError::Invalid { option, reason })
}

fn positive(option: &'static str, v: f64) -> ConfigResult<()> {
    if v.is_finite() && v > 0.0 { Ok(()) } else { invalid(option, format!("{v} must be > 0")) }
}

fn non_negative(option: &'static str, v: f64) -> ConfigResult<()> {
    if v.is_finite() && v >= 0.0 { Ok(()) } else { invalid(option, format!("{v} must be >= 0")) }
}

fn probability(option: &'static str, p: f64) -> ConfigResult<()> {
    if (0.0..=1.0).contains(&p) { Ok(()) } else { invalid(option, format!("{p} must be in [0, 1]")) }
}
