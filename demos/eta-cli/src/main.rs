//! `eta` — train a duration model offline and query it from the shell.
//!
//! ```text
//! eta generate --output trips.csv
//! eta train    --output model.bin [--from-csv trips.csv | --export-csv trips.csv]
//! eta predict  --artifact model.bin 44 55 2024-01-16T08:30:00
//! eta zones
//! eta health   --artifact model.bin
//! ```
//!
//! Every subcommand takes `--config <json>`; without it the built-in defaults
//! apply.  Results go to stdout as JSON, logs to stderr (`RUST_LOG` filters).

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use eta_core::EtaConfig;
use eta_engine::{ModelTier, PredictionRequest, PredictionService};
use eta_synth::{SyntheticTripGenerator, Weather, read_trips_csv, write_trips_csv};

#[derive(Parser, Debug)]
#[command(name = "eta", author, version, about = "Trip-duration estimation on a synthetic city grid", long_about = None)]
struct Cli {
    /// JSON configuration file; unknown keys are rejected.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a synthetic trip corpus and write it as CSV.
    Generate {
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Train both model tiers and write the artifact.
    Train {
        #[arg(short, long, default_value = "model.bin")]
        output: PathBuf,

        /// Train on a previously exported corpus instead of generating one.
        #[arg(long, conflicts_with = "export_csv")]
        from_csv: Option<PathBuf>,

        /// Also write the generated corpus as CSV.
        #[arg(long)]
        export_csv: Option<PathBuf>,
    },

    /// Estimate one trip.
    Predict {
        #[arg(short, long, default_value = "model.bin")]
        artifact: PathBuf,

        pickup: i64,

        dropoff: i64,

        /// ISO-8601 request time, e.g. 2024-01-16T08:30:00.
        time: String,

        #[arg(long, value_enum, default_value_t = WeatherArg::Clear)]
        weather: WeatherArg,

        #[arg(long, value_enum, default_value_t = TierArg::Advanced)]
        model: TierArg,
    },

    /// List every zone of the configured grid.
    Zones,

    /// Load the artifact and report readiness.
    Health {
        #[arg(short, long, default_value = "model.bin")]
        artifact: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum WeatherArg {
    Clear,
    Sandstorm,
    Rain,
}

impl From<WeatherArg> for Weather {
    fn from(w: WeatherArg) -> Self {
        match w {
            WeatherArg::Clear     => Weather::Clear,
            WeatherArg::Sandstorm => Weather::Sandstorm,
            WeatherArg::Rain      => Weather::Rain,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum TierArg {
    Baseline,
    Advanced,
}

impl From<TierArg> for ModelTier {
    fn from(t: TierArg) -> Self {
        match t {
            TierArg::Baseline => ModelTier::Baseline,
            TierArg::Advanced => ModelTier::Advanced,
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Generate { output } => generate(&config, &output),
        Command::Train { output, from_csv, export_csv } => {
            train(&config, &output, from_csv.as_deref(), export_csv.as_deref())
        }
        Command::Predict { artifact, pickup, dropoff, time, weather, model } => {
            let request = PredictionRequest::new(pickup, dropoff, time)
                .with_weather(weather.into())
                .with_model(model.into());
            predict(&config, &artifact, &request)
        }
        Command::Zones => print_json(&config.city_grid().zones().collect::<Vec<_>>()),
        Command::Health { artifact } => {
            let service = PredictionService::load(&config, &artifact);
            print_json(&service.health())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EtaConfig> {
    match path {
        Some(p) => EtaConfig::from_path(p).with_context(|| format!("loading config {}", p.display())),
        None => Ok(EtaConfig::default()),
    }
}

fn generate(config: &EtaConfig, output: &Path) -> Result<()> {
    config.validate()?;
    let t0 = Instant::now();
    let trips = SyntheticTripGenerator::new(config)?.generate_corpus()?;
    write_trips_csv(output, &trips).with_context(|| format!("writing {}", output.display()))?;
    info!(trips = trips.len(), path = %output.display(), elapsed_ms = t0.elapsed().as_millis() as u64, "corpus written");
    Ok(())
}

fn train(config: &EtaConfig, output: &Path, from_csv: Option<&Path>, export_csv: Option<&Path>) -> Result<()> {
    config.validate()?;
    let t0 = Instant::now();
    let trips = match from_csv {
        Some(path) => read_trips_csv(path).with_context(|| format!("reading {}", path.display()))?,
        None => SyntheticTripGenerator::new(config)?.generate_corpus()?,
    };
    if let Some(path) = export_csv {
        write_trips_csv(path, &trips).with_context(|| format!("writing {}", path.display()))?;
    }

    let bundle = eta_engine::train_on_trips(config, trips)?;
    bundle.save(output)?;
    info!(elapsed_ms = t0.elapsed().as_millis() as u64, "training finished");
    print_json(&bundle.metadata)
}

fn predict(config: &EtaConfig, artifact: &Path, request: &PredictionRequest) -> Result<()> {
    let service = PredictionService::load(config, artifact);
    if !service.is_ready() {
        bail!("model not ready: {}", service.health().detail);
    }
    let response = service.predict(request)?;
    print_json(&response)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
