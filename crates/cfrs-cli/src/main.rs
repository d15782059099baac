//! `cfrs`: crop and fertilizer recommendations from the command line.
//!
//! Artifacts load once at startup; every subcommand except `labels` needs all
//! four of them. Results go to stdout, logs to stderr.

mod batch;
mod config;
mod display;

use std::path::PathBuf;

use anyhow::Context;
use cfrs_ai::{ArtifactStore, Recommender};
use cfrs_core::{CropMeasurements, Domain, FertilizerMeasurements};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use config::ArtifactArgs;

#[derive(Parser)]
#[command(name = "cfrs", version, about = "Crop and fertilizer recommendations")]
struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    artifacts: ArtifactArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recommend a crop from soil nutrients and climate
    Crop(CropArgs),
    /// Recommend a fertilizer from soil, crop and nutrient levels
    Fertilizer(FertilizerArgs),
    /// Score every row of a CSV or Parquet table
    Batch {
        /// Request domain: crop or fertilizer
        domain: Domain,
        /// Input table (.csv, .parquet, .pq)
        #[arg(short, long)]
        input: PathBuf,
        /// Output table (.csv, .parquet, .pq)
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Show label and category code tables
    Labels {
        /// Only this domain
        domain: Option<Domain>,
    },
    /// Show the loaded artifacts
    Info,
}

#[derive(Args)]
struct CropArgs {
    /// Nitrogen content ratio
    #[arg(short = 'n', long)]
    nitrogen: f64,
    /// Phosphorus content ratio
    #[arg(short = 'p', long)]
    phosphorus: f64,
    /// Potassium content ratio
    #[arg(short = 'k', long)]
    potassium: f64,
    /// Degrees Celsius
    #[arg(long, allow_negative_numbers = true)]
    temperature: f64,
    /// Relative humidity, percent
    #[arg(long)]
    humidity: f64,
    #[arg(long)]
    ph: f64,
    /// Rainfall in mm
    #[arg(long)]
    rainfall: f64,
}

impl From<CropArgs> for CropMeasurements {
    fn from(a: CropArgs) -> Self {
        Self {
            n: a.nitrogen,
            p: a.phosphorus,
            k: a.potassium,
            temperature: a.temperature,
            humidity: a.humidity,
            ph: a.ph,
            rainfall: a.rainfall,
        }
    }
}

#[derive(Args)]
struct FertilizerArgs {
    /// Degrees Celsius
    #[arg(long, allow_negative_numbers = true)]
    temperature: f64,
    /// Humidity fraction, e.g. 0.5
    #[arg(long)]
    humidity: f64,
    /// Soil moisture fraction, e.g. 0.6
    #[arg(long)]
    moisture: f64,
    /// Sandy, Loamy or Clayey
    #[arg(long)]
    soil_type: String,
    /// Rice, Maize or Wheat
    #[arg(long)]
    crop_type: String,
    #[arg(long)]
    nitrogen: f64,
    #[arg(long)]
    potassium: f64,
    #[arg(long)]
    phosphorous: f64,
}

impl From<FertilizerArgs> for FertilizerMeasurements {
    fn from(a: FertilizerArgs) -> Self {
        Self {
            temperature: a.temperature,
            humidity: a.humidity,
            moisture: a.moisture,
            soil_type: a.soil_type,
            crop_type: a.crop_type,
            nitrogen: a.nitrogen,
            potassium: a.potassium,
            phosphorous: a.phosphorous,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    config::init_logging(cli.verbose)?;
    info!("cfrs v{}", env!("CARGO_PKG_VERSION"));

    let paths = cli.artifacts.resolve();
    let load = || -> anyhow::Result<Recommender> {
        let store = ArtifactStore::load(&paths).context("loading model artifacts")?;
        Ok(Recommender::new(store))
    };

    match cli.command {
        // Label tables are static; no artifacts needed.
        Command::Labels { domain } => display::print_labels(domain, cli.json),
        Command::Crop(args) => {
            let rec = load()?.recommend_crop(&args.into())?;
            display::print_recommendation(&rec, cli.json)
        }
        Command::Fertilizer(args) => {
            let rec = load()?.recommend_fertilizer(&args.into())?;
            display::print_recommendation(&rec, cli.json)
        }
        Command::Batch {
            domain,
            input,
            output,
        } => {
            let stats = batch::run_batch(&load()?, domain, &input, &output)?;
            display::print_batch_stats(&stats, cli.json)
        }
        Command::Info => display::print_info(&load()?, &paths, cli.json),
    }
}
