//! Pawtection trainer CLI
//!
//! Trains the dog bite risk pipeline, reports cross-validation scores,
//! persists the artifact and smoke-tests the reloaded model.

use anyhow::{Context, Result};
use clap::Parser;
use pawtection_model::{clip, load_pipeline, persist, Record, FEATURE_COLUMNS};
use pawtection_trainer::{train_from_dataset, Dataset, TrainerConfig, TrainingParams};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "pawtection-train")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train the dog bite risk score model", long_about = None)]
struct Args {
    /// Input CSV dataset (Breed, Age, Gender, SpayNeuter, Borough, IsBite, Score)
    #[arg(short, long, default_value = "transformed_dog_bites.csv")]
    input: PathBuf,

    /// Output model artifact path
    #[arg(short, long, default_value = "dog_bite_score_predictor.bin")]
    output: PathBuf,

    /// Optional TOML configuration file with a [training] table
    #[arg(short, long, env = "PAWTECTION_CONFIG")]
    config: Option<PathBuf>,

    /// Number of trees in the forest
    #[arg(long)]
    trees: Option<usize>,

    /// Random seed for bootstrap sampling and fold shuffling
    #[arg(long)]
    seed: Option<u64>,

    /// Cross-validation folds
    #[arg(long)]
    folds: Option<usize>,

    /// Skip scoring the training folds
    #[arg(long)]
    no_train_score: bool,

    /// Write the cross-validation report as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn training_params(&self) -> Result<TrainingParams> {
        let mut params = match &self.config {
            Some(path) => TrainerConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?
                .training,
            None => TrainingParams::default(),
        };

        if let Some(trees) = self.trees {
            params.n_trees = trees;
        }
        if let Some(seed) = self.seed {
            params.seed = seed;
        }
        if let Some(folds) = self.folds {
            params.folds = folds;
        }
        if self.no_train_score {
            params.return_train_score = false;
        }
        params.validate().context("Invalid training parameters")?;
        Ok(params)
    }
}

/// Sample records scored after reload
const DEMO_RECORDS: [[i64; 6]; 3] = [[0, 3, 0, 1, 5, 1], [1, 7, 1, 0, 3, 0], [2, 1, 0, 2, 1, 0]];

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Pawtection trainer v{}", env!("CARGO_PKG_VERSION"));
    info!("═══════════════════════════════════════════");

    let params = args.training_params()?;

    // Load dataset
    info!("Loading dataset from: {}", args.input.display());
    let dataset = Dataset::from_csv(&args.input).context("Failed to load dataset")?;
    info!("Loaded {} rows, features {:?}", dataset.len(), FEATURE_COLUMNS);

    for (name, (min, max)) in FEATURE_COLUMNS.iter().zip(dataset.column_ranges()) {
        info!("  {}: min={}, max={}", name, min, max);
    }

    if let Some(summary) = dataset.target_summary() {
        info!(
            "Target Score: count={} mean={:.4} std={:.4} min={} 25%={} 50%={} 75%={} max={}",
            summary.count, summary.mean, summary.std, summary.min, summary.p25, summary.p50, summary.p75, summary.max
        );
    }

    info!("Training configuration:");
    info!("  Trees: {}", params.n_trees);
    info!("  Seed: {}", params.seed);
    info!("  Folds: {}", params.folds);
    info!("  Max depth: {:?}", params.tree.max_depth);

    info!("═══════════════════════════════════════════");
    let outcome = train_from_dataset(&dataset, params)?;

    let cv = &outcome.cross_validation;
    info!("Cross-validation (held-out folds):");
    info!("  R²:  {:.4} +/- {:.4}", cv.test.r2.mean, cv.test.r2.std);
    info!("  MSE: {:.4} +/- {:.4}", cv.test.mse.mean, cv.test.mse.std);
    info!("  MAE: {:.4} +/- {:.4}", cv.test.mae.mean, cv.test.mae.std);
    if let Some(train) = &cv.train {
        info!("Cross-validation (training folds):");
        info!("  R²:  {:.4} +/- {:.4}", train.r2.mean, train.r2.std);
        info!("  MSE: {:.4} +/- {:.4}", train.mse.mean, train.mse.std);
        info!("  MAE: {:.4} +/- {:.4}", train.mae.mean, train.mae.std);
    }

    info!(
        "Full dataset sanity check (raw): R² {:.4}, MSE {:.4}",
        outcome.full_fit.r2, outcome.full_fit.mse
    );

    if let Some(report_path) = &args.report {
        let json = serde_json::to_string_pretty(cv).context("Failed to serialize report")?;
        std::fs::write(report_path, json)
            .with_context(|| format!("Failed to write report {}", report_path.display()))?;
        info!("Cross-validation report written to {}", report_path.display());
    }

    persist(&outcome.pipeline, &args.output).context("Failed to persist model")?;

    // Reload exactly as a predictor would
    let loaded = load_pipeline(&args.output).context("Failed to reload model")?;
    info!("Predictions from reloaded model (raw vs. clipped):");
    for (i, codes) in DEMO_RECORDS.iter().enumerate() {
        let record = Record::new(codes[0], codes[1], codes[2], codes[3], codes[4], codes[5]);
        let raw = loaded.predict(&record);
        info!(
            "  Data point {}: raw score = {:.2}, clipped score = {:.2}",
            i + 1,
            raw,
            clip(raw)
        );
    }

    info!("═══════════════════════════════════════════");
    info!("✓ Training completed successfully");
    info!("  Model: {}", args.output.display());

    Ok(())
}
