//! Pawtection trainer - deterministic random forest training
//!
//! Loads the encoded dog bite dataset, cross-validates the scaler + forest
//! pipeline, refits it on every row and hands the result to
//! `pawtection_model::persist`.

pub mod cart;
pub mod dataset;
pub mod deterministic;
pub mod errors;
pub mod trainer;
pub mod validation;

use pawtection_model::Pipeline;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

pub use cart::{CartBuilder, TreeConfig};
pub use dataset::{Dataset, TargetSummary};
pub use deterministic::{mix_seed, LcgRng, SplitTieBreaker};
pub use errors::TrainerError;
pub use trainer::{build_pipeline, fit_final, PipelineTrainer, TrainingParams};
pub use validation::{
    cross_validate, evaluate, regression_metrics, CrossValidationReport, KFold, RegressionMetrics,
};

/// Trainer view of the shared configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub training: TrainingParams,
}

impl TrainerConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, TrainerError> {
        let config: Self = pawtection_model::read_toml(path)?;
        config.training.validate()?;
        Ok(config)
    }
}

/// Everything one training run produces
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub cross_validation: CrossValidationReport,
    pub pipeline: Pipeline,
    /// Raw predictions of the final model scored against its own training rows
    pub full_fit: RegressionMetrics,
}

/// Load → cross-validate → refit on all rows.
pub fn train_from_dataset(dataset: &Dataset, params: TrainingParams) -> Result<TrainingOutcome, TrainerError> {
    let trainer = PipelineTrainer::new(params);

    info!(
        "Cross-validating with {} folds ({} trees per fit)",
        trainer.params().folds,
        trainer.params().n_trees
    );
    let cross_validation = cross_validate(&trainer, dataset)?;

    let pipeline = fit_final(&trainer, dataset)?;
    let full_fit = evaluate(&pipeline, dataset);

    Ok(TrainingOutcome {
        cross_validation,
        pipeline,
        full_fit,
    })
}

/// Train directly from a CSV file.
pub fn train_from_csv(path: &Path, params: TrainingParams) -> Result<TrainingOutcome, TrainerError> {
    let dataset = Dataset::from_csv(path)?;
    train_from_dataset(&dataset, params)
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
