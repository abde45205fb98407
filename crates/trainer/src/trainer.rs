//! Random forest pipeline trainer
//!
//! Fits the `Age` scaler on the training rows, then grows every tree on its
//! own bootstrap sample. Trees are grown in parallel; each derives its RNG
//! from `(seed, tree_index)` and results are collected in tree order, so the
//! fitted forest does not depend on the thread count.

use pawtection_model::{Pipeline, PipelineMetadata, RandomForest, StandardScaler, Tree, FEATURE_COUNT};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cart::{CartBuilder, TreeConfig};
use crate::dataset::Dataset;
use crate::deterministic::{mix_seed, LcgRng};
use crate::errors::{Result, TrainerError};

/// Pipeline hyperparameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    pub n_trees: usize,
    pub seed: u64,
    /// Cross-validation folds
    pub folds: usize,
    /// Draw each tree's rows with replacement
    pub bootstrap: bool,
    /// Also score the training folds during cross-validation
    pub return_train_score: bool,
    pub tree: TreeConfig,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            folds: 5,
            bootstrap: true,
            return_train_score: true,
            tree: TreeConfig::default(),
        }
    }
}

impl TrainingParams {
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(TrainerError::Training("n_trees must be at least 1".into()));
        }
        if self.folds < 2 {
            return Err(TrainerError::Training(format!(
                "folds must be at least 2, got {}",
                self.folds
            )));
        }
        if self.tree.min_samples_leaf == 0 {
            return Err(TrainerError::Training("min_samples_leaf must be at least 1".into()));
        }
        if self.tree.min_samples_split < 2 {
            return Err(TrainerError::Training("min_samples_split must be at least 2".into()));
        }
        Ok(())
    }
}

/// Unfitted scaler + forest pipeline
#[derive(Clone, Debug)]
pub struct PipelineTrainer {
    params: TrainingParams,
}

/// The production pipeline: 100 trees, seed 42, `Age` scaled.
pub fn build_pipeline() -> PipelineTrainer {
    PipelineTrainer::new(TrainingParams::default())
}

impl PipelineTrainer {
    pub fn new(params: TrainingParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    /// Fit scaler and forest on every row of `dataset`.
    pub fn fit(&self, dataset: &Dataset) -> Result<Pipeline> {
        self.params.validate()?;
        if dataset.is_empty() {
            return Err(TrainerError::EmptyDataset);
        }

        let scaler = StandardScaler::fit_age(&dataset.features);
        let transformed: Vec<[f64; FEATURE_COUNT]> =
            dataset.features.iter().map(|row| scaler.transform(row)).collect();

        let trees: Vec<Tree> = (0..self.params.n_trees)
            .into_par_iter()
            .map(|tree_idx| self.grow_tree(&transformed, &dataset.targets, tree_idx))
            .collect();

        debug!(
            "Grew {} trees on {} rows (age mean {:.3}, scale {:.3})",
            trees.len(),
            dataset.len(),
            scaler.mean,
            scaler.scale
        );

        let metadata = PipelineMetadata {
            n_trees: trees.len(),
            seed: self.params.seed,
            n_samples: dataset.len(),
            trained_at: chrono::Utc::now().timestamp(),
        };

        Ok(Pipeline::new(
            scaler,
            RandomForest::new(trees, FEATURE_COUNT),
            metadata,
        ))
    }

    fn grow_tree(&self, features: &[[f64; FEATURE_COUNT]], targets: &[f64], tree_idx: usize) -> Tree {
        let n = features.len();
        let indices: Vec<usize> = if self.params.bootstrap {
            let mut rng = LcgRng::new(mix_seed(self.params.seed, tree_idx as u64));
            (0..n).map(|_| rng.next_range(n)).collect()
        } else {
            (0..n).collect()
        };

        let tree = CartBuilder::new(features, targets, self.params.tree.clone()).build(&indices);
        debug!(
            "Tree {}: {} nodes, depth {}",
            tree_idx,
            tree.nodes.len(),
            tree.depth()
        );
        tree
    }
}

/// Refit on the entire dataset; the result is what gets deployed.
pub fn fit_final(trainer: &PipelineTrainer, dataset: &Dataset) -> Result<Pipeline> {
    info!("Training final model on all {} rows", dataset.len());
    let pipeline = trainer.fit(dataset)?;
    info!(
        "Final model complete: {} trees",
        pipeline.forest.num_trees()
    );
    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_simple_dataset() -> Dataset {
        let mut features = Vec::new();
        let mut targets = Vec::new();
        for breed in 1..=7 {
            for age in 1..=6 {
                for is_bite in 0..=1 {
                    features.push([breed as f64, age as f64, 1.0, 0.0, 5.0, is_bite as f64]);
                    targets.push(breed as f64 * 8.0 + is_bite as f64 * 30.0 - age as f64);
                }
            }
        }
        Dataset::new(features, targets).unwrap()
    }

    fn small_params() -> TrainingParams {
        TrainingParams {
            n_trees: 8,
            ..TrainingParams::default()
        }
    }

    #[test]
    fn test_defaults_match_production_pipeline() {
        let params = build_pipeline().params().clone();
        assert_eq!(params.n_trees, 100);
        assert_eq!(params.seed, 42);
        assert_eq!(params.folds, 5);
        assert!(params.bootstrap);
        assert_eq!(params.tree.max_depth, None);
    }

    #[test]
    fn test_train_simple_model() {
        let dataset = create_simple_dataset();
        let pipeline = PipelineTrainer::new(small_params()).fit(&dataset).unwrap();

        assert_eq!(pipeline.forest.num_trees(), 8);
        assert_eq!(pipeline.metadata.n_samples, dataset.len());
        assert!(pipeline.validate().is_ok());
        assert!((pipeline.scaler.mean - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_determinism() {
        let dataset = create_simple_dataset();
        let trainer = PipelineTrainer::new(small_params());

        let p1 = trainer.fit(&dataset).unwrap();
        let p2 = trainer.fit(&dataset).unwrap();

        assert_eq!(p1.forest, p2.forest);
        assert_eq!(p1.scaler, p2.scaler);
    }

    #[test]
    fn test_seed_changes_forest() {
        let dataset = create_simple_dataset();
        let p1 = PipelineTrainer::new(small_params()).fit(&dataset).unwrap();
        let p2 = PipelineTrainer::new(TrainingParams {
            seed: 7,
            ..small_params()
        })
        .fit(&dataset)
        .unwrap();

        assert_ne!(p1.forest, p2.forest);
    }

    #[test]
    fn test_without_bootstrap_trees_are_identical() {
        let dataset = create_simple_dataset();
        let pipeline = PipelineTrainer::new(TrainingParams {
            n_trees: 3,
            bootstrap: false,
            ..TrainingParams::default()
        })
        .fit(&dataset)
        .unwrap();

        let trees = &pipeline.forest.trees;
        assert_eq!(trees[0], trees[1]);
        assert_eq!(trees[1], trees[2]);
        // Distinct rows with no bootstrap: the forest reproduces its targets.
        for (row, target) in dataset.features.iter().zip(&dataset.targets) {
            assert!((pipeline.predict_features(row) - target).abs() < 1e-9);
        }
    }

    #[test]
    fn test_invalid_params_rejected() {
        let dataset = create_simple_dataset();
        let zero_trees = TrainingParams {
            n_trees: 0,
            ..TrainingParams::default()
        };
        assert!(matches!(
            PipelineTrainer::new(zero_trees).fit(&dataset),
            Err(TrainerError::Training(_))
        ));
    }
}
