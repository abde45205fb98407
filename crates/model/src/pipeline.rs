//! Fitted preprocessing + regression pipeline.

use serde::{Deserialize, Serialize};

use crate::errors::{ModelError, Result};
use crate::forest::RandomForest;
use crate::record::{Record, FEATURE_COUNT};
use crate::scaler::StandardScaler;

/// Training provenance stored alongside the fitted parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineMetadata {
    pub n_trees: usize,
    pub seed: u64,
    pub n_samples: usize,
    /// Unix timestamp (seconds) of the fit
    pub trained_at: i64,
}

/// Age scaler followed by a random forest regressor.
///
/// Immutable once fitted: the trainer builds it, the artifact module
/// persists it, predictors only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub scaler: StandardScaler,
    pub forest: RandomForest,
    pub metadata: PipelineMetadata,
}

impl Pipeline {
    pub fn new(scaler: StandardScaler, forest: RandomForest, metadata: PipelineMetadata) -> Self {
        Self {
            scaler,
            forest,
            metadata,
        }
    }

    /// Raw, unbounded risk score for one record
    pub fn predict(&self, record: &Record) -> f64 {
        self.predict_features(&record.to_features())
    }

    pub fn predict_features(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
        let transformed = self.scaler.transform(features);
        self.forest.predict(&transformed)
    }

    pub fn predict_batch(&self, rows: &[[f64; FEATURE_COUNT]]) -> Vec<f64> {
        rows.iter().map(|row| self.predict_features(row)).collect()
    }

    pub fn validate(&self) -> Result<()> {
        self.scaler.validate().map_err(ModelError::InvalidPipeline)?;
        if self.forest.feature_count != FEATURE_COUNT {
            return Err(ModelError::InvalidPipeline(format!(
                "forest expects {} features, pipeline provides {}",
                self.forest.feature_count, FEATURE_COUNT
            )));
        }
        self.forest.validate().map_err(ModelError::InvalidPipeline)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::record::AGE_INDEX;
    use crate::tree::{Node, Tree};

    /// Two-tree pipeline: pit bulls and prior biters score high, young
    /// dogs score higher than old ones.
    pub(crate) fn sample_pipeline() -> Pipeline {
        let breed_tree = Tree::new(vec![
            Node::internal(0, 0, 1.5, 1, 2),
            Node::leaf(1, 20.0),
            Node::internal(2, 0, 2.5, 3, 4),
            Node::leaf(3, 80.0),
            Node::leaf(4, 40.0),
        ]);
        let bite_age_tree = Tree::new(vec![
            Node::internal(0, 5, 0.5, 1, 2),
            Node::leaf(1, 10.0),
            Node::internal(2, AGE_INDEX as i32, 0.0, 3, 4),
            Node::leaf(3, 120.0),
            Node::leaf(4, 60.0),
        ]);

        Pipeline::new(
            StandardScaler {
                column: AGE_INDEX,
                mean: 5.0,
                scale: 2.0,
            },
            RandomForest::new(vec![breed_tree, bite_age_tree], FEATURE_COUNT),
            PipelineMetadata {
                n_trees: 2,
                seed: 42,
                n_samples: 0,
                trained_at: 0,
            },
        )
    }

    #[test]
    fn predict_applies_scaler_before_forest() {
        let pipeline = sample_pipeline();

        // Pit bull, age 3 (scaled -1.0), prior bite: (80 + 120) / 2
        let young = Record::new(2, 3, 1, 0, 5, 1);
        assert_eq!(pipeline.predict(&young), 100.0);

        // Same dog at age 9 (scaled 2.0): (80 + 60) / 2
        let old = Record::new(2, 9, 1, 0, 5, 1);
        assert_eq!(pipeline.predict(&old), 70.0);

        let batch = pipeline.predict_batch(&[young.to_features(), old.to_features()]);
        assert_eq!(batch, vec![100.0, 70.0]);
    }

    #[test]
    fn validate_rejects_feature_count_mismatch() {
        let mut pipeline = sample_pipeline();
        assert!(pipeline.validate().is_ok());

        pipeline.forest.feature_count = 3;
        assert!(matches!(
            pipeline.validate(),
            Err(ModelError::InvalidPipeline(_))
        ));
    }
}
