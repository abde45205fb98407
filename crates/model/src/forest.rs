//! Random forest ensemble: the prediction is the mean of all tree outputs.

use serde::{Deserialize, Serialize};

use crate::tree::Tree;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub trees: Vec<Tree>,
    pub feature_count: usize,
}

impl RandomForest {
    pub fn new(trees: Vec<Tree>, feature_count: usize) -> Self {
        Self {
            trees,
            feature_count,
        }
    }

    /// Average of the tree outputs, accumulated in tree order.
    pub fn predict(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|tree| tree.evaluate(features)).sum();
        sum / self.trees.len() as f64
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_count)
                .map_err(|e| format!("tree {i}: {e}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Node;

    #[test]
    fn prediction_is_mean_of_trees() {
        let t1 = Tree::new(vec![
            Node::internal(0, 0, 5.0, 1, 2),
            Node::leaf(1, 10.0),
            Node::leaf(2, 30.0),
        ]);
        let t2 = Tree::new(vec![Node::leaf(0, 50.0)]);
        let forest = RandomForest::new(vec![t1, t2], 1);

        assert_eq!(forest.predict(&[1.0]), 30.0);
        assert_eq!(forest.predict(&[9.0]), 40.0);
        assert!(forest.validate().is_ok());
    }

    #[test]
    fn empty_forest_is_invalid() {
        let forest = RandomForest::new(Vec::new(), 6);
        assert!(forest.validate().is_err());
        assert_eq!(forest.predict(&[0.0; 6]), 0.0);
    }
}
