//! Regression tree structures
//!
//! Trees are stored as flat node arrays with node 0 as the root. Traversal
//! goes left when `feature <= threshold`.

use serde::{Deserialize, Serialize};

/// A decision tree node (internal or leaf)
///
/// For internal nodes `feature_idx >= 0`, `left`/`right` index into the
/// node array and `leaf` is `None`. Leaves carry `feature_idx == -1` and
/// the predicted value in `leaf`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: i32,
    pub left: i32,
    pub right: i32,
    pub feature_idx: i32,
    pub threshold: f64,
    pub leaf: Option<f64>,
}

impl Node {
    pub fn internal(id: i32, feature_idx: i32, threshold: f64, left: i32, right: i32) -> Self {
        Self {
            id,
            left,
            right,
            feature_idx,
            threshold,
            leaf: None,
        }
    }

    pub fn leaf(id: i32, value: f64) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0.0,
            leaf: Some(value),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_idx == -1 || self.leaf.is_some()
    }
}

/// A single regression tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Evaluate this tree on a (transformed) feature vector.
    ///
    /// Structural problems evaluate to 0.0; [`Tree::validate`] rejects
    /// such trees before they are ever used for prediction.
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        let mut idx = 0usize;

        loop {
            let Some(node) = self.nodes.get(idx) else {
                return 0.0;
            };

            if node.is_leaf() {
                return node.leaf.unwrap_or(0.0);
            }

            let Some(&value) = features.get(node.feature_idx as usize) else {
                return 0.0;
            };

            let next = if value <= node.threshold {
                node.left
            } else {
                node.right
            };
            if next < 0 {
                return 0.0;
            }
            idx = next as usize;
        }
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Longest root-to-leaf path, counted in edges
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes.get(idx) {
                Some(node) if !node.is_leaf() => {
                    1 + walk(nodes, node.left as usize).max(walk(nodes, node.right as usize))
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    /// Validate tree structure against the expected feature count.
    ///
    /// Children must point forward in the node array, which rules out
    /// cycles.
    pub fn validate(&self, feature_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                match node.leaf {
                    Some(v) if v.is_finite() => {}
                    Some(v) => return Err(format!("leaf {i} has non-finite value {v}")),
                    None => return Err(format!("leaf {i} has no value")),
                }
                continue;
            }

            if node.feature_idx < 0 || node.feature_idx as usize >= feature_count {
                return Err(format!(
                    "node {i} splits on invalid feature {}",
                    node.feature_idx
                ));
            }
            if !node.threshold.is_finite() {
                return Err(format!("node {i} has non-finite threshold"));
            }
            for child in [node.left, node.right] {
                if child <= i as i32 || child as usize >= self.nodes.len() {
                    return Err(format!("node {i} has invalid child {child}"));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump() -> Tree {
        Tree::new(vec![
            Node::internal(0, 0, 50.0, 1, 2),
            Node::leaf(1, 10.0),
            Node::leaf(2, 20.0),
        ])
    }

    #[test]
    fn test_node_creation() {
        let internal = Node::internal(0, 3, 1.5, 1, 2);
        assert!(!internal.is_leaf());
        assert_eq!(internal.feature_idx, 3);

        let leaf = Node::leaf(1, -2.5);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.leaf, Some(-2.5));
    }

    #[test]
    fn test_tree_evaluation() {
        let tree = stump();
        assert_eq!(tree.evaluate(&[30.0]), 10.0);
        assert_eq!(tree.evaluate(&[50.0]), 10.0); // equal goes left
        assert_eq!(tree.evaluate(&[60.0]), 20.0);
    }

    #[test]
    fn test_tree_shape() {
        let tree = stump();
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.depth(), 1);
        assert_eq!(Tree::new(vec![Node::leaf(0, 1.0)]).depth(), 0);
    }

    #[test]
    fn test_tree_validation() {
        assert!(stump().validate(1).is_ok());
        assert!(stump().validate(0).is_err());

        let bad_child = Tree::new(vec![
            Node::internal(0, 0, 50.0, 5, 2),
            Node::leaf(1, 10.0),
            Node::leaf(2, 20.0),
        ]);
        assert!(bad_child.validate(1).is_err());

        let cycle = Tree::new(vec![
            Node::internal(0, 0, 50.0, 0, 1),
            Node::leaf(1, 10.0),
        ]);
        assert!(cycle.validate(1).is_err());

        assert!(Tree::new(Vec::new()).validate(1).is_err());
        assert!(Tree::new(vec![Node::leaf(0, f64::NAN)]).validate(1).is_err());
    }
}
