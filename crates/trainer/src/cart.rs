//! CART regression tree builder
//!
//! Exact-greedy, squared-error splits. Candidate thresholds sit halfway
//! between adjacent distinct feature values; equal-gain candidates are
//! resolved by [`SplitTieBreaker`] so the same sample always yields the
//! same tree.

use pawtection_model::{Node, Tree, FEATURE_COUNT};
use serde::{Deserialize, Serialize};

use crate::deterministic::SplitTieBreaker;

/// Node impurity below which a node becomes a leaf
const MIN_IMPURITY: f64 = 1e-7;

/// Feature values closer than this are treated as equal
const FEATURE_EPSILON: f64 = 1e-7;

/// Growth limits for a single tree
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// `None` grows until leaves are pure or too small to split
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
    tie_breaker: SplitTieBreaker,
}

/// Builds regression trees over a shared feature matrix
pub struct CartBuilder<'a> {
    config: TreeConfig,
    features: &'a [[f64; FEATURE_COUNT]],
    targets: &'a [f64],
}

impl<'a> CartBuilder<'a> {
    pub fn new(features: &'a [[f64; FEATURE_COUNT]], targets: &'a [f64], config: TreeConfig) -> Self {
        debug_assert_eq!(features.len(), targets.len());
        Self {
            config,
            features,
            targets,
        }
    }

    /// Grow a tree on the rows at `indices`. Repeated indices (bootstrap
    /// draws) count once per occurrence.
    pub fn build(&self, indices: &[usize]) -> Tree {
        let mut nodes = Vec::new();
        self.build_node(indices.to_vec(), 0, &mut nodes);
        Tree::new(nodes)
    }

    fn build_node(&self, indices: Vec<usize>, depth: usize, nodes: &mut Vec<Node>) -> i32 {
        let current_idx = nodes.len() as i32;
        let (sum, sum_sq) = self.target_sums(&indices);
        let n = indices.len() as f64;
        let mean = if indices.is_empty() { 0.0 } else { sum / n };
        let impurity = if indices.is_empty() {
            0.0
        } else {
            sum_sq / n - mean * mean
        };

        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);
        if depth_reached
            || indices.len() < self.config.min_samples_split
            || indices.len() < 2 * self.config.min_samples_leaf
            || impurity <= MIN_IMPURITY
        {
            nodes.push(Node::leaf(current_idx, mean));
            return current_idx;
        }

        let Some(split) = self.find_best_split(&indices) else {
            nodes.push(Node::leaf(current_idx, mean));
            return current_idx;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.features[i][split.feature_idx] <= split.threshold);

        // Reserve the split node, then fill in child indices after recursion
        nodes.push(Node::internal(
            current_idx,
            split.feature_idx as i32,
            split.threshold,
            -1,
            -1,
        ));

        let left_idx = self.build_node(left, depth + 1, nodes);
        let right_idx = self.build_node(right, depth + 1, nodes);

        nodes[current_idx as usize].left = left_idx;
        nodes[current_idx as usize].right = right_idx;

        current_idx
    }

    /// Best split by squared-error reduction.
    ///
    /// Maximizes `S_l²/n_l + S_r²/n_r`, which differs from the weighted
    /// child impurity only by terms that are constant for the node.
    fn find_best_split(&self, indices: &[usize]) -> Option<SplitCandidate> {
        let min_leaf = self.config.min_samples_leaf.max(1);
        let n = indices.len();
        let (total, _) = self.target_sums(indices);
        let mut best: Option<SplitCandidate> = None;
        let mut sorted = indices.to_vec();

        for feature_idx in 0..FEATURE_COUNT {
            sorted.sort_by(|&a, &b| self.features[a][feature_idx].total_cmp(&self.features[b][feature_idx]));

            let first = self.features[sorted[0]][feature_idx];
            let last = self.features[sorted[n - 1]][feature_idx];
            if last <= first + FEATURE_EPSILON {
                continue;
            }

            let mut left_sum = 0.0;
            for position in 0..n - 1 {
                left_sum += self.targets[sorted[position]];

                let x = self.features[sorted[position]][feature_idx];
                let next = self.features[sorted[position + 1]][feature_idx];
                if next <= x + FEATURE_EPSILON {
                    continue;
                }

                let n_left = position + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let right_sum = total - left_sum;
                let gain = left_sum * left_sum / n_left as f64 + right_sum * right_sum / n_right as f64;

                let candidate = SplitCandidate {
                    feature_idx,
                    threshold: midpoint(x, next),
                    gain,
                    tie_breaker: SplitTieBreaker::new(feature_idx, position),
                };

                best = match best {
                    None => Some(candidate),
                    Some(current) => {
                        if candidate.gain > current.gain
                            || (candidate.gain == current.gain
                                && candidate.tie_breaker < current.tie_breaker)
                        {
                            Some(candidate)
                        } else {
                            Some(current)
                        }
                    }
                };
            }
        }

        best
    }

    fn target_sums(&self, indices: &[usize]) -> (f64, f64) {
        indices.iter().fold((0.0, 0.0), |(sum, sum_sq), &i| {
            let y = self.targets[i];
            (sum + y, sum_sq + y * y)
        })
    }
}

/// Halfway point between two adjacent distinct values, falling back to the
/// lower value when rounding would put it on the upper one.
fn midpoint(lower: f64, upper: f64) -> f64 {
    let mid = lower / 2.0 + upper / 2.0;
    if mid >= upper || !mid.is_finite() {
        lower
    } else {
        mid
    }
}
