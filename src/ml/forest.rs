//! Random-forest estimators for classification and regression.
//!
//! CART trees over a dense `f64` design matrix: gini impurity for
//! classification, variance for regression, bootstrap sampling per tree,
//! sqrt-feature subsampling for classifiers. Trees are independent and fit
//! in parallel; every source of randomness is seeded, so a fit is
//! reproducible for a given seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const DEFAULT_TREES: usize = 100;
const DEFAULT_MAX_DEPTH: usize = 32;
const MIN_SAMPLES_SPLIT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForestKind {
    Classifier,
    Regressor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A single fitted CART tree (arena-allocated nodes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn predict_one(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    // NaN features fall through to the right branch.
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Random-forest ensemble with reference-toolkit defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    kind: ForestKind,
    n_trees: usize,
    max_depth: usize,
    seed: u64,
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

struct TreeParams {
    kind: ForestKind,
    max_depth: usize,
    max_features: usize,
    n_features: usize,
    n_classes: usize,
}

impl RandomForest {
    /// An unfitted classification forest.
    pub fn classifier() -> Self {
        RandomForest {
            kind: ForestKind::Classifier,
            n_trees: DEFAULT_TREES,
            max_depth: DEFAULT_MAX_DEPTH,
            seed: 42,
            n_classes: 0,
            trees: Vec::new(),
        }
    }

    /// An unfitted regression forest.
    pub fn regressor() -> Self {
        RandomForest {
            kind: ForestKind::Regressor,
            ..RandomForest::classifier()
        }
    }

    pub fn with_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees.max(1);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn kind(&self) -> ForestKind {
        self.kind
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Fit on a row-major design matrix. For classification, `y` holds
    /// class indices (as `f64`).
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        if x.len() != y.len() {
            return Err(Error::DimensionMismatch(format!(
                "feature matrix has {} rows, target has {}",
                x.len(),
                y.len()
            )));
        }
        if x.is_empty() {
            return Err(Error::EmptyData("cannot fit on zero rows".to_string()));
        }
        let n_features = x[0].len();
        if n_features == 0 {
            return Err(Error::EmptyData("cannot fit on zero features".to_string()));
        }
        if x.iter().any(|row| row.len() != n_features) {
            return Err(Error::DimensionMismatch(
                "ragged feature matrix".to_string(),
            ));
        }

        self.n_classes = match self.kind {
            ForestKind::Classifier => y.iter().map(|&v| v as usize).max().unwrap_or(0) + 1,
            ForestKind::Regressor => 0,
        };
        let params = TreeParams {
            kind: self.kind,
            max_depth: self.max_depth,
            max_features: match self.kind {
                ForestKind::Classifier => ((n_features as f64).sqrt().round() as usize).max(1),
                ForestKind::Regressor => n_features,
            },
            n_features,
            n_classes: self.n_classes,
        };

        let seed = self.seed;
        self.trees = (0..self.n_trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
                let n = x.len();
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                fit_tree(x, y, sample, &params, &mut rng)
            })
            .collect();
        Ok(())
    }

    /// Predict one row: majority vote of class indices for classification,
    /// mean of tree outputs for regression.
    pub fn predict_one(&self, row: &[f64]) -> Result<f64> {
        if self.trees.is_empty() {
            return Err(Error::InvalidOperation(
                "forest has not been fitted".to_string(),
            ));
        }
        match self.kind {
            ForestKind::Regressor => {
                let sum: f64 = self.trees.iter().map(|t| t.predict_one(row)).sum();
                Ok(sum / self.trees.len() as f64)
            }
            ForestKind::Classifier => {
                let mut votes = vec![0usize; self.n_classes.max(1)];
                for tree in &self.trees {
                    let class = tree.predict_one(row) as usize;
                    if class < votes.len() {
                        votes[class] += 1;
                    }
                }
                let winner = votes
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(&a.0)))
                    .map(|(class, _)| class)
                    .unwrap_or(0);
                Ok(winner as f64)
            }
        }
    }

    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.iter().map(|row| self.predict_one(row)).collect()
    }
}

fn fit_tree(
    x: &[Vec<f64>],
    y: &[f64],
    indices: Vec<usize>,
    params: &TreeParams,
    rng: &mut StdRng,
) -> DecisionTree {
    let mut nodes = Vec::new();
    build_node(x, y, indices, 0, params, rng, &mut nodes);
    DecisionTree { nodes }
}

fn build_node(
    x: &[Vec<f64>],
    y: &[f64],
    indices: Vec<usize>,
    depth: usize,
    params: &TreeParams,
    rng: &mut StdRng,
    nodes: &mut Vec<Node>,
) -> usize {
    let stop = depth >= params.max_depth
        || indices.len() < MIN_SAMPLES_SPLIT
        || is_pure(y, &indices);
    if !stop {
        if let Some((feature, threshold)) = best_split(x, y, &indices, params, rng) {
            let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .copied()
                .partition(|&i| x[i][feature] <= threshold);
            if !left_idx.is_empty() && !right_idx.is_empty() {
                let slot = nodes.len();
                nodes.push(Node::Leaf { value: 0.0 });
                let left = build_node(x, y, left_idx, depth + 1, params, rng, nodes);
                let right = build_node(x, y, right_idx, depth + 1, params, rng, nodes);
                nodes[slot] = Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                };
                return slot;
            }
        }
    }
    let value = leaf_value(y, &indices, params);
    nodes.push(Node::Leaf { value });
    nodes.len() - 1
}

fn is_pure(y: &[f64], indices: &[usize]) -> bool {
    indices
        .windows(2)
        .all(|pair| y[pair[0]] == y[pair[1]])
}

fn leaf_value(y: &[f64], indices: &[usize], params: &TreeParams) -> f64 {
    match params.kind {
        ForestKind::Regressor => {
            if indices.is_empty() {
                0.0
            } else {
                indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
            }
        }
        ForestKind::Classifier => {
            let mut counts = vec![0usize; params.n_classes.max(1)];
            for &i in indices {
                let class = y[i] as usize;
                if class < counts.len() {
                    counts[class] += 1;
                }
            }
            counts
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(&a.0)))
                .map(|(class, _)| class)
                .unwrap_or(0) as f64
        }
    }
}

/// Best (feature, threshold) over a random feature subset, or `None` when
/// no split improves on the node's impurity.
fn best_split(
    x: &[Vec<f64>],
    y: &[f64],
    indices: &[usize],
    params: &TreeParams,
    rng: &mut StdRng,
) -> Option<(usize, f64)> {
    let features = sample_features(params.n_features, params.max_features, rng);
    let parent = node_impurity(y, indices, params);

    let mut best: Option<(usize, f64, f64)> = None;
    for feature in features {
        let mut ordered: Vec<(f64, f64)> = indices.iter().map(|&i| (x[i][feature], y[i])).collect();
        ordered.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        match params.kind {
            ForestKind::Classifier => {
                let n = ordered.len();
                let mut left = vec![0usize; params.n_classes.max(1)];
                let mut right = vec![0usize; params.n_classes.max(1)];
                for &(_, label) in &ordered {
                    let class = label as usize;
                    if class < right.len() {
                        right[class] += 1;
                    }
                }
                let mut n_left = 0usize;
                for k in 0..n - 1 {
                    let class = ordered[k].1 as usize;
                    if class < left.len() {
                        left[class] += 1;
                        right[class] -= 1;
                    }
                    n_left += 1;
                    if ordered[k].0 >= ordered[k + 1].0 {
                        continue;
                    }
                    let n_right = n - n_left;
                    let impurity = (n_left as f64 * gini(&left, n_left)
                        + n_right as f64 * gini(&right, n_right))
                        / n as f64;
                    if impurity + 1e-12 < best.map(|b| b.2).unwrap_or(parent) {
                        let threshold = (ordered[k].0 + ordered[k + 1].0) / 2.0;
                        best = Some((feature, threshold, impurity));
                    }
                }
            }
            ForestKind::Regressor => {
                let n = ordered.len();
                let total_sum: f64 = ordered.iter().map(|&(_, t)| t).sum();
                let total_sq: f64 = ordered.iter().map(|&(_, t)| t * t).sum();
                let mut left_sum = 0.0;
                let mut left_sq = 0.0;
                for k in 0..n - 1 {
                    left_sum += ordered[k].1;
                    left_sq += ordered[k].1 * ordered[k].1;
                    let n_left = (k + 1) as f64;
                    if ordered[k].0 >= ordered[k + 1].0 {
                        continue;
                    }
                    let n_right = n as f64 - n_left;
                    let right_sum = total_sum - left_sum;
                    let right_sq = total_sq - left_sq;
                    let var_left = left_sq / n_left - (left_sum / n_left).powi(2);
                    let var_right = right_sq / n_right - (right_sum / n_right).powi(2);
                    let impurity = (n_left * var_left + n_right * var_right) / n as f64;
                    if impurity + 1e-12 < best.map(|b| b.2).unwrap_or(parent) {
                        let threshold = (ordered[k].0 + ordered[k + 1].0) / 2.0;
                        best = Some((feature, threshold, impurity));
                    }
                }
            }
        }
    }
    best.map(|(feature, threshold, _)| (feature, threshold))
}

fn node_impurity(y: &[f64], indices: &[usize], params: &TreeParams) -> f64 {
    match params.kind {
        ForestKind::Classifier => {
            let mut counts = vec![0usize; params.n_classes.max(1)];
            for &i in indices {
                let class = y[i] as usize;
                if class < counts.len() {
                    counts[class] += 1;
                }
            }
            gini(&counts, indices.len())
        }
        ForestKind::Regressor => {
            let n = indices.len() as f64;
            let sum: f64 = indices.iter().map(|&i| y[i]).sum();
            let sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
            sq / n - (sum / n).powi(2)
        }
    }
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

fn sample_features(n_features: usize, max_features: usize, rng: &mut StdRng) -> Vec<usize> {
    if max_features >= n_features {
        return (0..n_features).collect();
    }
    rand::seq::index::sample(rng, n_features, max_features).into_vec()
}
