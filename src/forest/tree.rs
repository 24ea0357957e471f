//! CART regression tree.

use crate::error::{PlotFitError, Result};
use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node holding the mean target of its samples.
    Leaf { value: f64, n_samples: usize },
    /// Internal node; samples with `x[feature_idx] <= threshold` go left.
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
    },
}

impl TreeNode {
    fn predict_row(&self, row: &ArrayView1<f64>) -> f64 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    node = if row[*feature_idx] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth; `None` grows until leaves are pure.
    pub max_depth: Option<usize>,
    /// Number of features drawn as split candidates at each node.
    pub max_features: usize,
    /// Minimum samples a node needs before it may split.
    pub min_samples_split: usize,
    /// Minimum samples each child of a split must keep.
    pub min_samples_leaf: usize,
}

/// Best split found on one feature.
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    /// Weighted impurity decrease, `n * mse_parent - (n_l * mse_l + n_r * mse_r)`.
    gain: f64,
}

/// Regression tree grown on (possibly repeated) sample indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    root: Option<TreeNode>,
    params: TreeParams,
    n_features: usize,
    importances: Vec<f64>,
}

impl RegressionTree {
    pub fn new(params: TreeParams) -> Self {
        Self {
            root: None,
            params,
            n_features: 0,
            importances: Vec::new(),
        }
    }

    /// Grow the tree on the rows of `x` listed in `indices`.
    ///
    /// Rows may appear more than once, which is how bootstrap samples are
    /// passed in without copying the data.
    pub fn fit<R: Rng + ?Sized>(
        &mut self,
        x: &ArrayView2<f64>,
        y: &ArrayView1<f64>,
        indices: &[usize],
        rng: &mut R,
    ) -> Result<&mut Self> {
        if x.nrows() != y.len() {
            return Err(PlotFitError::shape(
                format!("y length = {}", x.nrows()),
                format!("y length = {}", y.len()),
            ));
        }
        if indices.is_empty() {
            return Err(PlotFitError::InvalidInput(
                "cannot grow a tree on zero samples".to_string(),
            ));
        }

        self.n_features = x.ncols();
        let mut importances = vec![0.0; self.n_features];
        let mut indices = indices.to_vec();
        let root = self.build(x, y, &mut indices, 0, rng, &mut importances);

        self.root = Some(root);
        self.importances = importances;
        Ok(self)
    }

    fn build<R: Rng + ?Sized>(
        &self,
        x: &ArrayView2<f64>,
        y: &ArrayView1<f64>,
        indices: &mut [usize],
        depth: usize,
        rng: &mut R,
        importances: &mut [f64],
    ) -> TreeNode {
        let n_samples = indices.len();
        let value = indices.iter().map(|&i| y[i]).sum::<f64>() / n_samples as f64;
        let leaf = TreeNode::Leaf { value, n_samples };

        let should_stop = self.params.max_depth.is_some_and(|d| depth >= d)
            || n_samples < self.params.min_samples_split
            || n_samples < 2 * self.params.min_samples_leaf
            || is_constant(y, indices);
        if should_stop {
            return leaf;
        }

        let Some(split) = self.find_best_split(x, y, indices, rng) else {
            return leaf;
        };

        importances[split.feature_idx] += split.gain;

        let n_left = partition(indices, |i| x[[i, split.feature_idx]] <= split.threshold);
        let (left_idx, right_idx) = indices.split_at_mut(n_left);
        let left = self.build(x, y, left_idx, depth + 1, rng, importances);
        let right = self.build(x, y, right_idx, depth + 1, rng, importances);

        TreeNode::Split {
            feature_idx: split.feature_idx,
            threshold: split.threshold,
            left: Box::new(left),
            right: Box::new(right),
            n_samples,
        }
    }

    /// Visit features in random order and keep the best split among the first
    /// `max_features`. If none of those can split the node, keep visiting
    /// until one can.
    fn find_best_split<R: Rng + ?Sized>(
        &self,
        x: &ArrayView2<f64>,
        y: &ArrayView1<f64>,
        indices: &[usize],
        rng: &mut R,
    ) -> Option<SplitCandidate> {
        let mut features: Vec<usize> = (0..self.n_features).collect();
        features.shuffle(rng);

        let mut best: Option<SplitCandidate> = None;
        for (visited, &feature_idx) in features.iter().enumerate() {
            if visited >= self.params.max_features && best.is_some() {
                break;
            }
            if let Some(candidate) = self.best_split_on(x, y, indices, feature_idx) {
                if best.is_none_or(|b| candidate.gain > b.gain) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    fn best_split_on(
        &self,
        x: &ArrayView2<f64>,
        y: &ArrayView1<f64>,
        indices: &[usize],
        feature_idx: usize,
    ) -> Option<SplitCandidate> {
        let mut pairs: Vec<(f64, f64)> = indices
            .iter()
            .map(|&i| (x[[i, feature_idx]], y[i]))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n = pairs.len();
        let total_sum: f64 = pairs.iter().map(|p| p.1).sum();
        let parent_proxy = total_sum * total_sum / n as f64;
        let min_leaf = self.params.min_samples_leaf;

        // Maximising sum_l^2 / n_l + sum_r^2 / n_r minimises the weighted
        // child MSE; the difference to the parent term is the gain.
        let mut best: Option<(f64, f64)> = None;
        let mut left_sum = 0.0;
        for i in 0..n - 1 {
            left_sum += pairs[i].1;
            let n_left = i + 1;
            let n_right = n - n_left;
            if n_left < min_leaf {
                continue;
            }
            if n_right < min_leaf {
                break;
            }
            let (lo, hi) = (pairs[i].0, pairs[i + 1].0);
            if lo >= hi {
                continue;
            }

            let right_sum = total_sum - left_sum;
            let proxy = left_sum * left_sum / n_left as f64 + right_sum * right_sum / n_right as f64;
            let gain = proxy - parent_proxy;
            if gain > 0.0 && best.is_none_or(|(g, _)| gain > g) {
                let mid = lo + (hi - lo) / 2.0;
                let threshold = if mid >= hi { lo } else { mid };
                best = Some((gain, threshold));
            }
        }

        best.map(|(gain, threshold)| SplitCandidate {
            feature_idx,
            threshold,
            gain,
        })
    }

    pub fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    /// Depth of the grown tree (a single leaf has depth 0).
    pub fn depth(&self) -> Option<usize> {
        self.root.as_ref().map(TreeNode::depth)
    }

    /// Unnormalised impurity decrease accumulated per feature.
    pub fn raw_importances(&self) -> &[f64] {
        &self.importances
    }

    pub fn predict(&self, x: &ArrayView2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(PlotFitError::ModelNotTrained)?;
        if x.ncols() != self.n_features {
            return Err(PlotFitError::shape(
                format!("{} features", self.n_features),
                format!("{} features", x.ncols()),
            ));
        }
        Ok(x.rows()
            .into_iter()
            .map(|row| root.predict_row(&row))
            .collect())
    }
}

fn is_constant(y: &ArrayView1<f64>, indices: &[usize]) -> bool {
    let first = y[indices[0]];
    indices.iter().all(|&i| y[i] == first)
}

/// Reorder `indices` so that those satisfying `pred` come first; returns how
/// many do. Relative order within each side is kept.
fn partition(indices: &mut [usize], pred: impl Fn(usize) -> bool) -> usize {
    let (left, right): (Vec<usize>, Vec<usize>) = indices.iter().copied().partition(|&i| pred(i));
    let n_left = left.len();
    for (slot, i) in indices.iter_mut().zip(left.into_iter().chain(right)) {
        *slot = i;
    }
    n_left
}
