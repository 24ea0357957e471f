//! Random forest regression.
//!
//! A bagged ensemble of [`RegressionTree`]s. Each tree is grown on a bootstrap
//! sample with its own seeded RNG, so a fixed [`ForestConfig::seed`] makes
//! fitting reproducible bit for bit.

mod tree;

pub use tree::{RegressionTree, TreeNode, TreeParams};

use crate::error::{PlotFitError, Result};
use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Random forest configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees.
    pub n_trees: usize,
    /// Candidate features drawn at each split.
    pub max_features: usize,
    /// Maximum tree depth (None for unlimited).
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node.
    pub min_samples_split: usize,
    /// Minimum samples in each leaf.
    pub min_samples_leaf: usize,
    /// Grow each tree on a bootstrap sample instead of the full data.
    pub bootstrap: bool,
    /// Random seed.
    pub seed: u64,
    /// Whether to print the RMSE report.
    pub verbose: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_features: 3,
            max_depth: Some(6),
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            seed: 1234,
            verbose: true,
        }
    }
}

impl ForestConfig {
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Check the configuration against a dataset with `n_features` columns.
    pub fn validate(&self, n_features: usize) -> Result<()> {
        if self.n_trees == 0 {
            return Err(PlotFitError::InvalidParameter(
                "n_trees must be at least 1".to_string(),
            ));
        }
        if self.max_depth == Some(0) {
            return Err(PlotFitError::InvalidParameter(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.max_features == 0 || self.max_features > n_features {
            return Err(PlotFitError::InvalidParameter(format!(
                "max_features must be in 1..={}, got {}",
                n_features, self.max_features
            )));
        }
        if self.min_samples_split < 2 {
            return Err(PlotFitError::InvalidParameter(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(PlotFitError::InvalidParameter(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            max_features: self.max_features,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
        }
    }
}

/// Random forest regressor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
    n_features: usize,
    feature_importances: Option<Array1<f64>>,
}

impl RandomForestRegressor {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_features: 0,
            feature_importances: None,
        }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn is_trained(&self) -> bool {
        !self.trees.is_empty()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// Fit the forest to training data.
    pub fn fit(&mut self, x: &ArrayView2<f64>, y: &ArrayView1<f64>) -> Result<&mut Self> {
        let (n_samples, n_features) = x.dim();

        if n_samples != y.len() {
            return Err(PlotFitError::shape(
                format!("y length = {}", n_samples),
                format!("y length = {}", y.len()),
            ));
        }
        if n_samples == 0 {
            return Err(PlotFitError::InvalidInput(
                "training set has no samples".to_string(),
            ));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(PlotFitError::InvalidInput(
                "training data contains NaN or infinite values".to_string(),
            ));
        }
        self.config.validate(n_features)?;

        self.n_features = n_features;
        let params = self.config.tree_params();

        let mut trees = Vec::with_capacity(self.config.n_trees);
        for tree_idx in 0..self.config.n_trees {
            let seed = self.config.seed.wrapping_add(tree_idx as u64);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);

            let sample_indices: Vec<usize> = if self.config.bootstrap {
                (0..n_samples)
                    .map(|_| rng.random_range(0..n_samples))
                    .collect()
            } else {
                (0..n_samples).collect()
            };

            let mut tree = RegressionTree::new(params);
            tree.fit(x, y, &sample_indices, &mut rng)?;
            trees.push(tree);
        }

        tracing::debug!(
            n_trees = trees.len(),
            n_samples,
            n_features,
            seed = self.config.seed,
            "fitted random forest"
        );

        self.trees = trees;
        self.compute_feature_importances();

        Ok(self)
    }

    fn compute_feature_importances(&mut self) {
        let mut total = vec![0.0; self.n_features];

        // Normalise per tree first so every tree carries equal weight.
        for tree in &self.trees {
            let raw = tree.raw_importances();
            let tree_total: f64 = raw.iter().sum();
            if tree_total > 0.0 {
                for (acc, &v) in total.iter_mut().zip(raw) {
                    *acc += v / tree_total;
                }
            }
        }

        let sum: f64 = total.iter().sum();
        if sum > 0.0 {
            for v in &mut total {
                *v /= sum;
            }
        }

        self.feature_importances = Some(Array1::from_vec(total));
    }

    /// Mean decrease in impurity per feature, summing to 1.
    ///
    /// All zeros when no tree could split.
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Predict by averaging the trees.
    pub fn predict(&self, x: &ArrayView2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(PlotFitError::ModelNotTrained);
        }
        if x.ncols() != self.n_features {
            return Err(PlotFitError::shape(
                format!("{} features", self.n_features),
                format!("{} features", x.ncols()),
            ));
        }

        let mut sum = Array1::<f64>::zeros(x.nrows());
        for tree in &self.trees {
            sum += &tree.predict(x)?;
        }
        Ok(sum / self.trees.len() as f64)
    }
}
