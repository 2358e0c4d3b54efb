//! Random-forest regression.
//!
//! A forest is a bag of CART regression trees, each grown on a bootstrap
//! sample of the training rows; predictions are the mean of the per-tree
//! predictions. Every tree draws its sample from its own seeded RNG
//! stream derived from the forest seed, so the fitted model is identical
//! for a fixed seed no matter how the work is scheduled across threads.

mod tree;

pub use tree::{GrowthLimits, Node, Tree};

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};

use crate::features::FeatureMatrix;

// =============================================================================
// Parameters
// =============================================================================

/// Parameters for random-forest training.
///
/// Use struct construction with `..Default::default()` for convenient
/// configuration.
#[derive(Debug, Clone)]
pub struct RandomForestParams {
    /// Number of trees in the forest.
    pub n_trees: u32,
    /// Maximum tree depth; 0 means unlimited.
    pub max_depth: u32,
    /// Minimum number of rows required to split a node.
    pub min_samples_split: u32,
    /// Minimum number of rows each child of a split must keep.
    pub min_samples_leaf: u32,
    /// Draw a bootstrap sample per tree. With `false` every tree sees the
    /// full training set.
    pub bootstrap: bool,
    /// Number of threads for tree fitting.
    ///
    /// - `0`: use rayon's global thread pool (default, all cores)
    /// - `1`: sequential execution
    /// - `n > 1`: a dedicated pool with up to `n` threads
    pub n_threads: usize,
    /// Random seed.
    pub seed: u64,
}

impl Default for RandomForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 0,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            n_threads: 0,
            seed: 42,
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Training validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FitError {
    /// The training matrix has no rows.
    #[error("training set has no rows")]
    EmptyDataset,

    /// Targets and feature rows disagree in length.
    #[error("number of targets ({targets}) does not match number of rows ({rows})")]
    TargetLenMismatch { rows: usize, targets: usize },
}

// =============================================================================
// RandomForest
// =============================================================================

/// A trained random-forest regressor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<Tree>,
    n_features: u32,
}

impl RandomForest {
    /// Fit a forest on a feature matrix and target vector.
    ///
    /// # Panics
    /// Panics if `params.n_trees` is zero.
    pub fn fit(
        x: &FeatureMatrix,
        targets: &[f32],
        params: &RandomForestParams,
    ) -> Result<Self, FitError> {
        assert!(params.n_trees > 0, "n_trees must be positive");

        let n_rows = x.n_rows();
        if n_rows == 0 {
            return Err(FitError::EmptyDataset);
        }
        if targets.len() != n_rows {
            return Err(FitError::TargetLenMismatch {
                rows: n_rows,
                targets: targets.len(),
            });
        }

        // One independent RNG stream per tree, all derived from the forest
        // seed up front: the fitted forest does not depend on scheduling.
        let mut seed_rng = Xoshiro256PlusPlus::seed_from_u64(params.seed);
        let tree_seeds: Vec<u64> = (0..params.n_trees).map(|_| seed_rng.gen()).collect();

        let limits = GrowthLimits {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            min_samples_leaf: params.min_samples_leaf,
        };

        let fit_one = |&tree_seed: &u64| {
            let mut rows: Vec<u32> = if params.bootstrap {
                let mut rng = Xoshiro256PlusPlus::seed_from_u64(tree_seed);
                (0..n_rows)
                    .map(|_| rng.gen_range(0..n_rows as u32))
                    .collect()
            } else {
                (0..n_rows as u32).collect()
            };
            Tree::fit(x, targets, &mut rows, &limits)
        };

        let trees: Vec<Tree> = match params.n_threads {
            1 => tree_seeds.iter().map(fit_one).collect(),
            0 => tree_seeds.par_iter().map(fit_one).collect(),
            n => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .expect("Failed to create thread pool");
                pool.install(|| tree_seeds.par_iter().map(fit_one).collect())
            }
        };

        Ok(Self {
            trees,
            n_features: x.n_cols() as u32,
        })
    }

    /// Predict the target for one feature row (mean over trees).
    pub fn predict_row(&self, row: &[f32]) -> f32 {
        debug_assert_eq!(row.len(), self.n_features as usize);
        let sum: f64 = self.trees.iter().map(|t| t.predict_row(row) as f64).sum();
        (sum / self.trees.len() as f64) as f32
    }

    /// Predict targets for every row of a matrix, in row order.
    pub fn predict(&self, x: &FeatureMatrix) -> Vec<f32> {
        (0..x.n_rows()).map(|r| self.predict_row(x.row(r))).collect()
    }

    /// Number of trees.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Number of features the forest was trained on.
    pub fn n_features(&self) -> u32 {
        self.n_features
    }
}

// =============================================================================
// Tests
// =============================================================================
