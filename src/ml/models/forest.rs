//! Random forests of `linfa-trees` decision trees.
//!
//! Each tree is grown on a bootstrap sample of the training rows and a random
//! subset of `sqrt(n_features)` columns. Predictions are majority votes.

use linfa::Dataset;
use linfa::traits::{Fit, Predict};
use linfa_trees::DecisionTree;
use log::debug;
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{ClassIndex, check_training_data, not_fitted};
use crate::document::Label;
use crate::error::{PaperclassError, Result};
use crate::features::matrix::FeatureMatrix;
use crate::ml::estimator::Estimator;

/// Default number of trees.
pub const DEFAULT_TREES: usize = 50;

/// Default seed for bootstrap sampling.
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Serialize, Deserialize)]
struct ForestTree {
    columns: Vec<usize>,
    tree: DecisionTree<f64, usize>,
}

/// Bagged decision trees over random feature subsets.
#[derive(Debug, Serialize, Deserialize)]
pub struct RandomForest {
    n_trees: usize,
    seed: u64,
    classes: ClassIndex,
    trees: Vec<ForestTree>,
}

impl Default for RandomForest {
    fn default() -> Self {
        RandomForest {
            n_trees: DEFAULT_TREES,
            seed: DEFAULT_SEED,
            classes: ClassIndex::default(),
            trees: Vec::new(),
        }
    }
}

impl RandomForest {
    /// Create an unfitted forest of `n_trees` trees.
    pub fn new(n_trees: usize, seed: u64) -> Result<Self> {
        if n_trees == 0 {
            return Err(PaperclassError::configuration(
                "a random forest needs at least one tree",
            ));
        }
        Ok(RandomForest {
            n_trees,
            seed,
            ..RandomForest::default()
        })
    }

    /// Number of fitted trees.
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Whether the forest has been fitted.
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

fn subspace_size(n_features: usize) -> usize {
    ((n_features as f64).sqrt().ceil() as usize).clamp(1, n_features.max(1))
}

impl Estimator for RandomForest {
    fn fit(&mut self, features: &FeatureMatrix, labels: &[Label]) -> Result<()> {
        check_training_data(features, labels)?;
        let classes = ClassIndex::fit(labels);
        let targets = classes.encode(labels)?;
        let records = features.to_dense();
        let (n_rows, n_features) = records.dim();
        let width = subspace_size(n_features);

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(self.n_trees);
        for _ in 0..self.n_trees {
            let rows: Vec<usize> = (0..n_rows).map(|_| rng.random_range(0..n_rows)).collect();
            let mut columns = index::sample(&mut rng, n_features.max(1), width).into_vec();
            columns.retain(|&c| c < n_features);
            columns.sort_unstable();

            let sample = records.select(Axis(0), &rows).select(Axis(1), &columns);
            let dataset = Dataset::new(sample, targets.select(Axis(0), &rows));
            let tree = DecisionTree::params()
                .fit(&dataset)
                .map_err(|e| PaperclassError::model(format!("random forest: {e}")))?;
            trees.push(ForestTree { columns, tree });
        }
        debug!("Grew {} trees on {width} of {n_features} features each", trees.len());

        self.classes = classes;
        self.trees = trees;
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<Label>> {
        if self.trees.is_empty() {
            return Err(not_fitted(self.name()));
        }
        let records: Array2<f64> = features.to_dense();
        let mut votes = vec![vec![0usize; self.classes.len()]; records.nrows()];
        for ForestTree { columns, tree } in &self.trees {
            let predicted = tree.predict(&records.select(Axis(1), columns));
            for (row, &class) in predicted.iter().enumerate() {
                if let Some(count) = votes[row].get_mut(class) {
                    *count += 1;
                }
            }
        }

        votes
            .iter()
            .map(|counts| {
                // ties go to the lower class index
                let best = counts
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
                    .map_or(0, |(class, _)| class);
                self.classes.decode(best)
            })
            .collect()
    }

    fn requires_dense(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "random-forest"
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{queries, separable};
    use super::*;

    #[test]
    fn test_forest_separates_classes() {
        let (features, labels) = separable();
        let mut forest = RandomForest::new(25, 7).unwrap();
        forest.fit(&features, &labels).unwrap();
        assert_eq!(forest.len(), 25);
        assert_eq!(forest.predict(&features).unwrap().len(), labels.len());
        assert_eq!(forest.predict(&queries()).unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (features, labels) = separable();
        let mut a = RandomForest::new(5, 3).unwrap();
        let mut b = RandomForest::new(5, 3).unwrap();
        a.fit(&features, &labels).unwrap();
        b.fit(&features, &labels).unwrap();
        let columns = |f: &RandomForest| f.trees.iter().map(|t| t.columns.clone()).collect::<Vec<_>>();
        assert_eq!(columns(&a), columns(&b));
    }

    #[test]
    fn test_invalid_and_unfitted() {
        assert!(RandomForest::new(0, 1).is_err());
        let (features, _) = separable();
        assert!(RandomForest::default().predict(&features).is_err());
    }
}
