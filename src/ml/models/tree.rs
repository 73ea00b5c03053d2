//! CART decision trees backed by `linfa-trees`.

use linfa::Dataset;
use linfa::traits::{Fit, Predict};
use linfa_trees::DecisionTree;
use serde::{Deserialize, Serialize};

use super::{ClassIndex, check_training_data, not_fitted};
use crate::document::Label;
use crate::error::{PaperclassError, Result};
use crate::features::matrix::FeatureMatrix;
use crate::ml::estimator::Estimator;

/// A decision tree split on Gini impurity.
#[derive(Debug, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    max_depth: Option<usize>,
    classes: ClassIndex,
    model: Option<DecisionTree<f64, usize>>,
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        Self::new(None)
    }
}

impl DecisionTreeClassifier {
    /// Create an unfitted tree, optionally limited in depth.
    pub fn new(max_depth: Option<usize>) -> Self {
        DecisionTreeClassifier {
            max_depth,
            classes: ClassIndex::default(),
            model: None,
        }
    }
}

impl Estimator for DecisionTreeClassifier {
    fn fit(&mut self, features: &FeatureMatrix, labels: &[Label]) -> Result<()> {
        check_training_data(features, labels)?;
        let classes = ClassIndex::fit(labels);
        let dataset = Dataset::new(features.to_dense(), classes.encode(labels)?);

        let model = DecisionTree::params()
            .max_depth(self.max_depth)
            .fit(&dataset)
            .map_err(|e| PaperclassError::model(format!("decision tree: {e}")))?;

        self.classes = classes;
        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<Label>> {
        let model = self.model.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        let predicted = model.predict(&features.to_dense());
        predicted.iter().map(|&c| self.classes.decode(c)).collect()
    }

    fn requires_dense(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "tree"
    }
}
