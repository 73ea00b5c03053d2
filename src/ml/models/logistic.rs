//! Multinomial logistic regression backed by `linfa-logistic`.

use linfa::Dataset;
use linfa::traits::{Fit, Predict};
use linfa_logistic::{MultiFittedLogisticRegression, MultiLogisticRegression};
use log::debug;
use serde::{Deserialize, Serialize};

use super::{ClassIndex, check_training_data, not_fitted};
use crate::document::Label;
use crate::error::{PaperclassError, Result};
use crate::features::matrix::FeatureMatrix;
use crate::ml::estimator::Estimator;

/// L2-regularized logistic regression over all classes at once.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogisticRegression {
    max_iterations: u64,
    alpha: f64,
    classes: ClassIndex,
    model: Option<MultiFittedLogisticRegression<f64, usize>>,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(100, 1.0)
    }
}

impl LogisticRegression {
    /// Create an unfitted model with the given iteration budget and
    /// regularization strength.
    pub fn new(max_iterations: u64, alpha: f64) -> Self {
        LogisticRegression {
            max_iterations,
            alpha,
            classes: ClassIndex::default(),
            model: None,
        }
    }
}

impl Estimator for LogisticRegression {
    fn fit(&mut self, features: &FeatureMatrix, labels: &[Label]) -> Result<()> {
        check_training_data(features, labels)?;
        let classes = ClassIndex::fit(labels);
        let targets = classes.encode(labels)?;
        let dataset = Dataset::new(features.to_dense(), targets);

        let model = MultiLogisticRegression::default()
            .max_iterations(self.max_iterations)
            .alpha(self.alpha)
            .fit(&dataset)
            .map_err(|e| PaperclassError::model(format!("logistic regression: {e}")))?;

        debug!("Fitted logistic regression over {} classes", classes.len());
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
        "logistic"
    }
}
