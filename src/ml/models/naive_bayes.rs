//! Gaussian naive Bayes backed by `linfa-bayes`.

use linfa::Dataset;
use linfa::traits::{Fit, Predict};
use linfa_bayes::{GaussianNb, GaussianNbParams};
use serde::{Deserialize, Serialize};

use super::{ClassIndex, check_training_data, not_fitted};
use crate::document::Label;
use crate::error::{PaperclassError, Result};
use crate::features::matrix::FeatureMatrix;
use crate::ml::estimator::Estimator;

/// Gaussian naive Bayes. Needs a dense design matrix.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NaiveBayes {
    classes: ClassIndex,
    model: Option<GaussianNb<f64, usize>>,
}

impl Estimator for NaiveBayes {
    fn fit(&mut self, features: &FeatureMatrix, labels: &[Label]) -> Result<()> {
        check_training_data(features, labels)?;
        let classes = ClassIndex::fit(labels);
        let dataset = Dataset::new(features.to_dense(), classes.encode(labels)?);

        let params: GaussianNbParams<f64, usize> = GaussianNb::params();
        let model = params
            .fit(&dataset)
            .map_err(|e| PaperclassError::model(format!("naive Bayes: {e}")))?;

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
        "naive-bayes"
    }
}
