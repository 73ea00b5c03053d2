//! Support vector machines backed by `linfa-svm`.

use linfa::Dataset;
use linfa::traits::{Fit, Predict};
use linfa_svm::Svm;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::{ClassIndex, check_training_data, not_fitted};
use crate::document::Label;
use crate::error::{PaperclassError, Result};
use crate::features::matrix::FeatureMatrix;
use crate::ml::estimator::Estimator;

/// Kernel of an [`SvmClassifier`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SvmKernel {
    /// Plain dot product.
    Linear,
    /// `exp(-|x - y|^2 / eps)`.
    Gaussian { eps: f64 },
}

/// A two-class support vector machine.
///
/// The larger of the two training labels is the positive side of the
/// separating hyperplane.
#[derive(Debug, Serialize, Deserialize)]
pub struct SvmClassifier {
    kernel: SvmKernel,
    classes: ClassIndex,
    model: Option<Svm<f64, bool>>,
}

impl SvmClassifier {
    /// Create an unfitted SVM with the given kernel.
    pub fn new(kernel: SvmKernel) -> Self {
        SvmClassifier {
            kernel,
            classes: ClassIndex::default(),
            model: None,
        }
    }
}

impl Estimator for SvmClassifier {
    fn fit(&mut self, features: &FeatureMatrix, labels: &[Label]) -> Result<()> {
        check_training_data(features, labels)?;
        let classes = ClassIndex::fit(labels);
        if classes.len() != 2 {
            return Err(PaperclassError::model(format!(
                "the SVM separates exactly two classes, the training set has {}",
                classes.len()
            )));
        }
        let targets: Array1<bool> = classes.encode(labels)?.mapv(|c| c == 1);
        let dataset = Dataset::new(features.to_dense(), targets);

        let params = Svm::<f64, bool>::params();
        let params = match self.kernel {
            SvmKernel::Linear => params.linear_kernel(),
            SvmKernel::Gaussian { eps } => params.gaussian_kernel(eps),
        };
        let model = params
            .fit(&dataset)
            .map_err(|e| PaperclassError::model(format!("SVM: {e}")))?;

        self.classes = classes;
        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<Label>> {
        let model = self.model.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        let predicted: Array1<bool> = model.predict(&features.to_dense());
        predicted
            .iter()
            .map(|&positive| self.classes.decode(usize::from(positive)))
            .collect()
    }

    fn requires_dense(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        match self.kernel {
            SvmKernel::Linear => "svm-linear",
            SvmKernel::Gaussian { .. } => "svm-rbf",
        }
    }
}
