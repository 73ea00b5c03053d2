//! Concrete classification models.
//!
//! Most models wrap a `linfa` algorithm; [`prototype`] and [`neighbors`] are
//! similarity-based models that work directly on sparse rows.

pub mod forest;
pub mod logistic;
pub mod naive_bayes;
pub mod neighbors;
pub mod prototype;
pub mod svm;
pub mod tree;

use clap::ValueEnum;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::document::Label;
use crate::error::{PaperclassError, Result};
use crate::features::matrix::FeatureMatrix;
use crate::ml::estimator::Estimator;

pub use forest::RandomForest;
pub use logistic::LogisticRegression;
pub use naive_bayes::NaiveBayes;
pub use neighbors::NearestNeighbors;
pub use prototype::PrototypeClassifier;
pub use svm::{SvmClassifier, SvmKernel};
pub use tree::DecisionTreeClassifier;

/// Maps arbitrary labels to the dense class indices `linfa` expects.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassIndex {
    labels: Vec<Label>,
}

impl ClassIndex {
    /// Index the distinct labels of a training set, in ascending order.
    pub fn fit(labels: &[Label]) -> Self {
        let mut distinct = labels.to_vec();
        distinct.sort_unstable();
        distinct.dedup();
        ClassIndex { labels: distinct }
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether no class is known.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Known labels, ascending.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Class index of every label.
    pub fn encode(&self, labels: &[Label]) -> Result<Array1<usize>> {
        labels
            .iter()
            .map(|label| {
                self.labels.binary_search(label).map_err(|_| {
                    PaperclassError::model(format!("label {label} was not seen during training"))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Array1::from_vec)
    }

    /// Label of a class index.
    pub fn decode(&self, index: usize) -> Result<Label> {
        self.labels
            .get(index)
            .copied()
            .ok_or_else(|| PaperclassError::model(format!("unknown class index {index}")))
    }
}

/// Checks shared by every `fit` implementation.
pub(crate) fn check_training_data(features: &FeatureMatrix, labels: &[Label]) -> Result<()> {
    if features.nrows() != labels.len() {
        return Err(PaperclassError::model(format!(
            "{} feature rows but {} labels",
            features.nrows(),
            labels.len()
        )));
    }
    if labels.is_empty() {
        return Err(PaperclassError::model("cannot fit a model without training data"));
    }
    Ok(())
}

pub(crate) fn not_fitted(name: &str) -> PaperclassError {
    PaperclassError::model(format!("the {name} model has not been fitted"))
}

/// A sparse row scaled to unit length, columns ascending.
pub(crate) type UnitRow = Vec<(usize, f64)>;

/// Rows of `features`, each scaled to unit length. All-zero rows stay empty.
pub(crate) fn unit_rows(features: &FeatureMatrix) -> Vec<UnitRow> {
    features
        .sparse_rows()
        .into_iter()
        .map(|mut row| {
            let norm = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                row.iter_mut().for_each(|(_, v)| *v /= norm);
            }
            row
        })
        .collect()
}

/// Cosine similarity of two unit rows.
pub(crate) fn cosine(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
    let (mut i, mut j, mut dot) = (0, 0, 0.0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    dot
}

/// The model families available to the classifier harness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum ModelKind {
    /// Multinomial logistic regression.
    #[value(name = "logistic")]
    Logistic,
    /// Gaussian naive Bayes.
    #[value(name = "naive-bayes")]
    NaiveBayes,
    /// CART decision tree.
    #[value(name = "tree")]
    Tree,
    /// Bagged decision trees over random feature subsets.
    #[value(name = "random-forest")]
    RandomForest,
    /// Support vector machine with a linear kernel (binary tasks only).
    #[value(name = "svm-linear")]
    SvmLinear,
    /// Support vector machine with a Gaussian kernel (binary tasks only).
    #[value(name = "svm-rbf")]
    SvmRbf,
    /// Mean cosine similarity to the training documents of each class.
    #[value(name = "prototype")]
    Prototype,
    /// Cosine k-nearest neighbours.
    #[value(name = "knn")]
    Knn,
}

impl ModelKind {
    /// A fresh, unfitted model of this kind with default hyper-parameters.
    pub fn build(self) -> Model {
        match self {
            ModelKind::Logistic => Model::Logistic(LogisticRegression::default()),
            ModelKind::NaiveBayes => Model::NaiveBayes(NaiveBayes::default()),
            ModelKind::Tree => Model::DecisionTree(DecisionTreeClassifier::default()),
            ModelKind::RandomForest => Model::RandomForest(RandomForest::default()),
            ModelKind::SvmLinear => Model::Svm(SvmClassifier::new(SvmKernel::Linear)),
            ModelKind::SvmRbf => Model::Svm(SvmClassifier::new(SvmKernel::Gaussian { eps: 30.0 })),
            ModelKind::Prototype => Model::Prototype(PrototypeClassifier::default()),
            ModelKind::Knn => Model::Knn(NearestNeighbors::default()),
        }
    }

    /// Every model kind.
    pub fn all() -> &'static [ModelKind] {
        ModelKind::value_variants()
    }

    /// Name as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Logistic => "logistic",
            ModelKind::NaiveBayes => "naive-bayes",
            ModelKind::Tree => "tree",
            ModelKind::RandomForest => "random-forest",
            ModelKind::SvmLinear => "svm-linear",
            ModelKind::SvmRbf => "svm-rbf",
            ModelKind::Prototype => "prototype",
            ModelKind::Knn => "knn",
        }
    }
}

/// Any of the built-in models. This is the estimator type saved with a
/// trained classifier.
#[derive(Debug, Serialize, Deserialize)]
pub enum Model {
    Logistic(LogisticRegression),
    NaiveBayes(NaiveBayes),
    DecisionTree(DecisionTreeClassifier),
    RandomForest(RandomForest),
    Svm(SvmClassifier),
    Prototype(PrototypeClassifier),
    Knn(NearestNeighbors),
}

impl Model {
    fn inner(&self) -> &dyn Estimator {
        match self {
            Model::Logistic(m) => m,
            Model::NaiveBayes(m) => m,
            Model::DecisionTree(m) => m,
            Model::RandomForest(m) => m,
            Model::Svm(m) => m,
            Model::Prototype(m) => m,
            Model::Knn(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Estimator {
        match self {
            Model::Logistic(m) => m,
            Model::NaiveBayes(m) => m,
            Model::DecisionTree(m) => m,
            Model::RandomForest(m) => m,
            Model::Svm(m) => m,
            Model::Prototype(m) => m,
            Model::Knn(m) => m,
        }
    }
}

impl Estimator for Model {
    fn fit(&mut self, features: &FeatureMatrix, labels: &[Label]) -> Result<()> {
        self.inner_mut().fit(features, labels)
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<Label>> {
        self.inner().predict(features)
    }

    fn requires_dense(&self) -> bool {
        self.inner().requires_dense()
    }

    fn name(&self) -> &str {
        self.inner().name()
    }
}

impl From<ModelKind> for Model {
    fn from(kind: ModelKind) -> Self {
        kind.build()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::document::Label;
    use crate::features::matrix::{FeatureMatrix, SparseMatrix, SparseRows};

    /// Two well separated classes: label 1 uses columns 0-1, label 0 columns 2-3.
    pub fn separable() -> (FeatureMatrix, Vec<Label>) {
        let rows = vec![
            vec![(0, 3.0), (1, 1.0)],
            vec![(0, 2.0), (1, 2.0)],
            vec![(0, 4.0), (1, 1.0), (3, 0.5)],
            vec![(2, 3.0), (3, 1.0)],
            vec![(2, 2.0), (3, 2.0)],
            vec![(2, 4.0), (3, 1.0), (0, 0.5)],
        ];
        let matrix = SparseMatrix::from_entries(4, rows).unwrap();
        (FeatureMatrix::Sparse(matrix), vec![1, 1, 1, 0, 0, 0])
    }

    pub fn queries() -> FeatureMatrix {
        FeatureMatrix::Sparse(
            SparseMatrix::from_entries(4, vec![vec![(0, 5.0), (1, 1.0)], vec![(2, 3.0), (3, 1.0)]])
                .unwrap(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{queries, separable};
    use super::*;

    #[test]
    fn test_class_index() {
        let index = ClassIndex::fit(&[5, 1, 5, 3]);
        assert_eq!(index.labels(), &[1, 3, 5]);
        assert_eq!(index.encode(&[5, 1]).unwrap().to_vec(), vec![2, 0]);
        assert_eq!(index.decode(1).unwrap(), 3);
        assert!(index.encode(&[4]).is_err());
        assert!(index.decode(3).is_err());
    }

    #[test]
    fn test_every_model_separates_easy_data() {
        let (features, labels) = separable();
        for &kind in ModelKind::all() {
            let mut model = kind.build();
            let input = if model.requires_dense() {
                features.clone().into_dense()
            } else {
                features.clone()
            };
            model.fit(&input, &labels).unwrap();

            let queries = if model.requires_dense() {
                queries().into_dense()
            } else {
                queries()
            };
            assert_eq!(model.predict(&queries).unwrap(), vec![1, 0], "{}", kind.as_str());
        }
    }

    #[test]
    fn test_predict_before_fit() {
        for &kind in ModelKind::all() {
            let model = kind.build();
            assert!(model.predict(&queries().into_dense()).is_err(), "{}", kind.as_str());
        }
    }
}
