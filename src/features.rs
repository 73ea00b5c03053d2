//! Feature extraction: vocabularies, vectorizers, feature matrices and
//! chi-squared feature selection.

pub mod matrix;
pub mod selection;
pub mod vectorizer;
pub mod vocabulary;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::features::vectorizer::VectorizerConfig;

pub use matrix::{FeatureMatrix, SparseMatrix, SparseRows};
pub use selection::FeatureSelection;
pub use vectorizer::{Vectorizer, Weighting};
pub use vocabulary::Vocabulary;

/// Settings for one feature extraction pass over the partitions.
///
/// Can be loaded from a JSON file; missing keys take their defaults.
///
/// ```
/// use paperclass::features::FeatureExtraction;
///
/// let settings: FeatureExtraction =
///     serde_json::from_str(r#"{"top_n_features": 500, "vectorizer": {"ngram_range": [1, 2]}}"#).unwrap();
/// assert_eq!(settings.top_n_features, Some(500));
/// assert_eq!(settings.vectorizer.ngram_range, (1, 2));
/// assert!(settings.fit_vocabulary);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureExtraction {
    /// Vectorizer settings.
    pub vectorizer: VectorizerConfig,
    /// Keep only the N columns most associated with the labels.
    pub top_n_features: Option<usize>,
    /// Learn a new vocabulary from the training partition instead of reusing
    /// the current one.
    pub fit_vocabulary: bool,
    /// Compute feature matrices for both partitions.
    pub transform_features: bool,
}

impl Default for FeatureExtraction {
    fn default() -> Self {
        FeatureExtraction {
            vectorizer: VectorizerConfig::default(),
            top_n_features: None,
            fit_vocabulary: true,
            transform_features: true,
        }
    }
}

impl FeatureExtraction {
    /// Load settings from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Set the vectorizer configuration.
    pub fn with_vectorizer(mut self, vectorizer: VectorizerConfig) -> Self {
        self.vectorizer = vectorizer;
        self
    }

    /// Keep only the best `n` features.
    pub fn with_top_n_features(mut self, n: Option<usize>) -> Self {
        self.top_n_features = n;
        self
    }

    /// Whether to learn a new vocabulary.
    pub fn with_fit_vocabulary(mut self, fit: bool) -> Self {
        self.fit_vocabulary = fit;
        self
    }

    /// Whether to compute feature matrices.
    pub fn with_transform_features(mut self, transform: bool) -> Self {
        self.transform_features = transform;
        self
    }
}
