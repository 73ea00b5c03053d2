//! # paperclass
//!
//! Document classification for scientific literature.
//!
//! ## Features
//!
//! - Text extraction from PDF files, gzip-compressed CAS exports and plain text
//! - Labeled corpora with reproducible random train/test splits
//! - Bag-of-words and TF-IDF features over word n-grams
//! - Chi-squared feature selection and editable vocabularies
//! - Interchangeable classifiers behind one `Estimator` trait
//! - Saving and loading of complete pipelines

pub mod analysis;
pub mod classifier;
pub mod cli;
pub mod dataset;
pub mod document;
pub mod error;
pub mod features;
pub mod ml;

pub mod prelude {
    pub use crate::classifier::{DocumentClassifier, Prediction};
    pub use crate::document::{DocumentRecord, Label, SourceType};
    pub use crate::error::{PaperclassError, Result};
    pub use crate::features::{FeatureExtraction, Vocabulary, Weighting};
    pub use crate::features::vectorizer::VectorizerConfig;
    pub use crate::ml::{Estimator, Model, ModelKind, TestResults};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
