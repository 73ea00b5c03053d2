//! Labeled document collections and their train/test partitions.
//!
//! A [`Partitions`] value holds three [`Dataset`]s. Documents are first
//! accumulated in the unsplit `dataset`; splitting moves every one of them
//! into either `training_set` or `test_set`. At any time either the unsplit
//! dataset or the two partitions hold the documents, never both.

pub mod builder;
pub mod partition;

use serde::{Deserialize, Serialize};

use crate::document::{DocumentRecord, Label};
use crate::features::matrix::FeatureMatrix;

pub use builder::list_document_files;
pub use partition::Partitioner;

/// An ordered collection of labeled documents, optionally with the feature
/// matrix computed from them. Row `i` of the matrix belongs to record `i`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<DocumentRecord>,
    features: Option<FeatureMatrix>,
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dataset from existing records.
    pub fn from_records(records: Vec<DocumentRecord>) -> Self {
        Dataset {
            records,
            features: None,
        }
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset holds no documents.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The documents, in insertion order.
    pub fn records(&self) -> &[DocumentRecord] {
        &self.records
    }

    /// Document texts, aligned with [`Dataset::records`].
    pub fn texts(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.text.as_str()).collect()
    }

    /// Document labels, aligned with [`Dataset::records`].
    pub fn labels(&self) -> Vec<Label> {
        self.records.iter().map(|r| r.label).collect()
    }

    /// Append a document. Any computed features no longer cover every row
    /// and are dropped.
    pub fn push(&mut self, record: DocumentRecord) {
        self.records.push(record);
        self.features = None;
    }

    /// The feature matrix, if one has been computed.
    pub fn features(&self) -> Option<&FeatureMatrix> {
        self.features.as_ref()
    }

    /// Attach a feature matrix computed from this dataset's records.
    pub fn set_features(&mut self, features: FeatureMatrix) {
        debug_assert_eq!(features.nrows(), self.records.len());
        self.features = Some(features);
    }

    /// Forget the feature matrix.
    pub fn clear_features(&mut self) {
        self.features = None;
    }

    /// Remove all documents and features, returning the documents.
    pub fn take_records(&mut self) -> Vec<DocumentRecord> {
        self.features = None;
        std::mem::take(&mut self.records)
    }
}

/// The unsplit dataset together with its training and test partitions.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Partitions {
    /// Documents that have not been assigned to a partition yet.
    pub dataset: Dataset,
    /// The training partition.
    pub training_set: Dataset,
    /// The test partition.
    pub test_set: Dataset,
}

impl Partitions {
    /// Total number of documents across all three collections.
    pub fn total_documents(&self) -> usize {
        self.dataset.len() + self.training_set.len() + self.test_set.len()
    }

    /// Move the documents of both partitions back into the unsplit dataset.
    ///
    /// The result is the training documents followed by the test documents,
    /// each in partition order, followed by any documents that were added
    /// after the last split. All features are dropped.
    pub fn recombine(&mut self) {
        let added = self.dataset.take_records();
        let mut records = self.training_set.take_records();
        records.extend(self.test_set.take_records());
        records.extend(added);
        self.dataset = Dataset::from_records(records);
    }
}
