//! The document classification pipeline.
//!
//! A [`DocumentClassifier`] owns every stage of an experiment: the labeled
//! corpus and its partitions, the fitted vectorizer, the feature selection,
//! and the trained estimator. Stages run in order:
//!
//! 1. [`DocumentClassifier::add_classified_docs`] loads documents,
//! 2. [`DocumentClassifier::generate_training_and_test_sets`] splits them,
//! 3. [`DocumentClassifier::extract_features`] vectorizes both partitions,
//! 4. [`DocumentClassifier::train`] fits an estimator,
//! 5. [`DocumentClassifier::test`] or [`DocumentClassifier::predict_files`]
//!    uses it.
//!
//! The whole pipeline can be saved and loaded, see [`persistence`].

pub mod persistence;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};
use rand::rngs::StdRng;

use crate::dataset::builder::file_name_of;
use crate::dataset::{Dataset, Partitioner, Partitions, list_document_files};
use crate::document::{DocumentRecord, Label, SourceType, extract_text};
use crate::error::{PaperclassError, Result};
use crate::features::matrix::SparseRows;
use crate::features::{FeatureExtraction, FeatureMatrix, FeatureSelection, Vectorizer, Vocabulary};
use crate::ml::estimator::Estimator;
use crate::ml::metrics::{TestResults, evaluate};
use crate::ml::models::Model;

/// Predicted label of one file. `label` is `None` when no text could be
/// extracted from the file.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Prediction {
    pub filename: String,
    pub label: Option<Label>,
}

/// A labeled corpus together with everything learned from it.
#[derive(Debug)]
pub struct DocumentClassifier<E = Model> {
    partitions: Partitions,
    vocabulary: Option<Arc<Vocabulary>>,
    vectorizer: Option<Vectorizer>,
    selection: Option<FeatureSelection>,
    classifier: Option<E>,
    seed: Option<u64>,
    partitioner: Partitioner<StdRng>,
    compact: bool,
}

impl<E: Estimator> Default for DocumentClassifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Estimator> DocumentClassifier<E> {
    /// An empty pipeline whose splits are randomly seeded.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// An empty pipeline whose splits are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::build(Some(seed))
    }

    fn build(seed: Option<u64>) -> Self {
        DocumentClassifier {
            partitions: Partitions::default(),
            vocabulary: None,
            vectorizer: None,
            selection: None,
            classifier: None,
            seed,
            partitioner: Partitioner::from_seed(seed),
            compact: false,
        }
    }

    /// The unsplit dataset and the two partitions.
    pub fn partitions(&self) -> &Partitions {
        &self.partitions
    }

    /// Documents not yet assigned to a partition.
    pub fn dataset(&self) -> &Dataset {
        &self.partitions.dataset
    }

    /// The training partition.
    pub fn training_set(&self) -> &Dataset {
        &self.partitions.training_set
    }

    /// The test partition.
    pub fn test_set(&self) -> &Dataset {
        &self.partitions.test_set
    }

    /// The current vocabulary snapshot.
    pub fn vocabulary(&self) -> Option<Arc<Vocabulary>> {
        self.vocabulary.clone()
    }

    /// The fitted vectorizer.
    pub fn vectorizer(&self) -> Option<&Vectorizer> {
        self.vectorizer.as_ref()
    }

    /// The feature selection applied after vectorizing, if any.
    pub fn selection(&self) -> Option<&FeatureSelection> {
        self.selection.as_ref()
    }

    /// The trained estimator.
    pub fn classifier(&self) -> Option<&E> {
        self.classifier.as_ref()
    }

    /// Seed of the partition RNG.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Whether this pipeline was loaded from a compact save and so has no
    /// document texts to learn from.
    pub fn is_compact(&self) -> bool {
        self.compact
    }

    /// Extract every document in `dir` and add it to the unsplit dataset
    /// with `label`. Returns the number of documents added.
    pub fn add_classified_docs<P: AsRef<Path>>(
        &mut self,
        dir: P,
        recursive: bool,
        source_type: SourceType,
        label: Label,
    ) -> Result<usize> {
        self.partitions
            .dataset
            .add_classified_docs(dir, recursive, source_type, label)
    }

    /// Add an already extracted document to the unsplit dataset.
    pub fn add_document(&mut self, record: DocumentRecord) {
        self.partitions.dataset.push(record);
    }

    /// Randomly split all documents into training and test partitions.
    pub fn generate_training_and_test_sets(&mut self, ratio: f64) -> Result<()> {
        self.partitioner.split(&mut self.partitions, ratio)
    }

    /// Merge the partitions back into the unsplit dataset.
    pub fn recombine(&mut self) {
        self.partitions.recombine();
    }

    /// Vectorize the training and test partitions.
    ///
    /// The vectorizer is always fitted on the training partition only. When
    /// the pipeline already holds a vocabulary (from an earlier pass or from
    /// [`add_features`](Self::add_features)), the vectorizer is restricted to
    /// exactly those terms; call [`clear_vocabulary`](Self::clear_vocabulary)
    /// first to learn a new one. With `top_n_features`, both matrices are
    /// reduced to the columns that score best against the training labels,
    /// and the vocabulary becomes the selected terms in score order.
    pub fn extract_features(&mut self, settings: &FeatureExtraction) -> Result<()> {
        self.ensure_trainable("extract features")?;
        if self.partitions.training_set.is_empty() {
            return Err(PaperclassError::configuration("training set is empty"));
        }

        let training_texts = self.partitions.training_set.texts();
        let mut vectorizer = Vectorizer::new(settings.vectorizer.clone())?;
        let reused = match self.vocabulary.as_deref() {
            Some(vocabulary) => Some(vocabulary.clone()),
            None if settings.fit_vocabulary => None,
            None => Some(
                self.vectorizer
                    .as_ref()
                    .and_then(Vectorizer::vocabulary)
                    .cloned()
                    .ok_or_else(|| {
                        PaperclassError::configuration(
                            "no vocabulary to reuse: extract features with fit_vocabulary first or add features",
                        )
                    })?,
            ),
        };
        match reused {
            Some(vocabulary) => {
                debug!("Restricting the vectorizer to {} known terms", vocabulary.len());
                vectorizer.set_vocabulary(vocabulary);
                vectorizer.fit_statistics(&training_texts)?;
            }
            None => vectorizer.fit(&training_texts)?,
        }

        let fitted = vectorizer
            .vocabulary()
            .cloned()
            .ok_or_else(|| PaperclassError::analysis("the vectorizer produced no vocabulary"))?;

        if !settings.transform_features {
            info!("Fitted a vocabulary of {} terms without transforming", fitted.len());
            self.vocabulary = Some(Arc::new(fitted));
            self.vectorizer = Some(vectorizer);
            self.selection = None;
            self.clear_features();
            return Ok(());
        }

        let training = vectorizer.transform(&training_texts)?;
        let test = vectorizer.transform(&self.partitions.test_set.texts())?;

        let (training, test, vocabulary, selection) = match settings.top_n_features {
            Some(n) => {
                let labels = self.partitions.training_set.labels();
                let selection = FeatureSelection::fit(&training, &labels, n)?;
                let vocabulary: Vocabulary = selection
                    .columns
                    .iter()
                    .filter_map(|&column| fitted.term(column))
                    .collect();
                info!("Selected {} of {} features", selection.len(), fitted.len());
                (
                    training.select_columns(&selection.columns)?,
                    test.select_columns(&selection.columns)?,
                    vocabulary,
                    Some(selection),
                )
            }
            None => (training, test, fitted, None),
        };

        debug!(
            "Feature matrices: training {}x{}, test {}x{}",
            training.rows(),
            training.cols(),
            test.rows(),
            test.cols()
        );

        self.partitions
            .training_set
            .set_features(FeatureMatrix::Sparse(training));
        self.partitions
            .test_set
            .set_features(FeatureMatrix::Sparse(test));
        self.vocabulary = Some(Arc::new(vocabulary));
        self.vectorizer = Some(vectorizer);
        self.selection = selection;
        Ok(())
    }

    /// Vocabulary terms with their chi-squared scores, best first. Every
    /// score is 0 when no scores are available.
    pub fn features_with_importance(&self) -> Vec<(String, f64)> {
        let Some(vocabulary) = &self.vocabulary else {
            return Vec::new();
        };
        let scores = self
            .selection
            .as_ref()
            .and_then(|s| s.scores.as_deref())
            .filter(|scores| scores.len() == vocabulary.len());

        let mut features: Vec<(String, f64)> = match scores {
            Some(scores) => vocabulary
                .iter()
                .zip(scores)
                .map(|(term, &score)| (term.to_string(), score))
                .collect(),
            None => vocabulary.iter().map(|term| (term.to_string(), 0.0)).collect(),
        };
        features.sort_by(|a, b| b.1.total_cmp(&a.1));
        features
    }

    /// Write `term<TAB>score` lines in [`Self::features_with_importance`] order.
    pub fn export_vocabulary<W: Write>(&self, mut writer: W) -> Result<()> {
        for (term, score) in self.features_with_importance() {
            writeln!(writer, "{term}\t{score}")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Remove terms from the vocabulary. Returns the new snapshot, or `None`
    /// when there is no vocabulary.
    pub fn remove_features<S: AsRef<str>>(&mut self, terms: &[S]) -> Option<Arc<Vocabulary>> {
        let current = self.vocabulary.as_ref()?;
        let vocabulary = Arc::new(current.without_terms(terms));
        info!(
            "Removed {} features, {} remain",
            current.len() - vocabulary.len(),
            vocabulary.len()
        );
        self.replace_vocabulary(Arc::clone(&vocabulary));
        Some(vocabulary)
    }

    /// Append terms to the vocabulary, or start a new one from them when
    /// `replace_existing` is set. Returns the new snapshot.
    pub fn add_features<S: AsRef<str>>(
        &mut self,
        terms: &[S],
        replace_existing: bool,
    ) -> Arc<Vocabulary> {
        let vocabulary = match (&self.vocabulary, replace_existing) {
            (Some(current), false) => current.with_terms(terms),
            _ => Vocabulary::new().with_terms(terms),
        };
        let vocabulary = Arc::new(vocabulary);
        info!("Vocabulary now has {} features", vocabulary.len());
        self.replace_vocabulary(Arc::clone(&vocabulary));
        vocabulary
    }

    /// Forget the vocabulary and feature selection, so that the next
    /// extraction learns a new vocabulary.
    pub fn clear_vocabulary(&mut self) {
        self.vocabulary = None;
        self.selection = None;
        self.clear_features();
    }

    /// Partition features were computed with the old vocabulary. Selected
    /// columns are kept for prediction with the current classifier, but the
    /// scores no longer line up with the vocabulary.
    fn replace_vocabulary(&mut self, vocabulary: Arc<Vocabulary>) {
        self.vocabulary = Some(vocabulary);
        if let Some(selection) = self.selection.as_mut() {
            selection.scores = None;
        }
        self.clear_features();
    }

    fn clear_features(&mut self) {
        self.partitions.training_set.clear_features();
        self.partitions.test_set.clear_features();
    }

    /// Fit `estimator` on the training features and keep it.
    pub fn train(&mut self, mut estimator: E, dense: bool) -> Result<()> {
        self.ensure_trainable("train")?;
        let training = &self.partitions.training_set;
        let features = training.features().ok_or_else(|| {
            PaperclassError::configuration("no training features: extract features before training")
        })?;

        let densified;
        let input = if dense || estimator.requires_dense() {
            densified = FeatureMatrix::Dense(features.to_dense());
            &densified
        } else {
            features
        };

        info!(
            "Training {} on {} documents with {} features",
            estimator.name(),
            input.nrows(),
            input.ncols()
        );
        estimator.fit(input, &training.labels())?;
        self.classifier = Some(estimator);
        Ok(())
    }

    /// Evaluate the trained classifier on the test partition, or on the
    /// training partition when `on_training` is set.
    pub fn test(&self, on_training: bool, dense: bool) -> Result<TestResults> {
        let classifier = self.trained()?;
        let partition = if on_training {
            &self.partitions.training_set
        } else {
            &self.partitions.test_set
        };
        let features = partition.features().ok_or_else(|| {
            PaperclassError::configuration("no features for the evaluated partition: extract features first")
        })?;

        let predicted = if dense || classifier.requires_dense() {
            classifier.predict(&FeatureMatrix::Dense(features.to_dense()))?
        } else {
            classifier.predict(features)?
        };
        let results = evaluate(&partition.labels(), &predicted)?;
        info!(
            "Evaluated {} documents: precision {}, recall {}, accuracy {}",
            predicted.len(),
            results.precision,
            results.recall,
            results.accuracy
        );
        Ok(results)
    }

    /// Classify raw texts with the fitted vectorizer, selection and
    /// classifier.
    pub fn predict_texts(&self, texts: &[&str], dense: bool) -> Result<Vec<Label>> {
        let classifier = self.trained()?;
        let vectorizer = self.vectorizer.as_ref().ok_or_else(|| {
            PaperclassError::configuration("no fitted vectorizer: extract features first")
        })?;

        let mut features = FeatureMatrix::Sparse(vectorizer.transform(texts)?);
        if let Some(selection) = &self.selection {
            features = features.select_columns(&selection.columns)?;
        }
        if dense || classifier.requires_dense() {
            features = features.into_dense();
        }
        classifier.predict(&features)
    }

    /// Classify one file. Returns `None` when no text could be extracted.
    pub fn predict_file<P: AsRef<Path>>(
        &self,
        path: P,
        source_type: SourceType,
        dense: bool,
    ) -> Result<Option<Label>> {
        let Some(text) = extract_text(path.as_ref(), source_type)? else {
            return Ok(None);
        };
        Ok(self.predict_texts(&[&text], dense)?.into_iter().next())
    }

    /// Classify every file directly inside `dir`.
    ///
    /// The result has one entry per file: files that were classified come
    /// first in name order, followed by the files with no extractable text.
    pub fn predict_files<P: AsRef<Path>>(
        &self,
        dir: P,
        source_type: SourceType,
        dense: bool,
    ) -> Result<Vec<Prediction>> {
        let mut extracted = Vec::new();
        let mut failed = Vec::new();
        for path in list_document_files(dir, false)? {
            let filename = file_name_of(&path);
            match extract_text(&path, source_type)? {
                Some(text) => extracted.push((filename, text)),
                None => {
                    warn!("No text extracted from {filename}, leaving it unclassified");
                    failed.push(filename);
                }
            }
        }

        let labels = if extracted.is_empty() {
            Vec::new()
        } else {
            let texts: Vec<&str> = extracted.iter().map(|(_, text)| text.as_str()).collect();
            self.predict_texts(&texts, dense)?
        };

        let mut predictions: Vec<Prediction> = extracted
            .into_iter()
            .zip(labels)
            .map(|((filename, _), label)| Prediction {
                filename,
                label: Some(label),
            })
            .collect();
        predictions.extend(failed.into_iter().map(|filename| Prediction {
            filename,
            label: None,
        }));
        Ok(predictions)
    }

    fn trained(&self) -> Result<&E> {
        self.classifier
            .as_ref()
            .ok_or_else(|| PaperclassError::configuration("no trained classifier: train first"))
    }

    fn ensure_trainable(&self, operation: &str) -> Result<()> {
        if self.compact {
            return Err(PaperclassError::configuration(format!(
                "cannot {operation}: the classifier was saved in compact mode without its training data"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::models::ModelKind;

    fn pipeline() -> DocumentClassifier {
        let mut classifier = DocumentClassifier::with_seed(7);
        let positives = [
            "germline apoptosis in worms",
            "apoptosis of germline cells",
            "germline cell death signalling",
            "worms germline apoptosis mutants",
        ];
        let negatives = [
            "neuronal migration in mice",
            "migration of neurons in mice",
            "axon guidance of neurons",
            "mice neuronal development",
        ];
        for (i, text) in positives.iter().enumerate() {
            classifier.add_document(DocumentRecord::new(*text, format!("pos{i}.txt"), 1));
        }
        for (i, text) in negatives.iter().enumerate() {
            classifier.add_document(DocumentRecord::new(*text, format!("neg{i}.txt"), 0));
        }
        classifier
    }

    #[test]
    fn test_extract_requires_training_set() {
        let mut classifier = pipeline();
        let err = classifier
            .extract_features(&FeatureExtraction::default())
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_vocabulary_size_is_stable_under_test_transform() {
        let mut classifier = pipeline();
        classifier.generate_training_and_test_sets(0.5).unwrap();
        classifier
            .extract_features(&FeatureExtraction::default())
            .unwrap();

        let vocabulary = classifier.vocabulary().unwrap();
        let training = classifier.training_set().features().unwrap();
        let test = classifier.test_set().features().unwrap();
        assert_eq!(training.ncols(), vocabulary.len());
        assert_eq!(test.ncols(), vocabulary.len());
        assert_eq!(training.nrows(), 4);
        assert_eq!(test.nrows(), 4);
    }

    #[test]
    fn test_top_n_selection() {
        let mut classifier = pipeline();
        classifier.generate_training_and_test_sets(0.75).unwrap();
        classifier
            .extract_features(&FeatureExtraction::default().with_top_n_features(Some(3)))
            .unwrap();

        assert_eq!(classifier.vocabulary().unwrap().len(), 3);
        assert_eq!(classifier.training_set().features().unwrap().ncols(), 3);
        assert_eq!(classifier.test_set().features().unwrap().ncols(), 3);

        let importance = classifier.features_with_importance();
        assert_eq!(importance.len(), 3);
        assert!(importance[0].1 >= importance[1].1);
        assert!(importance[1].1 >= importance[2].1);
    }

    #[test]
    fn test_fit_only_pass_keeps_vocabulary_for_editing() {
        let mut classifier = pipeline();
        classifier.generate_training_and_test_sets(1.0).unwrap();
        classifier
            .extract_features(&FeatureExtraction::default().with_transform_features(false))
            .unwrap();
        assert!(classifier.training_set().features().is_none());

        let before = classifier.vocabulary().unwrap();
        let after = classifier.remove_features(&["germline"]).unwrap();
        assert_eq!(after.len(), before.len() - 1);
        assert!(!after.contains("germline"));

        classifier
            .extract_features(&FeatureExtraction::default().with_fit_vocabulary(false))
            .unwrap();
        assert_eq!(classifier.vocabulary().unwrap().len(), after.len());
        assert_eq!(
            classifier.training_set().features().unwrap().ncols(),
            after.len()
        );
    }

    #[test]
    fn test_default_extraction_keeps_edited_vocabulary() {
        let mut classifier = pipeline();
        classifier.generate_training_and_test_sets(1.0).unwrap();
        classifier
            .extract_features(&FeatureExtraction::default().with_transform_features(false))
            .unwrap();
        let edited = classifier.remove_features(&["germline"]).unwrap();

        classifier
            .extract_features(&FeatureExtraction::default())
            .unwrap();
        let vocabulary = classifier.vocabulary().unwrap();
        assert_eq!(vocabulary.len(), edited.len());
        assert!(!vocabulary.contains("germline"));
        assert_eq!(
            classifier.training_set().features().unwrap().ncols(),
            edited.len()
        );
    }

    #[test]
    fn test_replaced_vocabulary_limits_columns() {
        let mut classifier = pipeline();
        classifier.generate_training_and_test_sets(1.0).unwrap();
        classifier.add_features(&["germline", "mice"], true);

        classifier
            .extract_features(&FeatureExtraction::default())
            .unwrap();
        assert_eq!(classifier.training_set().features().unwrap().ncols(), 2);
        let vocabulary = classifier.vocabulary().unwrap();
        let terms: Vec<&str> = vocabulary.iter().collect();
        assert_eq!(terms, vec!["germline", "mice"]);

        classifier.clear_vocabulary();
        classifier
            .extract_features(&FeatureExtraction::default())
            .unwrap();
        assert!(classifier.vocabulary().unwrap().len() > 2);
    }

    #[test]
    fn test_reuse_without_vocabulary_fails() {
        let mut classifier = pipeline();
        classifier.generate_training_and_test_sets(1.0).unwrap();
        let err = classifier
            .extract_features(&FeatureExtraction::default().with_fit_vocabulary(false))
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_add_features_replace() {
        let mut classifier = pipeline();
        assert!(classifier.remove_features(&["x"]).is_none());

        let vocabulary = classifier.add_features(&["apoptosis", "mice"], false);
        assert_eq!(vocabulary.len(), 2);
        let vocabulary = classifier.add_features(&["axon", "mice"], false);
        assert_eq!(vocabulary.len(), 3);
        assert_eq!(vocabulary.index_of("axon"), Some(2));
        let vocabulary = classifier.add_features(&["worms"], true);
        assert_eq!(vocabulary.len(), 1);
        assert_eq!(vocabulary.index_of("worms"), Some(0));
    }

    #[test]
    fn test_train_test_and_predict() {
        let mut classifier = pipeline();
        classifier.generate_training_and_test_sets(0.75).unwrap();
        classifier
            .extract_features(&FeatureExtraction::default())
            .unwrap();
        assert!(classifier.test(false, false).is_err());

        classifier.train(ModelKind::Prototype.build(), false).unwrap();
        let results = classifier.test(true, false).unwrap();
        assert_eq!(results.accuracy, 1.0);

        let labels = classifier
            .predict_texts(&["germline apoptosis", "neurons in mice"], false)
            .unwrap();
        assert_eq!(labels, vec![1, 0]);
    }

    #[test]
    fn test_train_without_features() {
        let mut classifier = pipeline();
        classifier.generate_training_and_test_sets(0.75).unwrap();
        let err = classifier
            .train(ModelKind::Logistic.build(), false)
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_export_vocabulary_without_scores() {
        let mut classifier = pipeline();
        classifier.add_features(&["mice", "axon"], false);
        let mut out = Vec::new();
        classifier.export_vocabulary(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "mice\t0\naxon\t0\n");
    }
}
