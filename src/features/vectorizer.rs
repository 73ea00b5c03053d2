//! Count and TF-IDF vectorization of documents.
//!
//! # Examples
//!
//! ```
//! use paperclass::features::vectorizer::{Vectorizer, VectorizerConfig, Weighting};
//!
//! let config = VectorizerConfig::default()
//!     .with_weighting(Weighting::TfIdf)
//!     .with_ngram_range(1, 2);
//! let mut vectorizer = Vectorizer::new(config).unwrap();
//!
//! let corpus = ["germline apoptosis in worms", "apoptosis of neurons"];
//! vectorizer.fit(&corpus).unwrap();
//! let features = vectorizer.transform(&["neurons undergo apoptosis"]).unwrap();
//!
//! assert_eq!(features.rows(), 1);
//! assert_eq!(features.cols(), vectorizer.vocabulary().unwrap().len());
//! ```

use std::collections::{HashMap, HashSet};

use clap::ValueEnum;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, PipelineAnalyzer, word_ngrams};
use crate::error::{PaperclassError, Result};
use crate::features::matrix::{SparseMatrix, SparseRows};
use crate::features::vocabulary::Vocabulary;

/// How term occurrences are turned into feature values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Weighting {
    /// Raw term counts (bag of words).
    #[default]
    #[value(name = "bow")]
    Count,
    /// Term counts scaled by smoothed inverse document frequency, with each
    /// document vector normalized to unit length.
    #[value(name = "tfidf")]
    TfIdf,
}

/// Configuration for [`Vectorizer`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Feature weighting.
    pub weighting: Weighting,
    /// Smallest and largest n-gram length, inclusive.
    pub ngram_range: (usize, usize),
    /// Remove English stop words before building n-grams.
    pub stop_words: bool,
    /// Reduce words to their lemma before building n-grams.
    pub lemmatize: bool,
    /// Terms occurring in more than this share of the documents are dropped
    /// when a vocabulary is learned.
    pub max_df: f64,
    /// Keep only this many terms, the most frequent across the corpus.
    pub max_features: Option<usize>,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        VectorizerConfig {
            weighting: Weighting::Count,
            ngram_range: (1, 1),
            stop_words: true,
            lemmatize: false,
            max_df: 1.0,
            max_features: None,
        }
    }
}

impl VectorizerConfig {
    /// Set the weighting.
    pub fn with_weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = weighting;
        self
    }

    /// Set the n-gram range.
    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        self.ngram_range = (min_n, max_n);
        self
    }

    /// Enable or disable stop word removal.
    pub fn with_stop_words(mut self, stop_words: bool) -> Self {
        self.stop_words = stop_words;
        self
    }

    /// Enable or disable lemmatization.
    pub fn with_lemmatize(mut self, lemmatize: bool) -> Self {
        self.lemmatize = lemmatize;
        self
    }

    /// Set the maximum document frequency share.
    pub fn with_max_df(mut self, max_df: f64) -> Self {
        self.max_df = max_df;
        self
    }

    /// Cap the vocabulary size.
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Check that the settings are usable.
    pub fn validate(&self) -> Result<()> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(PaperclassError::configuration(format!(
                "invalid n-gram range ({min_n}, {max_n})"
            )));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(PaperclassError::configuration(format!(
                "max_df must lie in (0, 1], got {}",
                self.max_df
            )));
        }
        if self.max_features == Some(0) {
            return Err(PaperclassError::configuration("max_features must be positive"));
        }
        Ok(())
    }
}

/// Turns documents into sparse term vectors over a vocabulary.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vectorizer {
    config: VectorizerConfig,
    vocabulary: Option<Vocabulary>,
    idf: Option<Vec<f64>>,
}

impl Vectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(config: VectorizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Vectorizer {
            config,
            vocabulary: None,
            idf: None,
        })
    }

    /// The configuration.
    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// The vocabulary, once learned or assigned.
    pub fn vocabulary(&self) -> Option<&Vocabulary> {
        self.vocabulary.as_ref()
    }

    /// Inverse document frequencies, for fitted TF-IDF vectorizers.
    pub fn idf(&self) -> Option<&[f64]> {
        self.idf.as_deref()
    }

    /// Use a fixed vocabulary. Any document statistics are discarded.
    pub fn set_vocabulary(&mut self, vocabulary: Vocabulary) {
        self.vocabulary = Some(vocabulary);
        self.idf = None;
    }

    /// Terms (n-grams) of every document, in document order.
    pub fn analyze_documents(&self, texts: &[&str]) -> Result<Vec<Vec<String>>> {
        let analyzer = PipelineAnalyzer::for_documents(self.config.stop_words, self.config.lemmatize)?;
        let (min_n, max_n) = self.config.ngram_range;
        texts
            .iter()
            .map(|text| {
                let tokens: Vec<String> = analyzer.analyze(text)?.map(|t| t.text).collect();
                Ok(word_ngrams(&tokens, min_n, max_n))
            })
            .collect()
    }

    /// Learn the vocabulary from a corpus, and document frequencies when
    /// weighting by TF-IDF.
    ///
    /// Terms are indexed alphabetically after the `max_df` and
    /// `max_features` limits have been applied.
    pub fn fit(&mut self, texts: &[&str]) -> Result<()> {
        let documents = self.analyze_documents(texts)?;
        let n_docs = documents.len();

        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        let mut term_frequency: HashMap<&str, usize> = HashMap::new();
        for terms in &documents {
            let mut seen = HashSet::new();
            for term in terms {
                *term_frequency.entry(term.as_str()).or_insert(0) += 1;
                if seen.insert(term.as_str()) {
                    *document_frequency.entry(term.as_str()).or_insert(0) += 1;
                }
            }
        }

        let max_doc_count = self.config.max_df * n_docs as f64;
        let mut kept: Vec<&str> = document_frequency
            .iter()
            .filter(|&(_, &df)| df as f64 <= max_doc_count)
            .map(|(&term, _)| term)
            .collect();
        let dropped = document_frequency.len() - kept.len();

        if let Some(limit) = self.config.max_features {
            kept.sort_by(|a, b| term_frequency[b].cmp(&term_frequency[a]).then(a.cmp(b)));
            kept.truncate(limit);
        }
        kept.sort_unstable();

        if kept.is_empty() {
            return Err(PaperclassError::analysis(
                "empty vocabulary: the documents contain no usable terms",
            ));
        }

        let vocabulary: Vocabulary = kept.iter().copied().collect();
        info!(
            "Learned vocabulary of {} terms from {n_docs} documents ({dropped} dropped by max_df)",
            vocabulary.len()
        );

        self.idf = match self.config.weighting {
            Weighting::TfIdf => Some(
                vocabulary
                    .iter()
                    .map(|term| smooth_idf(n_docs, document_frequency[term]))
                    .collect(),
            ),
            Weighting::Count => None,
        };
        self.vocabulary = Some(vocabulary);
        Ok(())
    }

    /// Recompute document statistics for the current vocabulary without
    /// changing it. Count weighting has no statistics, so this only checks
    /// that a vocabulary is present.
    pub fn fit_statistics(&mut self, texts: &[&str]) -> Result<()> {
        let vocabulary = self.vocabulary.as_ref().ok_or_else(|| {
            PaperclassError::configuration("the vectorizer has no vocabulary to fit statistics for")
        })?;
        if self.config.weighting == Weighting::Count {
            return Ok(());
        }

        let documents = self.analyze_documents(texts)?;
        let mut document_frequency = vec![0usize; vocabulary.len()];
        for terms in &documents {
            let columns: HashSet<usize> = terms.iter().filter_map(|t| vocabulary.index_of(t)).collect();
            for column in columns {
                document_frequency[column] += 1;
            }
        }

        let n_docs = documents.len();
        self.idf = Some(
            document_frequency
                .into_iter()
                .map(|df| smooth_idf(n_docs, df))
                .collect(),
        );
        debug!("Recomputed idf over {n_docs} documents");
        Ok(())
    }

    /// Vectorize documents. Terms outside the vocabulary are ignored.
    pub fn transform(&self, texts: &[&str]) -> Result<SparseMatrix> {
        let vocabulary = self.vocabulary.as_ref().ok_or_else(|| {
            PaperclassError::configuration("the vectorizer has not been fitted")
        })?;
        let idf = match self.config.weighting {
            Weighting::TfIdf => Some(self.idf.as_deref().ok_or_else(|| {
                PaperclassError::configuration("the TF-IDF vectorizer has no document statistics")
            })?),
            Weighting::Count => None,
        };

        let documents = self.analyze_documents(texts)?;
        let mut rows = Vec::with_capacity(documents.len());
        for terms in documents {
            let mut counts: HashMap<usize, f64> = HashMap::new();
            for term in &terms {
                if let Some(column) = vocabulary.index_of(term) {
                    *counts.entry(column).or_insert(0.0) += 1.0;
                }
            }

            let mut row: Vec<(usize, f64)> = counts.into_iter().collect();
            if let Some(idf) = idf {
                for (column, value) in row.iter_mut() {
                    *value *= idf[*column];
                }
                let norm = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for (_, value) in row.iter_mut() {
                        *value /= norm;
                    }
                }
            }
            rows.push(row);
        }
        SparseMatrix::from_entries(vocabulary.len(), rows)
    }
}

/// Smoothed inverse document frequency: `ln((1 + n) / (1 + df)) + 1`.
fn smooth_idf(n_docs: usize, df: usize) -> f64 {
    ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0
}
