//! Analyzers that combine a tokenizer with a chain of filters.

use std::sync::Arc;

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{Filter, LemmaFilter, LowercaseFilter, StopFilter};
use crate::analysis::tokenizer::{RegexTokenizer, Tokenizer, UnicodeWordTokenizer};
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and logging).
    fn name(&self) -> &str;
}

/// A configurable analyzer that runs a tokenizer followed by filters in order.
#[derive(Clone)]
pub struct PipelineAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    filters: Vec<Arc<dyn Filter>>,
    name: String,
}

impl PipelineAnalyzer {
    /// Create a new pipeline analyzer with the given tokenizer.
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        PipelineAnalyzer {
            name: format!("pipeline_{}", tokenizer.name()),
            tokenizer,
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline.
    pub fn add_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set a custom name for this analyzer.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Build the analyzer used for bag-of-words features.
    ///
    /// Without lemmatization, tokens are runs of two or more word characters.
    /// With it, words are segmented on Unicode boundaries and each one is
    /// reduced to its lemma. Lowercasing always runs first; stop words are
    /// removed last.
    pub fn for_documents(stop_words: bool, lemmatize: bool) -> Result<Self> {
        let mut analyzer = if lemmatize {
            PipelineAnalyzer::new(Arc::new(UnicodeWordTokenizer::new()))
                .add_filter(Arc::new(LowercaseFilter::new()))
                .add_filter(Arc::new(LemmaFilter::new()))
        } else {
            PipelineAnalyzer::new(Arc::new(RegexTokenizer::new()?))
                .add_filter(Arc::new(LowercaseFilter::new()))
        };
        if stop_words {
            analyzer = analyzer.add_filter(Arc::new(StopFilter::new()));
        }
        Ok(analyzer)
    }

    /// Get the tokenizer used by this analyzer.
    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    /// Get the filters used by this analyzer.
    pub fn filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = self.tokenizer.tokenize(text)?;
        for filter in &self.filters {
            tokens = filter.filter(tokens)?;
        }
        Ok(tokens)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for PipelineAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineAnalyzer")
            .field("name", &self.name)
            .field("tokenizer", &self.tokenizer.name())
            .field(
                "filters",
                &self.filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Expand a token sequence into space-joined word n-grams.
///
/// Every `n` in `min_n..=max_n` contributes all contiguous windows of `n`
/// tokens, shorter n first.
pub fn word_ngrams(tokens: &[String], min_n: usize, max_n: usize) -> Vec<String> {
    let min_n = min_n.max(1);
    let mut grams = Vec::new();
    for n in min_n..=max_n {
        if n > tokens.len() {
            break;
        }
        if n == 1 {
            grams.extend(tokens.iter().cloned());
        } else {
            grams.extend(tokens.windows(n).map(|window| window.join(" ")));
        }
    }
    grams
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(analyzer: &PipelineAnalyzer, text: &str) -> Vec<String> {
        analyzer.analyze(text).unwrap().map(|t| t.text).collect()
    }

    #[test]
    fn test_document_analyzer() {
        let analyzer = PipelineAnalyzer::for_documents(true, false).unwrap();
        assert_eq!(
            texts(&analyzer, "The RNAi screen of a C. elegans strain"),
            vec!["rnai", "screen", "elegans", "strain"]
        );
    }

    #[test]
    fn test_document_analyzer_without_stop_words() {
        let analyzer = PipelineAnalyzer::for_documents(false, false).unwrap();
        assert_eq!(
            texts(&analyzer, "The worm of the lab"),
            vec!["the", "worm", "of", "the", "lab"]
        );
    }

    #[test]
    fn test_lemmatizing_analyzer() {
        let analyzer = PipelineAnalyzer::for_documents(true, true).unwrap();
        assert_eq!(
            texts(&analyzer, "Mutant larvae and their Mothers"),
            vec!["mutant", "larva", "mother"]
        );
    }

    #[test]
    fn test_word_ngrams() {
        let tokens: Vec<String> = ["gene", "expression", "data"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(word_ngrams(&tokens, 1, 1), tokens);
        assert_eq!(
            word_ngrams(&tokens, 1, 2),
            vec!["gene", "expression", "data", "gene expression", "expression data"]
        );
        assert_eq!(word_ngrams(&tokens, 3, 3), vec!["gene expression data"]);
        assert!(word_ngrams(&tokens, 4, 5).is_empty());
    }

    #[test]
    fn test_debug_lists_filters() {
        let analyzer = PipelineAnalyzer::for_documents(true, true).unwrap();
        let debug = format!("{analyzer:?}");
        assert!(debug.contains("unicode_word"));
        assert!(debug.contains("lemma"));
        assert_eq!(analyzer.filters().len(), 3);
    }
}
