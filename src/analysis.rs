//! Text analysis: tokenizers, token filters and the analyzers that chain them.
//!
//! The vectorizer never looks at raw text. It asks an [`analyzer::Analyzer`]
//! for tokens and builds n-grams from what comes out.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
