//! Command line argument parsing for the paperclass CLI using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::document::SourceType;
use crate::error::Result;
use crate::features::{FeatureExtraction, Weighting};
use crate::features::vectorizer::VectorizerConfig;
use crate::ml::models::ModelKind;

/// paperclass - train and apply classifiers for scientific articles
#[derive(Parser, Debug, Clone)]
#[command(name = "paperclass")]
#[command(about = "Train, evaluate and apply classifiers for scientific literature")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct PaperclassArgs {
    /// Increase verbosity (-v for progress, -vv for debug output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl PaperclassArgs {
    /// Get the effective verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }

    /// Log level for the effective verbosity.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbosity() {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train a classifier on a directory with positive/ and negative/ subdirectories
    Train(TrainArgs),

    /// Classify every document in a directory with a saved classifier
    Predict(PredictArgs),

    /// Compare every model on random train/test splits
    Compare(CompareArgs),

    /// Print the normalized text extracted from a document
    Convert(ConvertArgs),

    /// Export the vocabulary of a saved classifier with feature scores
    Features(FeaturesArgs),
}

/// Options controlling how documents are read and vectorized.
#[derive(Args, Debug, Clone)]
pub struct ExtractionArgs {
    /// Type of the input files
    #[arg(short = 't', long, default_value = "pdf")]
    pub file_type: SourceType,

    /// Only read files directly inside the document directories
    #[arg(long)]
    pub no_recursive: bool,

    /// Term weighting
    #[arg(long, default_value = "tfidf")]
    pub tokenizer: Weighting,

    /// Use all n-grams from 1 up to this size
    #[arg(long, default_value = "1")]
    pub ngram_size: usize,

    /// Keep only the N features most associated with the labels (0 keeps every feature)
    #[arg(long, value_name = "N", default_value = "20000")]
    pub best_features: usize,

    /// Lemmatize words before building n-grams
    #[arg(long)]
    pub lemmatize: bool,

    /// Ignore terms found in more than this share of training documents
    #[arg(long, default_value = "1.0")]
    pub max_df: f64,

    /// Seed for the random train/test split
    #[arg(long)]
    pub seed: Option<u64>,

    /// Feature extraction settings as JSON (takes precedence over the flags above)
    #[arg(long, value_name = "JSON_FILE")]
    pub settings: Option<PathBuf>,

    /// Convert feature matrices to dense form for every model
    #[arg(long)]
    pub dense: bool,
}

impl ExtractionArgs {
    /// Feature extraction settings from the settings file or the flags.
    pub fn feature_extraction(&self) -> Result<FeatureExtraction> {
        if let Some(path) = &self.settings {
            return FeatureExtraction::from_json_file(path);
        }
        let vectorizer = VectorizerConfig::default()
            .with_weighting(self.tokenizer)
            .with_ngram_range(1, self.ngram_size)
            .with_lemmatize(self.lemmatize)
            .with_max_df(self.max_df);
        vectorizer.validate()?;
        Ok(FeatureExtraction::default()
            .with_vectorizer(vectorizer)
            .with_top_n_features(Some(self.best_features).filter(|&n| n > 0)))
    }

    /// Whether to descend into subdirectories.
    pub fn recursive(&self) -> bool {
        !self.no_recursive
    }
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Directory containing positive/ and negative/ subdirectories
    #[arg(long, value_name = "DIR")]
    pub training_dir: PathBuf,

    /// Hold out 20% of the documents and report precision, recall and accuracy
    #[arg(long)]
    pub test: bool,

    /// Save the trained classifier to this file
    #[arg(long, value_name = "PATH")]
    pub model_file: Option<PathBuf>,

    /// Model to train
    #[arg(short = 'm', long, default_value = "logistic")]
    pub model: ModelKind,

    /// Keep document texts and feature matrices in the saved classifier
    #[arg(long)]
    pub keep_data: bool,

    #[command(flatten)]
    pub extraction: ExtractionArgs,
}

/// Arguments for prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Directory with the documents to classify
    #[arg(value_name = "DIR")]
    pub input_dir: PathBuf,

    /// Saved classifier
    #[arg(short, long, value_name = "PATH")]
    pub model_file: PathBuf,

    /// Type of the input files
    #[arg(short = 't', long, default_value = "pdf")]
    pub file_type: SourceType,

    /// Convert feature matrices to dense form
    #[arg(long)]
    pub dense: bool,
}

/// Arguments for model comparison
#[derive(Parser, Debug, Clone)]
pub struct CompareArgs {
    /// Directory of positive documents
    #[arg(value_name = "POSITIVE_DIR")]
    pub positive_dir: PathBuf,

    /// Directory of negative documents
    #[arg(value_name = "NEGATIVE_DIR")]
    pub negative_dir: PathBuf,

    /// Number of random splits per model
    #[arg(short, long, default_value = "10")]
    pub rounds: usize,

    /// Share of documents used for training in each split
    #[arg(long, default_value = "0.8")]
    pub training_ratio: f64,

    /// Models to compare (default: all)
    #[arg(short = 'm', long = "model", value_delimiter = ',')]
    pub models: Vec<ModelKind>,

    #[command(flatten)]
    pub extraction: ExtractionArgs,
}

/// Arguments for text conversion
#[derive(Parser, Debug, Clone)]
pub struct ConvertArgs {
    /// Document to convert
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Type of the input file
    #[arg(long = "from", default_value = "pdf")]
    pub from: SourceType,
}

/// Arguments for the vocabulary export
#[derive(Parser, Debug, Clone)]
pub struct FeaturesArgs {
    /// Saved classifier
    #[arg(short, long, value_name = "PATH")]
    pub model_file: PathBuf,

    /// Write the export to this file instead of standard output
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
