//! Command implementations for the paperclass CLI.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::{info, warn};

use crate::classifier::DocumentClassifier;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::dataset::partition::DEFAULT_TRAINING_RATIO;
use crate::document::{Label, extract_text};
use crate::error::{PaperclassError, Result};
use crate::features::FeatureExtraction;
use crate::ml::metrics::TestResults;
use crate::ml::models::{Model, ModelKind};

/// Label of documents in the positive directory.
pub const POSITIVE: Label = 1;
/// Label of documents in the negative directory.
pub const NEGATIVE: Label = 0;

/// Execute a CLI command, writing results to standard output.
pub fn execute_command(args: PaperclassArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute_command_to(args, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Execute a CLI command, writing results to `out`.
pub fn execute_command_to(args: PaperclassArgs, out: &mut dyn Write) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args, &args, out),
        Command::Predict(predict_args) => predict(predict_args, &args, out),
        Command::Compare(compare_args) => compare(compare_args, &args, out),
        Command::Convert(convert_args) => convert(convert_args, &args, out),
        Command::Features(features_args) => features(features_args, &args, out),
    }
}

fn new_classifier(seed: Option<u64>) -> DocumentClassifier<Model> {
    match seed {
        Some(seed) => DocumentClassifier::with_seed(seed),
        None => DocumentClassifier::new(),
    }
}

/// Load the positive and negative documents into an empty classifier.
fn load_corpus(
    classifier: &mut DocumentClassifier<Model>,
    positive_dir: &Path,
    negative_dir: &Path,
    extraction: &ExtractionArgs,
) -> Result<()> {
    let recursive = extraction.recursive();
    let positives =
        classifier.add_classified_docs(positive_dir, recursive, extraction.file_type, POSITIVE)?;
    let negatives =
        classifier.add_classified_docs(negative_dir, recursive, extraction.file_type, NEGATIVE)?;
    info!("Loaded {positives} positive and {negatives} negative documents");

    if positives + negatives == 0 {
        return Err(PaperclassError::configuration(format!(
            "no {} documents found in {} or {}",
            extraction.file_type,
            positive_dir.display(),
            negative_dir.display()
        )));
    }
    Ok(())
}

/// Train a classifier, optionally evaluate it, and save it.
fn train(args: &TrainArgs, cli_args: &PaperclassArgs, out: &mut dyn Write) -> Result<()> {
    let settings = args.extraction.feature_extraction()?;
    let mut classifier = new_classifier(args.extraction.seed);
    load_corpus(
        &mut classifier,
        &args.training_dir.join("positive"),
        &args.training_dir.join("negative"),
        &args.extraction,
    )?;

    let ratio = if args.test { DEFAULT_TRAINING_RATIO } else { 1.0 };
    classifier.generate_training_and_test_sets(ratio)?;
    classifier.extract_features(&settings)?;
    classifier.train(args.model.build(), args.extraction.dense)?;

    let results = if args.test {
        Some(classifier.test(false, args.extraction.dense)?)
    } else {
        None
    };

    if let Some(path) = &args.model_file {
        classifier.save(path, !args.keep_data)?;
    }

    output_result(
        &TrainingSummary {
            model: args.model.as_str().to_string(),
            training_documents: classifier.training_set().len(),
            test_documents: classifier.test_set().len(),
            features: classifier.vocabulary().map_or(0, |v| v.len()),
            results,
            model_file: args
                .model_file
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
        },
        cli_args,
        out,
    )
}

/// Classify a directory of documents with a saved classifier.
fn predict(args: &PredictArgs, cli_args: &PaperclassArgs, out: &mut dyn Write) -> Result<()> {
    let classifier: DocumentClassifier<Model> = DocumentClassifier::load(&args.model_file)?;
    let predictions = classifier.predict_files(&args.input_dir, args.file_type, args.dense)?;
    output_result(&PredictionResults { predictions }, cli_args, out)
}

/// Evaluate every requested model over several random splits.
fn compare(args: &CompareArgs, cli_args: &PaperclassArgs, out: &mut dyn Write) -> Result<()> {
    if args.rounds == 0 {
        return Err(PaperclassError::configuration("rounds must be positive"));
    }
    let settings = args.extraction.feature_extraction()?;
    let mut classifier = new_classifier(args.extraction.seed);
    load_corpus(
        &mut classifier,
        &args.positive_dir,
        &args.negative_dir,
        &args.extraction,
    )?;

    let kinds: &[ModelKind] = if args.models.is_empty() {
        ModelKind::all()
    } else {
        &args.models
    };

    let mut models = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        match evaluate_model(&mut classifier, kind, args, &settings) {
            Ok(results) => models.push(ModelComparison::new(kind.as_str(), &results)),
            Err(e) => warn!("Skipping {}: {e}", kind.as_str()),
        }
    }

    output_result(&ComparisonResults { models }, cli_args, out)
}

fn evaluate_model(
    classifier: &mut DocumentClassifier<Model>,
    kind: ModelKind,
    args: &CompareArgs,
    settings: &FeatureExtraction,
) -> Result<Vec<TestResults>> {
    let mut results = Vec::with_capacity(args.rounds);
    for round in 1..=args.rounds {
        classifier.generate_training_and_test_sets(args.training_ratio)?;
        // each split learns its own vocabulary
        classifier.clear_vocabulary();
        classifier.extract_features(settings)?;
        classifier.train(kind.build(), args.extraction.dense)?;
        let round_results = classifier.test(false, args.extraction.dense)?;
        info!("{} round {round}: {round_results}", kind.as_str());
        results.push(round_results);
    }
    Ok(results)
}

/// Print the text extracted from one document.
fn convert(args: &ConvertArgs, cli_args: &PaperclassArgs, out: &mut dyn Write) -> Result<()> {
    let text = extract_text(&args.file, args.from)?.ok_or_else(|| {
        PaperclassError::extraction(format!(
            "no text could be extracted from {} as {}",
            args.file.display(),
            args.from
        ))
    })?;
    output_result(
        &ConvertedText {
            file: args.file.to_string_lossy().to_string(),
            text,
        },
        cli_args,
        out,
    )
}

/// Export the vocabulary of a saved classifier.
fn features(args: &FeaturesArgs, cli_args: &PaperclassArgs, out: &mut dyn Write) -> Result<()> {
    let classifier: DocumentClassifier<Model> = DocumentClassifier::load(&args.model_file)?;

    if let Some(path) = &args.output {
        classifier.export_vocabulary(BufWriter::new(File::create(path)?))?;
        info!("Wrote vocabulary to {}", path.display());
        return Ok(());
    }

    let features = classifier
        .features_with_importance()
        .into_iter()
        .map(|(term, score)| FeatureScore { term, score })
        .collect();
    output_result(&FeatureList { features }, cli_args, out)
}
