//! Output formatting for CLI commands.

use std::io::{self, Write};

use serde::Serialize;

use crate::classifier::Prediction;
use crate::cli::args::{OutputFormat, PaperclassArgs};
use crate::error::Result;
use crate::ml::metrics::TestResults;

/// Rendering of a command result for people.
pub trait HumanOutput {
    /// Write the result in human-readable form.
    fn write_human(&self, out: &mut dyn Write, args: &PaperclassArgs) -> io::Result<()>;
}

/// Result structure for training.
#[derive(Debug, Serialize)]
pub struct TrainingSummary {
    pub model: String,
    pub training_documents: usize,
    pub test_documents: usize,
    pub features: usize,
    pub results: Option<TestResults>,
    pub model_file: Option<String>,
}

impl HumanOutput for TrainingSummary {
    fn write_human(&self, out: &mut dyn Write, args: &PaperclassArgs) -> io::Result<()> {
        if args.verbosity() > 1 {
            writeln!(
                out,
                "Trained {} on {} documents with {} features",
                self.model, self.training_documents, self.features
            )?;
            if let Some(path) = &self.model_file {
                writeln!(out, "Saved to {path}")?;
            }
        }
        if let Some(results) = &self.results {
            writeln!(out, "{results}")?;
        }
        Ok(())
    }
}

/// Result structure for prediction.
#[derive(Debug, Serialize)]
pub struct PredictionResults {
    pub predictions: Vec<Prediction>,
}

impl HumanOutput for PredictionResults {
    fn write_human(&self, out: &mut dyn Write, _args: &PaperclassArgs) -> io::Result<()> {
        for prediction in &self.predictions {
            match prediction.label {
                Some(label) => writeln!(out, "{} {label}", prediction.filename)?,
                None => writeln!(out, "{} None", prediction.filename)?,
            }
        }
        Ok(())
    }
}

/// Mean and variance of a metric over several rounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub mean: f64,
    pub variance: f64,
}

impl Summary {
    /// Population mean and variance. Both are 0 for no values.
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Summary {
                mean: 0.0,
                variance: 0.0,
            };
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Summary { mean, variance }
    }
}

/// Evaluation of one model over several random splits.
#[derive(Debug, Serialize)]
pub struct ModelComparison {
    pub model: String,
    pub rounds: usize,
    pub precision: Summary,
    pub recall: Summary,
    pub accuracy: Summary,
}

impl ModelComparison {
    /// Summarize the results of every round.
    pub fn new(model: &str, results: &[TestResults]) -> Self {
        let metric = |f: fn(&TestResults) -> f64| {
            Summary::of(&results.iter().map(f).collect::<Vec<_>>())
        };
        ModelComparison {
            model: model.to_string(),
            rounds: results.len(),
            precision: metric(|r| r.precision),
            recall: metric(|r| r.recall),
            accuracy: metric(|r| r.accuracy),
        }
    }
}

/// Result structure for model comparison.
#[derive(Debug, Serialize)]
pub struct ComparisonResults {
    pub models: Vec<ModelComparison>,
}

impl HumanOutput for ComparisonResults {
    fn write_human(&self, out: &mut dyn Write, _args: &PaperclassArgs) -> io::Result<()> {
        writeln!(
            out,
            "{:<14} {:>6} {:>18} {:>18} {:>18}",
            "model", "rounds", "precision", "recall", "accuracy"
        )?;
        for row in &self.models {
            writeln!(
                out,
                "{:<14} {:>6} {:>18} {:>18} {:>18}",
                row.model,
                row.rounds,
                format_summary(&row.precision),
                format_summary(&row.recall),
                format_summary(&row.accuracy)
            )?;
        }
        Ok(())
    }
}

/// Result structure for text conversion.
#[derive(Debug, Serialize)]
pub struct ConvertedText {
    pub file: String,
    pub text: String,
}

impl HumanOutput for ConvertedText {
    fn write_human(&self, out: &mut dyn Write, _args: &PaperclassArgs) -> io::Result<()> {
        writeln!(out, "{}", self.text)
    }
}

/// One exported vocabulary entry.
#[derive(Debug, Serialize)]
pub struct FeatureScore {
    pub term: String,
    pub score: f64,
}

/// Result structure for the vocabulary export.
#[derive(Debug, Serialize)]
pub struct FeatureList {
    pub features: Vec<FeatureScore>,
}

impl HumanOutput for FeatureList {
    fn write_human(&self, out: &mut dyn Write, _args: &PaperclassArgs) -> io::Result<()> {
        for feature in &self.features {
            writeln!(out, "{}\t{}", feature.term, feature.score)?;
        }
        Ok(())
    }
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize + HumanOutput>(
    result: &T,
    args: &PaperclassArgs,
    out: &mut dyn Write,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => result.write_human(out, args)?,
        OutputFormat::Json => output_json(result, args, out)?,
    }
    Ok(())
}

fn output_json<T: Serialize>(result: &T, args: &PaperclassArgs, out: &mut dyn Write) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    writeln!(out, "{json}")?;
    Ok(())
}

fn format_summary(summary: &Summary) -> String {
    format!("{:.4} ± {:.4}", summary.mean, summary.variance)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn render<T: Serialize + HumanOutput>(result: &T, flags: &[&str]) -> String {
        let mut argv = vec!["paperclass"];
        argv.extend_from_slice(flags);
        argv.extend_from_slice(&["convert", "a.txt"]);
        let args = PaperclassArgs::try_parse_from(argv).unwrap();
        let mut out = Vec::new();
        output_result(result, &args, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_prediction_rows() {
        let results = PredictionResults {
            predictions: vec![
                Prediction {
                    filename: "a.pdf".to_string(),
                    label: Some(1),
                },
                Prediction {
                    filename: "broken.pdf".to_string(),
                    label: None,
                },
            ],
        };
        assert_eq!(render(&results, &[]), "a.pdf 1\nbroken.pdf None\n");
    }

    #[test]
    fn test_training_summary_lines() {
        let summary = TrainingSummary {
            model: "logistic".to_string(),
            training_documents: 8,
            test_documents: 2,
            features: 40,
            results: Some(TestResults {
                precision: 1.0,
                recall: 0.5,
                accuracy: 0.75,
            }),
            model_file: Some("model.pcls".to_string()),
        };
        assert_eq!(render(&summary, &[]), "1\t0.5\t0.75\n");
        assert_eq!(
            render(&summary, &["-v"]),
            "Trained logistic on 8 documents with 40 features\nSaved to model.pcls\n1\t0.5\t0.75\n"
        );
    }

    #[test]
    fn test_summary() {
        let summary = Summary::of(&[1.0, 0.5, 0.0]);
        assert!((summary.mean - 0.5).abs() < 1e-12);
        assert!((summary.variance - 1.0 / 6.0).abs() < 1e-12);
        assert_eq!(Summary::of(&[]).mean, 0.0);
    }

    #[test]
    fn test_model_comparison() {
        let results = [
            TestResults {
                precision: 1.0,
                recall: 0.5,
                accuracy: 0.75,
            },
            TestResults {
                precision: 0.5,
                recall: 0.5,
                accuracy: 0.25,
            },
        ];
        let comparison = ModelComparison::new("logistic", &results);
        assert_eq!(comparison.rounds, 2);
        assert!((comparison.precision.mean - 0.75).abs() < 1e-12);
        assert_eq!(comparison.recall.variance, 0.0);
        assert!((comparison.accuracy.mean - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_prediction_json() {
        let results = PredictionResults {
            predictions: vec![
                Prediction {
                    filename: "a.pdf".to_string(),
                    label: Some(1),
                },
                Prediction {
                    filename: "b.pdf".to_string(),
                    label: None,
                },
            ],
        };
        let json = serde_json::to_string(&results).unwrap();
        assert_eq!(
            json,
            r#"{"predictions":[{"filename":"a.pdf","label":1},{"filename":"b.pdf","label":null}]}"#
        );
    }
}
