//! Precision, recall and accuracy.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::Label;
use crate::error::{PaperclassError, Result};

/// Label treated as the positive class in binary evaluation.
pub const POSITIVE_LABEL: Label = 1;

/// Evaluation of a classifier on a labeled partition.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestResults {
    /// Share of positive predictions that were correct.
    pub precision: f64,
    /// Share of actual positives that were found.
    pub recall: f64,
    /// Share of all predictions that were correct.
    pub accuracy: f64,
}

impl fmt::Display for TestResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.precision, self.recall, self.accuracy)
    }
}

/// Compare predictions with the true labels.
///
/// When every label is 0 or 1 the task is scored as binary with
/// [`POSITIVE_LABEL`] as the positive class. Otherwise precision and recall
/// are averaged over all labels seen (macro average). A ratio whose
/// denominator is zero counts as 0.
pub fn evaluate(truth: &[Label], predicted: &[Label]) -> Result<TestResults> {
    if truth.len() != predicted.len() {
        return Err(PaperclassError::model(format!(
            "{} true labels but {} predictions",
            truth.len(),
            predicted.len()
        )));
    }

    let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    let accuracy = ratio(correct, truth.len());

    let labels: BTreeSet<Label> = truth.iter().chain(predicted).copied().collect();
    let binary = labels.iter().all(|&l| l == 0 || l == 1);

    let (precision, recall) = if binary {
        precision_recall(truth, predicted, POSITIVE_LABEL)
    } else {
        let per_label: Vec<(f64, f64)> = labels
            .iter()
            .map(|&label| precision_recall(truth, predicted, label))
            .collect();
        let n = per_label.len().max(1) as f64;
        (
            per_label.iter().map(|(p, _)| p).sum::<f64>() / n,
            per_label.iter().map(|(_, r)| r).sum::<f64>() / n,
        )
    };

    Ok(TestResults {
        precision,
        recall,
        accuracy,
    })
}

fn precision_recall(truth: &[Label], predicted: &[Label], label: Label) -> (f64, f64) {
    let mut true_positive = 0;
    let mut predicted_positive = 0;
    let mut actual_positive = 0;
    for (&t, &p) in truth.iter().zip(predicted) {
        if p == label {
            predicted_positive += 1;
            if t == label {
                true_positive += 1;
            }
        }
        if t == label {
            actual_positive += 1;
        }
    }
    (
        ratio(true_positive, predicted_positive),
        ratio(true_positive, actual_positive),
    )
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
