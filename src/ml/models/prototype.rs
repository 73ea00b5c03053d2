//! Prototype classifier: each class is represented by its training vectors,
//! and a document goes to the class it is most similar to on average.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{UnitRow, check_training_data, cosine, not_fitted, unit_rows};
use crate::document::Label;
use crate::error::Result;
use crate::features::matrix::FeatureMatrix;
use crate::ml::estimator::Estimator;

/// Scores a document by its mean cosine similarity to the training documents
/// of every class. Ties go to the smaller label.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PrototypeClassifier {
    prototypes: BTreeMap<Label, Vec<UnitRow>>,
}

impl PrototypeClassifier {
    /// Mean similarity of `row` to every class, in label order.
    pub fn class_scores(&self, row: &[(usize, f64)]) -> Vec<(Label, f64)> {
        self.prototypes
            .iter()
            .map(|(&label, prototypes)| {
                let total: f64 = prototypes.iter().map(|p| cosine(row, p)).sum();
                (label, total / prototypes.len() as f64)
            })
            .collect()
    }
}

impl Estimator for PrototypeClassifier {
    fn fit(&mut self, features: &FeatureMatrix, labels: &[Label]) -> Result<()> {
        check_training_data(features, labels)?;
        let mut prototypes: BTreeMap<Label, Vec<UnitRow>> = BTreeMap::new();
        for (row, &label) in unit_rows(features).into_iter().zip(labels) {
            prototypes.entry(label).or_default().push(row);
        }
        self.prototypes = prototypes;
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<Label>> {
        if self.prototypes.is_empty() {
            return Err(not_fitted(self.name()));
        }
        Ok(unit_rows(features)
            .iter()
            .map(|row| {
                let mut best: Option<(Label, f64)> = None;
                for (label, score) in self.class_scores(row) {
                    if best.is_none_or(|(_, best_score)| score > best_score) {
                        best = Some((label, score));
                    }
                }
                best.map(|(label, _)| label).unwrap_or_default()
            })
            .collect())
    }

    fn name(&self) -> &str {
        "prototype"
    }
}
