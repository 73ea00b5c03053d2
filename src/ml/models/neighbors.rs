//! Cosine k-nearest-neighbour classification.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{UnitRow, check_training_data, cosine, not_fitted, unit_rows};
use crate::document::Label;
use crate::error::{PaperclassError, Result};
use crate::features::matrix::FeatureMatrix;
use crate::ml::estimator::Estimator;

/// Majority vote of the `k` most similar training documents.
///
/// A tied vote goes to the label with the larger summed similarity, then to
/// the smaller label.
#[derive(Debug, Serialize, Deserialize)]
pub struct NearestNeighbors {
    k: usize,
    rows: Vec<UnitRow>,
    labels: Vec<Label>,
}

impl Default for NearestNeighbors {
    fn default() -> Self {
        NearestNeighbors {
            k: 3,
            rows: Vec::new(),
            labels: Vec::new(),
        }
    }
}

impl NearestNeighbors {
    /// Create an unfitted model voting over `k` neighbours.
    pub fn new(k: usize) -> Result<Self> {
        if k == 0 {
            return Err(PaperclassError::configuration("k must be positive"));
        }
        Ok(NearestNeighbors {
            k,
            ..Default::default()
        })
    }

    fn vote(&self, row: &[(usize, f64)]) -> Label {
        let mut similarities: Vec<(f64, usize)> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, other)| (cosine(row, other), i))
            .collect();
        similarities.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut votes: BTreeMap<Label, (usize, f64)> = BTreeMap::new();
        for &(similarity, i) in similarities.iter().take(self.k) {
            let entry = votes.entry(self.labels[i]).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += similarity;
        }

        let mut best: Option<(Label, (usize, f64))> = None;
        for (label, tally) in votes {
            let better = match best {
                None => true,
                Some((_, (count, total))) => {
                    tally.0 > count || (tally.0 == count && tally.1 > total)
                }
            };
            if better {
                best = Some((label, tally));
            }
        }
        best.map(|(label, _)| label).unwrap_or_default()
    }
}

impl Estimator for NearestNeighbors {
    fn fit(&mut self, features: &FeatureMatrix, labels: &[Label]) -> Result<()> {
        check_training_data(features, labels)?;
        self.rows = unit_rows(features);
        self.labels = labels.to_vec();
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<Label>> {
        if self.rows.is_empty() {
            return Err(not_fitted(self.name()));
        }
        Ok(unit_rows(features).iter().map(|row| self.vote(row)).collect())
    }

    fn name(&self) -> &str {
        "knn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::matrix::{SparseMatrix, SparseRows};

    #[test]
    fn test_majority_vote() {
        let rows = vec![
            vec![(0, 1.0)],
            vec![(0, 1.0), (1, 0.1)],
            vec![(0, 1.0), (1, 0.2)],
            vec![(1, 1.0)],
        ];
        let features = FeatureMatrix::Sparse(SparseMatrix::from_entries(2, rows).unwrap());
        let mut model = NearestNeighbors::new(3).unwrap();
        model.fit(&features, &[1, 0, 0, 1]).unwrap();

        let query = FeatureMatrix::Sparse(SparseMatrix::from_entries(2, vec![vec![(0, 1.0)]]).unwrap());
        // neighbours: labels 1, 0, 0
        assert_eq!(model.predict(&query).unwrap(), vec![0]);
    }

    #[test]
    fn test_zero_k() {
        assert!(NearestNeighbors::new(0).is_err());
    }
}
