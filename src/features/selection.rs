//! Univariate feature selection with the chi-squared statistic.

use serde::{Deserialize, Serialize};

use crate::document::Label;
use crate::error::{PaperclassError, Result};
use crate::features::matrix::{SparseMatrix, SparseRows};

/// Columns kept by feature selection, best first, with their scores.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureSelection {
    /// Selected columns of the vectorizer output, in descending score order.
    pub columns: Vec<usize>,
    /// Chi-squared score of each selected column, aligned with `columns`.
    pub scores: Option<Vec<f64>>,
}

impl FeatureSelection {
    /// Select the `k` best columns of `features` for predicting `labels`.
    pub fn fit(features: &SparseMatrix, labels: &[Label], k: usize) -> Result<Self> {
        let all_scores = chi2(features, labels)?;
        let columns = top_k(&all_scores, k);
        let scores = columns.iter().map(|&c| all_scores[c]).collect();
        Ok(FeatureSelection {
            columns,
            scores: Some(scores),
        })
    }

    /// Number of selected columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Chi-squared statistic between every column and the class labels.
///
/// Observed values are the per-class column sums; expected values are the
/// column sums spread over the classes by their prior. Classes whose expected
/// value is zero contribute nothing, so all-zero columns score 0.
pub fn chi2(features: &SparseMatrix, labels: &[Label]) -> Result<Vec<f64>> {
    if features.rows() != labels.len() {
        return Err(PaperclassError::analysis(format!(
            "{} feature rows but {} labels",
            features.rows(),
            labels.len()
        )));
    }

    let mut classes: Vec<Label> = labels.to_vec();
    classes.sort_unstable();
    classes.dedup();

    let n_cols = features.cols();
    let mut observed = vec![vec![0.0; n_cols]; classes.len()];
    let mut class_counts = vec![0usize; classes.len()];

    for (row, label) in features.outer_iterator().zip(labels) {
        let class = classes.binary_search(label).unwrap_or_default();
        class_counts[class] += 1;
        for (col, &value) in row.iter() {
            observed[class][col] += value;
        }
    }

    let feature_totals = features.column_sums();
    let n_rows = labels.len().max(1) as f64;
    let mut scores = vec![0.0; n_cols];
    for (class, class_observed) in observed.iter().enumerate() {
        let prior = class_counts[class] as f64 / n_rows;
        for col in 0..n_cols {
            let expected = prior * feature_totals[col];
            if expected > 0.0 {
                let diff = class_observed[col] - expected;
                scores[col] += diff * diff / expected;
            }
        }
    }
    Ok(scores)
}

/// Indices of the `k` highest scores, best first. Ties go to the lower index.
pub fn top_k(scores: &[f64], k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    order.truncate(k.min(scores.len()));
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> SparseMatrix {
        // column 0 only in positives, column 1 everywhere, column 2 only in negatives
        SparseMatrix::from_entries(
            4,
            vec![
                vec![(0, 2.0), (1, 1.0)],
                vec![(0, 1.0), (1, 1.0)],
                vec![(1, 1.0), (2, 3.0)],
                vec![(1, 1.0), (2, 1.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_chi2_scores() {
        let scores = chi2(&matrix(), &[1, 1, 0, 0]).unwrap();

        // column 0: observed (0, 3), expected (1.5, 1.5) -> 1.5 + 1.5
        assert!((scores[0] - 3.0).abs() < 1e-12);
        // column 1 is independent of the class
        assert!(scores[1].abs() < 1e-12);
        // column 2: observed (4, 0), expected (2, 2) -> 2 + 2
        assert!((scores[2] - 4.0).abs() < 1e-12);
        // column 3 never occurs
        assert_eq!(scores[3], 0.0);
    }

    #[test]
    fn test_top_k() {
        assert_eq!(top_k(&[3.0, 0.0, 4.0, 0.0], 2), vec![2, 0]);
        assert_eq!(top_k(&[1.0, 1.0, 1.0], 2), vec![0, 1]);
        assert_eq!(top_k(&[1.0], 5), vec![0]);
    }

    #[test]
    fn test_selection_fit() {
        let selection = FeatureSelection::fit(&matrix(), &[1, 1, 0, 0], 2).unwrap();
        assert_eq!(selection.columns, vec![2, 0]);
        assert_eq!(selection.len(), 2);
        let scores = selection.scores.unwrap();
        assert!(scores[0] > scores[1]);
    }

    #[test]
    fn test_label_count_mismatch() {
        assert!(chi2(&matrix(), &[1, 0]).is_err());
    }
}
