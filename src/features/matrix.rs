//! Feature matrices.
//!
//! Bag-of-words features are overwhelmingly zero, so the vectorizer produces
//! compressed sparse rows (`sprs::CsMat`). Estimators that need a dense design
//! matrix get one through [`FeatureMatrix::to_dense`].

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use sprs::{CsMat, TriMat};

use crate::error::{PaperclassError, Result};

/// A compressed-sparse-row matrix of `f64`.
pub type SparseMatrix = CsMat<f64>;

/// Row-oriented construction and column operations on [`SparseMatrix`].
pub trait SparseRows: Sized {
    /// Build a matrix from per-row `(column, value)` entries. Entries may come
    /// in any order; zero values are dropped and repeated columns are summed.
    fn from_entries<I>(n_cols: usize, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = Vec<(usize, f64)>>;

    /// Keep only `columns`, in the given order. Output column `j` is input
    /// column `columns[j]`.
    fn select_columns(&self, columns: &[usize]) -> Result<Self>;

    /// Sum of every column.
    fn column_sums(&self) -> Vec<f64>;

    /// Non-zero `(column, value)` entries of every row, columns ascending.
    fn row_entries(&self) -> Vec<Vec<(usize, f64)>>;
}

impl SparseRows for SparseMatrix {
    fn from_entries<I>(n_cols: usize, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = Vec<(usize, f64)>>,
    {
        let rows: Vec<Vec<(usize, f64)>> = rows.into_iter().collect();
        let mut triplets = TriMat::new((rows.len(), n_cols));
        for (i, row) in rows.into_iter().enumerate() {
            for (col, value) in row {
                if col >= n_cols {
                    return Err(PaperclassError::analysis(format!(
                        "column {col} out of range for {n_cols} columns"
                    )));
                }
                if value != 0.0 {
                    triplets.add_triplet(i, col, value);
                }
            }
        }
        Ok(triplets.to_csr())
    }

    fn select_columns(&self, columns: &[usize]) -> Result<Self> {
        let mut remap = vec![None; self.cols()];
        for (new, &old) in columns.iter().enumerate() {
            let slot = remap.get_mut(old).ok_or_else(|| {
                PaperclassError::analysis(format!(
                    "cannot select column {old} of a matrix with {} columns",
                    self.cols()
                ))
            })?;
            *slot = Some(new);
        }

        let mut triplets = TriMat::new((self.rows(), columns.len()));
        for (&value, (row, col)) in self.iter() {
            if let Some(new) = remap[col] {
                triplets.add_triplet(row, new, value);
            }
        }
        Ok(triplets.to_csr())
    }

    fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.cols()];
        for (&value, (_, col)) in self.iter() {
            sums[col] += value;
        }
        sums
    }

    fn row_entries(&self) -> Vec<Vec<(usize, f64)>> {
        self.outer_iterator()
            .map(|row| row.iter().map(|(col, &value)| (col, value)).collect())
            .collect()
    }
}

/// Features of a document collection, one row per document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FeatureMatrix {
    /// Compressed sparse rows, as produced by the vectorizer.
    Sparse(SparseMatrix),
    /// A dense matrix.
    Dense(Array2<f64>),
}

impl FeatureMatrix {
    /// Number of rows (documents).
    pub fn nrows(&self) -> usize {
        match self {
            FeatureMatrix::Sparse(m) => m.rows(),
            FeatureMatrix::Dense(m) => m.nrows(),
        }
    }

    /// Number of columns (features).
    pub fn ncols(&self) -> usize {
        match self {
            FeatureMatrix::Sparse(m) => m.cols(),
            FeatureMatrix::Dense(m) => m.ncols(),
        }
    }

    /// Whether the matrix is stored densely.
    pub fn is_dense(&self) -> bool {
        matches!(self, FeatureMatrix::Dense(_))
    }

    /// Dense copy of the matrix.
    pub fn to_dense(&self) -> Array2<f64> {
        match self {
            FeatureMatrix::Sparse(m) => m.to_dense(),
            FeatureMatrix::Dense(m) => m.clone(),
        }
    }

    /// Convert into dense storage.
    pub fn into_dense(self) -> Self {
        match self {
            FeatureMatrix::Sparse(m) => FeatureMatrix::Dense(m.to_dense()),
            dense => dense,
        }
    }

    /// Non-zero entries of every row as `(column, value)` pairs.
    pub fn sparse_rows(&self) -> Vec<Vec<(usize, f64)>> {
        match self {
            FeatureMatrix::Sparse(m) => m.row_entries(),
            FeatureMatrix::Dense(m) => m
                .rows()
                .into_iter()
                .map(|row| {
                    row.iter()
                        .enumerate()
                        .filter(|&(_, &value)| value != 0.0)
                        .map(|(col, &value)| (col, value))
                        .collect()
                })
                .collect(),
        }
    }

    /// Keep only `columns`, in the given order.
    pub fn select_columns(&self, columns: &[usize]) -> Result<Self> {
        match self {
            FeatureMatrix::Sparse(m) => Ok(FeatureMatrix::Sparse(m.select_columns(columns)?)),
            FeatureMatrix::Dense(m) => {
                if let Some(&bad) = columns.iter().find(|&&c| c >= m.ncols()) {
                    return Err(PaperclassError::analysis(format!(
                        "cannot select column {bad} of a matrix with {} columns",
                        m.ncols()
                    )));
                }
                Ok(FeatureMatrix::Dense(m.select(ndarray::Axis(1), columns)))
            }
        }
    }
}
