//! The estimator contract.

use crate::document::Label;
use crate::error::Result;
use crate::features::matrix::FeatureMatrix;

/// A supervised classifier over feature matrices.
pub trait Estimator: Send + Sync {
    /// Fit the model to `features`, one row per entry of `labels`.
    fn fit(&mut self, features: &FeatureMatrix, labels: &[Label]) -> Result<()>;

    /// Predict one label per row of `features`.
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<Label>>;

    /// Whether the model only accepts dense matrices. The harness densifies
    /// features for such models before calling them.
    fn requires_dense(&self) -> bool {
        false
    }

    /// Get the name of this estimator for debugging and logging.
    fn name(&self) -> &str;
}
