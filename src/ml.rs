//! Classification models and their evaluation.
//!
//! Every model implements [`estimator::Estimator`], so the classifier harness
//! can train and apply any of them without knowing which one it holds.

pub mod estimator;
pub mod metrics;
pub mod models;

pub use estimator::Estimator;
pub use metrics::TestResults;
pub use models::{Model, ModelKind};
