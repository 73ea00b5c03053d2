//! Error types for the paperclass library.
//!
//! Every fallible operation in the crate returns [`Result`], whose error side
//! is the [`PaperclassError`] enum.
//!
//! # Examples
//!
//! ```
//! use paperclass::error::{PaperclassError, Result};
//!
//! fn split_ratio(ratio: f64) -> Result<f64> {
//!     if !(0.0..=1.0).contains(&ratio) {
//!         return Err(PaperclassError::configuration("ratio must lie in [0, 1]"));
//!     }
//!     Ok(ratio)
//! }
//!
//! assert!(split_ratio(0.8).is_ok());
//! assert!(split_ratio(1.5).is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for paperclass operations.
#[derive(Error, Debug)]
pub enum PaperclassError {
    /// I/O errors (missing files, unreadable directories, ...)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Document text could not be extracted
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Analysis-related errors (tokenization, filtering, vocabulary fitting)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// The pipeline was asked to do something its current state does not allow
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Estimator fitting or prediction failed
    #[error("Model error: {0}")]
    Model(String),

    /// Binary (de)serialization of a saved classifier failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with PaperclassError.
pub type Result<T> = std::result::Result<T, PaperclassError>;

impl PaperclassError {
    /// Create a new extraction error.
    pub fn extraction<S: Into<String>>(msg: S) -> Self {
        PaperclassError::Extraction(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        PaperclassError::Analysis(msg.into())
    }

    /// Create a new configuration error.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        PaperclassError::Configuration(msg.into())
    }

    /// Create a new model error.
    pub fn model<S: Into<String>>(msg: S) -> Self {
        PaperclassError::Model(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        PaperclassError::Serialization(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        PaperclassError::Other(msg.into())
    }

    /// Whether this error reports a misuse of the pipeline rather than bad input data.
    pub fn is_configuration(&self) -> bool {
        matches!(self, PaperclassError::Configuration(_))
    }
}
