//! Documents and the extraction of their plain text.
//!
//! Papers arrive either as PDF files, as gzip-compressed Textpresso CAS files
//! (which wrap a PDF conversion or an XML article), or as plain text. Every
//! source type is reduced to the same normalized plain text before analysis.
//!
//! # Examples
//!
//! ```no_run
//! use paperclass::document::{SourceType, extract_text};
//!
//! match extract_text("papers/WBPaper00001.tpcas.gz", SourceType::CasPdf).unwrap() {
//!     Some(text) => println!("{} characters", text.len()),
//!     None => println!("no text could be extracted"),
//! }
//! ```

pub mod cas;
pub mod extractor;
pub mod pdf;

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::PaperclassError;

pub use extractor::{extract_text, normalize_whitespace};

/// A class label. Binary tasks use 1 for positive and 0 for negative.
pub type Label = i32;

/// The kind of file a document is stored in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum SourceType {
    /// A PDF file.
    #[value(name = "pdf")]
    Pdf,
    /// A gzip-compressed CAS file converted from a PDF.
    #[value(name = "cas_pdf")]
    CasPdf,
    /// A gzip-compressed CAS file converted from an XML article.
    #[value(name = "cas_xml")]
    CasXml,
    /// A UTF-8 text file.
    #[value(name = "txt")]
    Text,
}

impl SourceType {
    /// Name of the source type as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Pdf => "pdf",
            SourceType::CasPdf => "cas_pdf",
            SourceType::CasXml => "cas_xml",
            SourceType::Text => "txt",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = PaperclassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(SourceType::Pdf),
            "cas_pdf" => Ok(SourceType::CasPdf),
            "cas_xml" => Ok(SourceType::CasXml),
            "txt" | "text" => Ok(SourceType::Text),
            other => Err(PaperclassError::configuration(format!(
                "unknown file type '{other}', expected pdf, cas_pdf, cas_xml or txt"
            ))),
        }
    }
}

/// A labeled document whose text has already been extracted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Normalized plain text.
    pub text: String,
    /// File name the text was read from (no directory part).
    pub filename: String,
    /// Class label assigned at ingestion time.
    pub label: Label,
}

impl DocumentRecord {
    /// Create a new record.
    pub fn new<T: Into<String>, F: Into<String>>(text: T, filename: F, label: Label) -> Self {
        DocumentRecord {
            text: text.into(),
            filename: filename.into(),
            label,
        }
    }
}
