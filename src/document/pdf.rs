//! PDF text extraction.

use std::fs;
use std::panic;
use std::path::Path;

use log::{debug, warn};

use crate::error::Result;

/// Read a PDF file and extract the text of all its pages.
///
/// The file is read into memory in one go, so the handle is closed before
/// parsing starts. Opening or reading the file fails with an I/O error; a file
/// that does not parse as a PDF yields `Ok(None)`.
pub fn read_pdf_text<P: AsRef<Path>>(path: P) -> Result<Option<String>> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let text = extract_pdf_text(&bytes);
    if text.is_none() {
        warn!("Could not extract text from PDF {}", path.display());
    }
    Ok(text)
}

/// Extract the text of all pages of an in-memory PDF.
///
/// Returns `None` when the bytes are not a readable PDF. The parser is allowed
/// to panic on malformed input; such panics are contained and reported as
/// `None` as well, never as a partial string.
pub fn extract_pdf_text(bytes: &[u8]) -> Option<String> {
    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => {
            debug!("PDF extraction produced {} characters", text.len());
            Some(text)
        }
        Ok(Err(e)) => {
            debug!("PDF extraction failed: {e}");
            None
        }
        Err(_) => {
            debug!("PDF parser panicked on malformed input");
            None
        }
    }
}
