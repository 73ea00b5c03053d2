//! Source-type dispatch and text normalization.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;

use crate::document::SourceType;
use crate::document::cas::{self, CasKind};
use crate::document::pdf;
use crate::error::Result;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern should be valid"));

/// Collapse every whitespace run to a single space and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Extract the normalized plain text of a document.
///
/// Returns `Ok(None)` when the file exists but no text can be recovered from
/// it: a text file that is not UTF-8, a malformed PDF, a corrupt or
/// truncated CAS archive, a CAS file without a `sofaString`, or an XML
/// article without a body. The caller is expected to skip such files.
/// Missing or unreadable files are errors.
pub fn extract_text<P: AsRef<Path>>(path: P, source_type: SourceType) -> Result<Option<String>> {
    let path = path.as_ref();
    debug!("Extracting {} text from {}", source_type, path.display());

    let raw = match source_type {
        SourceType::Pdf => pdf::read_pdf_text(path)?,
        SourceType::CasPdf => read_cas(path, CasKind::Pdf)?,
        SourceType::CasXml => read_cas(path, CasKind::Xml)?,
        SourceType::Text => read_utf8(path)?,
    };

    Ok(raw.map(|text| normalize_whitespace(&text)))
}

fn read_utf8(path: &Path) -> Result<Option<String>> {
    match String::from_utf8(fs::read(path)?) {
        Ok(text) => Ok(Some(text)),
        Err(e) => {
            warn!("{} is not valid UTF-8: {e}", path.display());
            Ok(None)
        }
    }
}

fn read_cas(path: &Path, kind: CasKind) -> Result<Option<String>> {
    let Some(content) = cas::read_compressed_cas(path)? else {
        return Ok(None);
    };
    let text = cas::extract_text_from_cas_content(&content, kind);
    if text.is_none() {
        warn!("No article text found in CAS file {}", path.display());
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::*;

    fn write_gz(path: &Path, content: &str) {
        let mut encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        encoder.write_all(content.as_bytes()).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a\n\tb   c \r\n"), "a b c");
        assert_eq!(normalize_whitespace("   "), "");
    }

    #[test]
    fn test_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.txt");
        fs::write(&path, "Cell\n\ndivision  in\tembryos\n").unwrap();

        let text = extract_text(&path, SourceType::Text).unwrap();
        assert_eq!(text.as_deref(), Some("Cell division in embryos"));
    }

    #[test]
    fn test_cas_pdf_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.tpcas.gz");
        write_gz(
            &path,
            "<xmi><Sofa sofaString=\"Germ  line &lt;_pdf p=&quot;2&quot;/&gt;apoptosis\"/></xmi>",
        );

        let text = extract_text(&path, SourceType::CasPdf).unwrap();
        assert_eq!(text.as_deref(), Some("Germ line apoptosis"));
    }

    #[test]
    fn test_corrupt_cas_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.tpcas.gz");
        fs::write(&path, b"not gzip at all").unwrap();

        assert!(extract_text(&path, SourceType::CasPdf).unwrap().is_none());
    }

    #[test]
    fn test_cas_without_sofa_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.tpcas.gz");
        write_gz(&path, "<xmi></xmi>");

        assert!(extract_text(&path, SourceType::CasXml).unwrap().is_none());
    }

    #[test]
    fn test_malformed_pdf_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"%PDF-1.4 truncated").unwrap();

        assert!(extract_text(&path, SourceType::Pdf).unwrap().is_none());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(extract_text(dir.path().join("nope.txt"), SourceType::Text).is_err());
    }
}
