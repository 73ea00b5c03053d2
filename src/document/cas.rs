//! Textpresso CAS file handling.
//!
//! A CAS file is a gzip-compressed XMI document. The article text lives,
//! HTML-escaped, in the `sofaString` attribute. For articles converted from
//! PDF the text still carries `<_pdf .../>` layout tags; for articles
//! converted from XML the text is itself an XML document whose `<body>`
//! element holds the full text.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use flate2::read::GzDecoder;
use log::warn;
use regex::Regex;
use roxmltree::{Document, ParsingOptions};

use crate::error::Result;

static SOFA_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"sofaString="(.*)"/>"#).expect("sofaString pattern should be valid")
});

static PDF_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<_pdf.*?/>").expect("pdf tag pattern should be valid")
});

/// What the CAS payload was converted from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CasKind {
    /// Converted from a PDF; layout tags must be stripped.
    Pdf,
    /// Converted from an XML article; only the body text is kept.
    Xml,
}

/// Decompress a CAS file into a string.
///
/// Failing to open the file is an error. A stream that is not valid gzip or
/// not valid UTF-8 yields `Ok(None)`.
pub fn read_compressed_cas<P: AsRef<Path>>(path: P) -> Result<Option<String>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut content = String::new();
    match GzDecoder::new(file).read_to_string(&mut content) {
        Ok(_) => Ok(Some(content)),
        Err(e) => {
            warn!("Could not decompress CAS file {}: {e}", path.display());
            Ok(None)
        }
    }
}

/// Pull the article text out of decompressed CAS content.
///
/// Returns `None` when there is no `sofaString` attribute, or, for XML
/// payloads, when the payload does not parse or has no `<body>` element.
/// The result is not whitespace-normalized.
pub fn extract_text_from_cas_content(content: &str, kind: CasKind) -> Option<String> {
    let captures = SOFA_STRING.captures(content)?;
    let fulltext = html_escape::decode_html_entities(&captures[1]);

    match kind {
        CasKind::Pdf => Some(remove_pdf_tags(&fulltext)),
        CasKind::Xml => extract_article_body(&fulltext),
    }
}

/// Remove `<_pdf .../>` layout tags. Text between two tags is kept.
pub fn remove_pdf_tags(text: &str) -> String {
    PDF_TAG.replace_all(text, "").into_owned()
}

/// Concatenate all text below the root's `<body>` child of an XML article.
pub fn extract_article_body(xml: &str) -> Option<String> {
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;

    let document = match Document::parse_with_options(xml, options) {
        Ok(document) => document,
        Err(e) => {
            warn!("Could not parse article XML: {e}");
            return None;
        }
    };

    let body = document
        .root_element()
        .children()
        .find(|node| node.is_element() && node.has_tag_name("body"))?;

    Some(
        body.descendants()
            .filter(|node| node.is_text())
            .filter_map(|node| node.text())
            .collect(),
    )
}
