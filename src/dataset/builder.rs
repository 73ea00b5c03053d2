//! Building datasets from directories of papers.

use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::dataset::Dataset;
use crate::document::{DocumentRecord, Label, SourceType, extract_text};
use crate::error::Result;

/// List the regular files below `dir`, sorted by path.
///
/// Without `recursive`, only the direct children of `dir` are listed.
/// Symbolic links are not followed.
pub fn list_document_files<P: AsRef<Path>>(dir: P, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(dir.as_ref()).min_depth(1).follow_links(false);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// File name of a path as an owned string, falling back to the full path.
pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

impl Dataset {
    /// Extract every file below `dir` and append it with the given label.
    ///
    /// Files whose text cannot be extracted are skipped with a warning.
    /// Returns the number of documents added.
    pub fn add_classified_docs<P: AsRef<Path>>(
        &mut self,
        dir: P,
        recursive: bool,
        source_type: SourceType,
        label: Label,
    ) -> Result<usize> {
        let dir = dir.as_ref();
        let files = list_document_files(dir, recursive)?;
        let mut added = 0;

        for path in &files {
            match extract_text(path, source_type)? {
                Some(text) => {
                    debug!("Adding {} with label {label}", path.display());
                    self.push(DocumentRecord::new(text, file_name_of(path), label));
                    added += 1;
                }
                None => warn!("Skipping {}: no text extracted", path.display()),
            }
        }

        info!(
            "Added {added} of {} documents from {} with label {label}",
            files.len(),
            dir.display()
        );
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_add_classified_docs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "second paper").unwrap();
        fs::write(dir.path().join("a.txt"), "first  paper").unwrap();
        fs::write(dir.path().join("bad.txt"), [0xff, 0xfe, 0x00]).unwrap();

        let mut dataset = Dataset::new();
        let added = dataset
            .add_classified_docs(dir.path(), true, SourceType::Text, 1)
            .unwrap();

        assert_eq!(added, 2);
        assert_eq!(dataset.records()[0].filename, "a.txt");
        assert_eq!(dataset.records()[0].text, "first paper");
        assert_eq!(dataset.labels(), vec![1, 1]);
    }

    #[test]
    fn test_recursion_toggle() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("top.txt"), "top").unwrap();
        fs::write(dir.path().join("nested").join("deep.txt"), "deep").unwrap();

        assert_eq!(list_document_files(dir.path(), true).unwrap().len(), 2);
        assert_eq!(list_document_files(dir.path(), false).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut dataset = Dataset::new();
        assert!(
            dataset
                .add_classified_docs(dir.path().join("absent"), true, SourceType::Text, 0)
                .is_err()
        );
    }
}
