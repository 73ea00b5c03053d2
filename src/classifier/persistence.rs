//! Saving and loading whole pipelines.
//!
//! A saved pipeline is the magic bytes `PCLS`, a little-endian `u16` format
//! version, and the bincode encoding of the pipeline state.
//!
//! Compact saves leave out document texts, partition feature matrices and
//! feature scores. A compactly saved pipeline can still classify documents,
//! but it cannot extract features or train again.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use log::info;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::classifier::DocumentClassifier;
use crate::dataset::{Dataset, Partitioner, Partitions};
use crate::document::Label;
use crate::error::{PaperclassError, Result};
use crate::features::{FeatureMatrix, FeatureSelection, Vectorizer, Vocabulary};
use crate::ml::estimator::Estimator;

/// Magic bytes at the start of every saved pipeline.
pub const MAGIC: &[u8; 4] = b"PCLS";

/// Current version of the saved pipeline layout.
pub const FORMAT_VERSION: u16 = 1;

// The borrowed views below serialize exactly like the owned types they
// mirror, field for field, so `Snapshot` can decode what `SnapshotView`
// encodes.

#[derive(Serialize)]
struct RecordView<'a> {
    text: &'a str,
    filename: &'a str,
    label: Label,
}

#[derive(Serialize)]
struct DatasetView<'a> {
    records: Vec<RecordView<'a>>,
    features: Option<&'a FeatureMatrix>,
}

impl<'a> DatasetView<'a> {
    fn new(dataset: &'a Dataset, compact: bool) -> Self {
        let records = dataset
            .records()
            .iter()
            .map(|record| RecordView {
                text: if compact { "" } else { &record.text },
                filename: &record.filename,
                label: record.label,
            })
            .collect();
        DatasetView {
            records,
            features: if compact { None } else { dataset.features() },
        }
    }
}

#[derive(Serialize)]
struct PartitionsView<'a> {
    dataset: DatasetView<'a>,
    training_set: DatasetView<'a>,
    test_set: DatasetView<'a>,
}

#[derive(Serialize)]
struct SelectionView<'a> {
    columns: &'a [usize],
    scores: Option<&'a [f64]>,
}

#[derive(Serialize)]
struct SnapshotView<'a, E> {
    partitions: PartitionsView<'a>,
    vocabulary: Option<&'a Vocabulary>,
    vectorizer: Option<&'a Vectorizer>,
    selection: Option<SelectionView<'a>>,
    classifier: Option<&'a E>,
    seed: Option<u64>,
    compact: bool,
}

#[derive(Deserialize)]
struct Snapshot<E> {
    partitions: Partitions,
    vocabulary: Option<Vocabulary>,
    vectorizer: Option<Vectorizer>,
    selection: Option<FeatureSelection>,
    classifier: Option<E>,
    seed: Option<u64>,
    compact: bool,
}

impl<E: Estimator + Serialize> DocumentClassifier<E> {
    /// Write the pipeline to `path`. With `compact`, the training data is
    /// left out of the file; the pipeline itself is unchanged.
    pub fn save<P: AsRef<Path>>(&self, path: P, compact: bool) -> Result<()> {
        let compact = compact || self.compact;
        let view = SnapshotView {
            partitions: PartitionsView {
                dataset: DatasetView::new(&self.partitions.dataset, compact),
                training_set: DatasetView::new(&self.partitions.training_set, compact),
                test_set: DatasetView::new(&self.partitions.test_set, compact),
            },
            vocabulary: self.vocabulary.as_deref(),
            vectorizer: self.vectorizer.as_ref(),
            selection: self.selection.as_ref().map(|selection| SelectionView {
                columns: &selection.columns,
                scores: if compact {
                    None
                } else {
                    selection.scores.as_deref()
                },
            }),
            classifier: self.classifier.as_ref(),
            seed: self.seed,
            compact,
        };

        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(MAGIC)?;
        writer.write_all(&FORMAT_VERSION.to_le_bytes())?;
        bincode::serde::encode_into_std_write(&view, &mut writer, bincode::config::standard())
            .map_err(|e| {
                PaperclassError::serialization(format!("Failed to encode classifier: {e}"))
            })?;
        writer.flush()?;

        info!(
            "Saved {}classifier to {}",
            if compact { "compact " } else { "" },
            path.display()
        );
        Ok(())
    }
}

impl<E: Estimator + DeserializeOwned> DocumentClassifier<E> {
    /// Read a pipeline written by [`DocumentClassifier::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(PaperclassError::serialization(format!(
                "{} is not a saved classifier",
                path.display()
            )));
        }

        let mut version = [0u8; 2];
        reader.read_exact(&mut version)?;
        let version = u16::from_le_bytes(version);
        if version != FORMAT_VERSION {
            return Err(PaperclassError::serialization(format!(
                "Unsupported classifier format version: {version}"
            )));
        }

        let snapshot: Snapshot<E> =
            bincode::serde::decode_from_std_read(&mut reader, bincode::config::standard())
                .map_err(|e| {
                    PaperclassError::serialization(format!("Failed to decode classifier: {e}"))
                })?;

        info!(
            "Loaded {}classifier from {}",
            if snapshot.compact { "compact " } else { "" },
            path.display()
        );
        Ok(DocumentClassifier {
            partitions: snapshot.partitions,
            vocabulary: snapshot.vocabulary.map(Arc::new),
            vectorizer: snapshot.vectorizer,
            selection: snapshot.selection,
            classifier: snapshot.classifier,
            seed: snapshot.seed,
            partitioner: Partitioner::from_seed(snapshot.seed),
            compact: snapshot.compact,
        })
    }
}
