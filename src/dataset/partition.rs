//! Random train/test partitioning.

use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::dataset::{Dataset, Partitions};
use crate::error::{PaperclassError, Result};

/// Default share of documents assigned to the training partition.
pub const DEFAULT_TRAINING_RATIO: f64 = 0.8;

/// Splits documents into training and test partitions with an owned RNG.
#[derive(Debug)]
pub struct Partitioner<R: Rng> {
    rng: R,
}

impl Partitioner<StdRng> {
    /// A partitioner whose splits are reproducible when `seed` is given and
    /// seeded from the operating system otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Partitioner { rng }
    }
}

impl<R: Rng> Partitioner<R> {
    /// Wrap an existing random number generator.
    pub fn new(rng: R) -> Self {
        Partitioner { rng }
    }

    /// Shuffle all documents and split them by `ratio`.
    ///
    /// Documents already in the partitions are recombined first, so the same
    /// collection can be split again any number of times. The first
    /// `floor(n * ratio)` shuffled documents form the training partition and
    /// the rest the test partition. The unsplit dataset is left empty and all
    /// features are dropped.
    pub fn split(&mut self, partitions: &mut Partitions, ratio: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(PaperclassError::configuration(format!(
                "training ratio must lie in [0, 1], got {ratio}"
            )));
        }

        if !partitions.training_set.is_empty() || !partitions.test_set.is_empty() {
            partitions.recombine();
        }

        let mut records = partitions.dataset.take_records();
        records.shuffle(&mut self.rng);

        let n_training = (records.len() as f64 * ratio).floor() as usize;
        let test_records = records.split_off(n_training);

        info!(
            "Split {} documents into {} training and {} test documents",
            n_training + test_records.len(),
            n_training,
            test_records.len()
        );

        partitions.training_set = Dataset::from_records(records);
        partitions.test_set = Dataset::from_records(test_records);
        Ok(())
    }
}
