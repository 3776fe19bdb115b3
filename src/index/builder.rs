//! K-mer index builder.
//!
//! `KmerIndexBuilder` slides a window of width k (stride 1) over each labeled
//! reference sequence and records `window -> label`, overwriting any earlier
//! owner of the same k-mer. References are applied strictly in the order they
//! are added, so a k-mer shared by two species belongs to whichever was added
//! last, on both the sequential and the parallel path.

use std::borrow::Cow;
use std::collections::HashSet;

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::core::sequence::{window_count, ReferenceGenome};
use crate::index::store::{IndexedReference, KmerIndex};
use crate::observer::{NoopObserver, ProgressObserver};
use crate::parsing::SourceError;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Invalid k-mer size: {0} (must be positive)")]
    InvalidKmerSize(usize),

    #[error("No reference sequence is at least k={0} bases long; nothing was indexed")]
    NoReferenceLoaded(usize),
}

/// A reference record skipped because it is shorter than k
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedReference {
    pub label: String,
    pub name: String,
    pub length: u64,
    pub kmer_size: usize,
}

/// Summary of an index build
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    /// Reference records that contributed k-mers
    pub indexed: usize,

    /// Records shorter than k
    pub skipped: Vec<SkippedReference>,

    /// Total windows inserted, including overwrites
    pub windows: u64,

    /// Distinct k-mers in the final index
    pub distinct_kmers: usize,
}

/// Builds a [`KmerIndex`] from labeled reference sequences
pub struct KmerIndexBuilder<'a> {
    index: KmerIndex,
    parallel: bool,
    skipped: Vec<SkippedReference>,
    windows: u64,
    observer: &'a dyn ProgressObserver,
}

impl KmerIndexBuilder<'static> {
    /// Create a builder for k-mers of length `k`
    ///
    /// # Errors
    ///
    /// Returns `IndexError::InvalidKmerSize` if `k` is zero.
    pub fn new(k: usize) -> Result<Self, IndexError> {
        Self::with_observer(k, &NoopObserver)
    }
}

impl<'a> KmerIndexBuilder<'a> {
    /// Create a builder that reports progress to `observer`
    ///
    /// # Errors
    ///
    /// Returns `IndexError::InvalidKmerSize` if `k` is zero.
    pub fn with_observer(k: usize, observer: &'a dyn ProgressObserver) -> Result<Self, IndexError> {
        if k == 0 {
            return Err(IndexError::InvalidKmerSize(k));
        }
        Ok(Self {
            index: KmerIndex::new(k),
            parallel: false,
            skipped: Vec::new(),
            windows: 0,
            observer,
        })
    }

    /// Extract k-mers on the rayon pool when adding batches of references
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub fn k(&self) -> usize {
        self.index.k()
    }

    /// Add one reference sequence.
    ///
    /// Sequences shorter than k are recorded as skipped and otherwise ignored.
    pub fn add_genome(&mut self, genome: &ReferenceGenome) {
        let k = self.index.k();
        let sequence = normalized(&genome.sequence);

        if sequence.len() < k {
            self.skip(genome);
            return;
        }

        let label = self.index.intern_label(&genome.label);
        for window in sequence.windows(k) {
            self.index.insert(window, label);
        }
        self.windows += window_count(sequence.len(), k) as u64;
        self.finish_genome(genome, &sequence);
    }

    /// Add references in order, using the parallel path if enabled
    pub fn add_genomes(&mut self, genomes: &[ReferenceGenome]) {
        if self.parallel {
            self.add_genomes_parallel(genomes);
        } else {
            for genome in genomes {
                self.add_genome(genome);
            }
        }
    }

    /// Add references with per-genome k-mer extraction on the rayon pool.
    ///
    /// Each genome's distinct windows are collected concurrently; they are then
    /// applied to the index in the original genome order, so overwrites resolve
    /// exactly as in [`add_genome`](Self::add_genome).
    pub fn add_genomes_parallel(&mut self, genomes: &[ReferenceGenome]) {
        let k = self.index.k();

        let sequences: Vec<Cow<'_, [u8]>> = genomes
            .par_iter()
            .map(|genome| normalized(&genome.sequence))
            .collect();

        let extracted: Vec<Option<Vec<&[u8]>>> = sequences
            .par_iter()
            .map(|sequence| {
                if sequence.len() < k {
                    return None;
                }
                let mut seen = HashSet::with_capacity(window_count(sequence.len(), k));
                Some(
                    sequence
                        .windows(k)
                        .filter(|window| seen.insert(*window))
                        .collect(),
                )
            })
            .collect();

        for ((genome, sequence), windows) in genomes.iter().zip(&sequences).zip(extracted) {
            let Some(windows) = windows else {
                self.skip(genome);
                continue;
            };

            let label = self.index.intern_label(&genome.label);
            for window in windows {
                self.index.insert(window, label);
            }
            self.windows += window_count(sequence.len(), k) as u64;
            self.finish_genome(genome, sequence);
        }
    }

    /// Finish the build.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::NoReferenceLoaded` if no reference was long enough
    /// to contribute a k-mer.
    pub fn build(self) -> Result<(KmerIndex, BuildReport), IndexError> {
        if self.index.references().is_empty() {
            return Err(IndexError::NoReferenceLoaded(self.index.k()));
        }

        let report = BuildReport {
            indexed: self.index.references().len(),
            skipped: self.skipped,
            windows: self.windows,
            distinct_kmers: self.index.len(),
        };
        Ok((self.index, report))
    }

    fn skip(&mut self, genome: &ReferenceGenome) {
        let skipped = SkippedReference {
            label: genome.label.clone(),
            name: genome.name.clone(),
            length: genome.sequence.len() as u64,
            kmer_size: self.index.k(),
        };
        self.observer.reference_skipped(&skipped);
        self.skipped.push(skipped);
    }

    fn finish_genome(&mut self, genome: &ReferenceGenome, sequence: &[u8]) {
        let reference = IndexedReference {
            label: genome.label.clone(),
            name: genome.name.clone(),
            length: sequence.len() as u64,
            md5: format!("{:x}", md5::compute(sequence)),
        };
        self.observer
            .reference_indexed(&reference, self.index.len());
        self.index.push_reference(reference);
    }
}

/// Uppercase view of a sequence, copying only when lowercase bases are present
fn normalized(sequence: &[u8]) -> Cow<'_, [u8]> {
    if sequence.iter().any(u8::is_ascii_lowercase) {
        Cow::Owned(sequence.to_ascii_uppercase())
    } else {
        Cow::Borrowed(sequence)
    }
}
