use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use thiserror::Error;

use crate::classify::cancel::CancellationToken;
use crate::classify::vote::VoteTally;
use crate::core::sequence::{window_count, Read};
use crate::core::types::{Classification, ReadClassification};
use crate::index::store::KmerIndex;
use crate::observer::{NoopObserver, ProgressObserver};
use crate::parsing::SourceError;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Classification cancelled after {processed} reads")]
    Cancelled { processed: usize },

    #[error("k-mer size mismatch: index was built with k={index}, but k={requested} was requested")]
    KmerSizeMismatch { index: usize, requested: usize },
}

/// Classifies reads by majority vote over their k-mers.
///
/// Holds the index by shared reference; the classifier itself is `Sync` and can
/// be used from rayon workers.
pub struct ReadClassifier<'a> {
    index: &'a KmerIndex,
    observer: &'a dyn ProgressObserver,
    cancel: Option<CancellationToken>,
}

impl<'a> ReadClassifier<'a> {
    /// Create a classifier over a built index
    #[must_use]
    pub fn new(index: &'a KmerIndex) -> Self {
        Self {
            index,
            observer: &NoopObserver,
            cancel: None,
        }
    }

    /// Report progress to `observer` after every read
    #[must_use]
    pub fn with_observer(mut self, observer: &'a dyn ProgressObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Check `token` before each read
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[must_use]
    pub fn k(&self) -> usize {
        self.index.k()
    }

    /// Classify a single read.
    ///
    /// Reads shorter than k are `TooShort`. Otherwise every stride-1 window is
    /// looked up and each hit votes for its label; no hits gives
    /// `Unclassified`, else the label with the most votes wins, ties going to
    /// the label that reached the maximum first.
    #[must_use]
    pub fn classify_read(&self, read: &Read) -> ReadClassification {
        let k = self.index.k();
        if read.len() < k {
            return ReadClassification::too_short(read.id.as_str());
        }

        let sequence: Cow<'_, [u8]> = if read.sequence.iter().any(u8::is_ascii_lowercase) {
            Cow::Owned(read.sequence.to_ascii_uppercase())
        } else {
            Cow::Borrowed(&read.sequence)
        };

        let mut tally = VoteTally::new();
        for window in sequence.windows(k) {
            if let Some(label) = self.index.get_id(window) {
                tally.vote(label);
            }
        }

        let total_kmers = window_count(sequence.len(), k);
        match tally.leader() {
            None => ReadClassification::unclassified(read.id.as_str(), total_kmers),
            Some((label, votes)) => {
                let name = self.index.label(label).unwrap_or_default();
                ReadClassification {
                    read_id: read.id.clone(),
                    classification: Classification::species(name),
                    total_kmers,
                    matched_kmers: tally.matched(),
                    winning_votes: votes,
                }
            }
        }
    }

    /// Classify a stream of reads sequentially, preserving order.
    ///
    /// The first source error aborts the pass and no results are returned.
    ///
    /// # Errors
    ///
    /// Returns `ClassifyError::Source` if the stream yields an error or
    /// `ClassifyError::Cancelled` if the cancellation token is set.
    pub fn classify_all<I>(&self, reads: I) -> Result<Vec<ReadClassification>, ClassifyError>
    where
        I: IntoIterator<Item = Result<Read, SourceError>>,
    {
        let mut results = Vec::new();
        for read in reads {
            self.check_cancelled(results.len())?;
            let read = read?;
            results.push(self.classify_read(&read));
            self.observer.reads_processed(results.len());
        }
        Ok(results)
    }

    /// Classify an in-memory batch on the rayon pool.
    ///
    /// Output order matches input order.
    ///
    /// # Errors
    ///
    /// Returns `ClassifyError::Cancelled` if the cancellation token is set.
    pub fn classify_parallel(&self, reads: &[Read]) -> Result<Vec<ReadClassification>, ClassifyError> {
        self.classify_batch(reads, 0)
    }

    /// Classify a stream in batches of `batch_size`, each batch on the rayon
    /// pool. Only one batch of reads is held in memory at a time.
    ///
    /// # Errors
    ///
    /// Returns `ClassifyError::Source` if the stream yields an error or
    /// `ClassifyError::Cancelled` if the cancellation token is set.
    pub fn classify_all_parallel<I>(
        &self,
        reads: I,
        batch_size: usize,
    ) -> Result<Vec<ReadClassification>, ClassifyError>
    where
        I: IntoIterator<Item = Result<Read, SourceError>>,
    {
        let batch_size = batch_size.max(1);
        let mut results = Vec::new();
        let mut batch = Vec::with_capacity(batch_size);

        for read in reads {
            batch.push(read?);
            if batch.len() == batch_size {
                results.extend(self.classify_batch(&batch, results.len())?);
                batch.clear();
            }
        }
        if !batch.is_empty() {
            results.extend(self.classify_batch(&batch, results.len())?);
        }

        Ok(results)
    }

    fn classify_batch(
        &self,
        reads: &[Read],
        offset: usize,
    ) -> Result<Vec<ReadClassification>, ClassifyError> {
        let processed = AtomicUsize::new(offset);

        reads
            .par_iter()
            .map(|read| {
                self.check_cancelled(processed.load(Ordering::Relaxed))?;
                let result = self.classify_read(read);
                let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
                self.observer.reads_processed(done);
                Ok(result)
            })
            .collect()
    }

    fn check_cancelled(&self, processed: usize) -> Result<(), ClassifyError> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(ClassifyError::Cancelled { processed }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sequence::ReferenceGenome;
    use crate::index::builder::KmerIndexBuilder;
    use std::path::PathBuf;

    fn index(k: usize, references: &[(&str, &str)]) -> KmerIndex {
        let mut builder = KmerIndexBuilder::new(k).unwrap();
        for (label, sequence) in references {
            builder.add_genome(&ReferenceGenome::new(*label, *label, sequence.as_bytes().to_vec()));
        }
        builder.build().unwrap().0
    }

    fn read(id: &str, sequence: &str) -> Read {
        Read::new(id, sequence.as_bytes())
    }

    #[test]
    fn test_short_read_is_too_short() {
        let index = index(5, &[("S1", "ACGTACGTAC")]);
        let classifier = ReadClassifier::new(&index);

        // Content is irrelevant when the read is shorter than k
        for sequence in ["", "A", "ACGT", "NNNN"] {
            let result = classifier.classify_read(&read("r", sequence));
            assert_eq!(result.classification, Classification::TooShort);
            assert_eq!(result.total_kmers, 0);
        }
    }

    #[test]
    fn test_no_match_is_unclassified() {
        let index = index(3, &[("S1", "AAAAAA")]);
        let result = ReadClassifier::new(&index).classify_read(&read("r", "CCCGGG"));

        assert_eq!(result.classification, Classification::Unclassified);
        assert_eq!(result.total_kmers, 4);
        assert_eq!(result.matched_kmers, 0);
    }

    #[test]
    fn test_all_kmers_match_one_species() {
        let index = index(3, &[("S1", "ACGTTGCA"), ("S2", "GGGGGG")]);
        let result = ReadClassifier::new(&index).classify_read(&read("r", "CGTTG"));

        assert_eq!(result.classification, Classification::species("S1"));
        assert_eq!(result.winning_votes, 3);
        assert!((result.confidence() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_majority_vote() {
        // k=3; read AAAAAGGGG has windows AAA AAA AAA AAG AGG GGG GGG
        // AAA x3 -> S1, GGG x2 -> S2, AAG/AGG unmatched
        let index = index(3, &[("S1", "AAAA"), ("S2", "GGGG")]);
        let result = ReadClassifier::new(&index).classify_read(&read("r", "AAAAAGGGG"));

        assert_eq!(result.classification, Classification::species("S1"));
        assert_eq!(result.total_kmers, 7);
        assert_eq!(result.matched_kmers, 5);
        assert_eq!(result.winning_votes, 3);
    }

    #[test]
    fn test_tie_goes_to_first_label_to_reach_max() {
        let index = index(3, &[("S1", "AAAA"), ("S2", "GGGG")]);
        let classifier = ReadClassifier::new(&index);

        // GGG, GGG then AAA, AAA: S2 reaches 2 first
        let result = classifier.classify_read(&read("r1", "GGGGTAAAA"));
        assert_eq!(result.classification, Classification::species("S2"));

        let result = classifier.classify_read(&read("r2", "AAAATGGGG"));
        assert_eq!(result.classification, Classification::species("S1"));
    }

    #[test]
    fn test_read_case_is_normalized() {
        let index = index(3, &[("S1", "ACGTAC")]);
        let result = ReadClassifier::new(&index).classify_read(&read("r", "acgta"));
        assert_eq!(result.classification, Classification::species("S1"));
    }

    #[test]
    fn test_classify_all_preserves_order() {
        let index = index(3, &[("S1", "AAAA"), ("S2", "GGGG")]);
        let reads = vec![
            Ok(read("r1", "GGGG")),
            Ok(read("r2", "AA")),
            Ok(read("r3", "AAAAA")),
            Ok(read("r4", "TTTT")),
        ];

        let results = ReadClassifier::new(&index).classify_all(reads).unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.read_id.as_str()).collect();
        let calls: Vec<_> = results.iter().map(|r| r.classification.clone()).collect();

        assert_eq!(ids, ["r1", "r2", "r3", "r4"]);
        assert_eq!(
            calls,
            vec![
                Classification::species("S2"),
                Classification::TooShort,
                Classification::species("S1"),
                Classification::Unclassified,
            ]
        );
    }

    #[test]
    fn test_source_error_aborts_without_partial_results() {
        let index = index(3, &[("S1", "AAAA")]);
        let reads = vec![
            Ok(read("r1", "AAAA")),
            Err(SourceError::Empty(PathBuf::from("reads.fq"))),
            Ok(read("r3", "AAAA")),
        ];

        let result = ReadClassifier::new(&index).classify_all(reads);
        assert!(matches!(result, Err(ClassifyError::Source(_))));
    }

    #[test]
    fn test_cancellation_stops_between_reads() {
        let index = index(3, &[("S1", "AAAA")]);
        let token = CancellationToken::new();
        let classifier = ReadClassifier::new(&index).with_cancellation(token.clone());

        let handle = token.clone();
        let reads = (0..10).map(move |i| {
            if i == 3 {
                handle.cancel();
            }
            Ok(read(&format!("r{i}"), "AAAA"))
        });

        assert!(matches!(
            classifier.classify_all(reads),
            Err(ClassifyError::Cancelled { processed: 3 })
        ));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let index = index(
            4,
            &[
                ("S1", "ACGTTGCAACGTAGCTAGCT"),
                ("S2", "TTGCAACGTAGCAAAAGCTA"),
                ("S3", "GGCTTTGCAACGGGCCCAAT"),
            ],
        );
        let bases = b"ACGTTGCAACGTAGCTAGCTTTGCAACGTAGCAAAAGCTAGGCTTTGCAACGGGCCCAAT";
        let reads: Vec<Read> = (0..200)
            .map(|i| {
                let start = i % 30;
                let len = 2 + i % 25;
                Read::new(format!("r{i}"), &bases[start..start + len])
            })
            .collect();

        let classifier = ReadClassifier::new(&index);
        let sequential = classifier
            .classify_all(reads.iter().cloned().map(Ok))
            .unwrap();
        let parallel = classifier.classify_parallel(&reads).unwrap();
        let batched = classifier
            .classify_all_parallel(reads.iter().cloned().map(Ok), 7)
            .unwrap();

        assert_eq!(sequential, parallel);
        assert_eq!(sequential, batched);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let index = index(3, &[("S1", "ACGTACGT"), ("S2", "TACGTTTT")]);
        let reads: Vec<Read> = ["ACGTT", "TTTTACG", "GTACGTA", "CC"]
            .iter()
            .enumerate()
            .map(|(i, s)| read(&format!("r{i}"), s))
            .collect();

        let classifier = ReadClassifier::new(&index);
        let first = classifier.classify_parallel(&reads).unwrap();
        let second = classifier.classify_parallel(&reads).unwrap();
        assert_eq!(first, second);
    }
}
