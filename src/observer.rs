//! Progress hooks invoked at record boundaries.
//!
//! The index builder and read classifier never log directly from their inner
//! loops; they call a [`ProgressObserver`] once per reference record and once
//! per read. [`NoopObserver`] keeps the phases silent (the default in tests),
//! [`LoggingObserver`] forwards events to `tracing`.

use tracing::{info, warn};

use crate::index::builder::SkippedReference;
use crate::index::store::IndexedReference;

/// Receives progress events from the indexing and classification phases.
///
/// Implementations must be `Sync`: parallel classification reports from
/// worker threads.
pub trait ProgressObserver: Sync {
    /// A reference record was added to the index
    fn reference_indexed(&self, _reference: &IndexedReference, _distinct_kmers: usize) {}

    /// A reference record was shorter than k and skipped
    fn reference_skipped(&self, _reference: &SkippedReference) {}

    /// `processed` reads have been classified so far
    fn reads_processed(&self, _processed: usize) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}

/// Observer that logs through `tracing`, reporting read progress every
/// `interval` reads
#[derive(Debug, Clone, Copy)]
pub struct LoggingObserver {
    interval: usize,
}

impl LoggingObserver {
    #[must_use]
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
        }
    }
}

impl ProgressObserver for LoggingObserver {
    fn reference_indexed(&self, reference: &IndexedReference, distinct_kmers: usize) {
        info!(
            "Indexed '{}' ({}, {} bp): {} distinct k-mers so far",
            reference.name, reference.label, reference.length, distinct_kmers
        );
    }

    fn reference_skipped(&self, reference: &SkippedReference) {
        warn!(
            "Skipping '{}' ({}): {} bp is shorter than k={}",
            reference.name, reference.label, reference.length, reference.kmer_size
        );
    }

    fn reads_processed(&self, processed: usize) {
        if processed % self.interval == 0 {
            info!("Classified {processed} reads...");
        }
    }
}
