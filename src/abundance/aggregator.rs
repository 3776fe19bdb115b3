use std::collections::HashMap;

use rayon::prelude::*;

use crate::abundance::summary::{AbundanceSummary, CategoryCount, SpeciesAbundance};
use crate::core::types::{count_to_f64, Classification, ReadClassification};

/// Share of `count` in `total` as a percentage; 0 when `total` is 0
fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count_to_f64(count) / count_to_f64(total) * 100.0
    }
}

/// Incremental counter of classifications.
///
/// Species are remembered in order of first appearance, which is the tie-break
/// when ranking equal counts.
#[derive(Debug, Clone, Default)]
pub struct AbundanceAggregator {
    species: Vec<(String, usize)>,
    positions: HashMap<String, usize>,
    unclassified: usize,
    too_short: usize,
    confidence_sum: f64,
    confidence_reads: usize,
}

impl AbundanceAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one classification
    pub fn add(&mut self, classification: &Classification) {
        match classification {
            Classification::Species(label) => self.add_species(label, 1),
            Classification::Unclassified => self.unclassified += 1,
            Classification::TooShort => self.too_short += 1,
        }
    }

    /// Count one read, also accumulating its confidence if classified
    pub fn add_read(&mut self, read: &ReadClassification) {
        self.add(&read.classification);
        if read.classification.is_classified() {
            self.confidence_sum += read.confidence();
            self.confidence_reads += 1;
        }
    }

    pub fn extend<'a, I>(&mut self, classifications: I)
    where
        I: IntoIterator<Item = &'a Classification>,
    {
        for classification in classifications {
            self.add(classification);
        }
    }

    /// Combine with an aggregator over reads that come after this one's.
    ///
    /// Species first seen in `later` are ordered after those already seen
    /// here, so merging adjacent chunks left to right gives the same ranking
    /// as one sequential pass.
    #[must_use]
    pub fn merge(mut self, later: Self) -> Self {
        for (label, count) in later.species {
            self.add_species(&label, count);
        }
        self.unclassified += later.unclassified;
        self.too_short += later.too_short;
        self.confidence_sum += later.confidence_sum;
        self.confidence_reads += later.confidence_reads;
        self
    }

    /// Reads counted so far
    #[must_use]
    pub fn total_reads(&self) -> usize {
        self.total_classified() + self.unclassified + self.too_short
    }

    #[must_use]
    pub fn total_classified(&self) -> usize {
        self.species.iter().map(|(_, count)| count).sum()
    }

    /// Produce the ranked summary
    #[must_use]
    pub fn finish(&self) -> AbundanceSummary {
        let total_reads = self.total_reads();
        let total_classified = self.total_classified();

        let mut species: Vec<SpeciesAbundance> = self
            .species
            .iter()
            .map(|(label, count)| SpeciesAbundance {
                species: label.clone(),
                count: *count,
                percentage: percentage(*count, total_classified),
            })
            .collect();
        // Stable sort keeps first-appearance order among equal counts
        species.sort_by(|a, b| b.count.cmp(&a.count));

        let mean_confidence = (self.confidence_reads > 0)
            .then(|| self.confidence_sum / count_to_f64(self.confidence_reads));

        AbundanceSummary {
            total_reads,
            total_classified,
            classified_percentage: percentage(total_classified, total_reads),
            species,
            unclassified: CategoryCount {
                count: self.unclassified,
                percentage: percentage(self.unclassified, total_reads),
            },
            too_short: CategoryCount {
                count: self.too_short,
                percentage: percentage(self.too_short, total_reads),
            },
            mean_confidence,
        }
    }

    fn add_species(&mut self, label: &str, count: usize) {
        if let Some(&pos) = self.positions.get(label) {
            self.species[pos].1 += count;
        } else {
            self.positions.insert(label.to_string(), self.species.len());
            self.species.push((label.to_string(), count));
        }
    }
}

/// Summarize a classification sequence
#[must_use]
pub fn summarize(classifications: &[Classification]) -> AbundanceSummary {
    let mut aggregator = AbundanceAggregator::new();
    aggregator.extend(classifications);
    aggregator.finish()
}

/// Summarize per-read results, including mean confidence
#[must_use]
pub fn summarize_reads(reads: &[ReadClassification]) -> AbundanceSummary {
    let mut aggregator = AbundanceAggregator::new();
    for read in reads {
        aggregator.add_read(read);
    }
    aggregator.finish()
}

/// Summarize per-read results with chunked counting on the rayon pool.
///
/// Chunks are merged in input order, so the ranking equals [`summarize_reads`].
#[must_use]
pub fn summarize_reads_parallel(reads: &[ReadClassification], chunk_size: usize) -> AbundanceSummary {
    reads
        .par_chunks(chunk_size.max(1))
        .map(|chunk| {
            let mut aggregator = AbundanceAggregator::new();
            for read in chunk {
                aggregator.add_read(read);
            }
            aggregator
        })
        .reduce(AbundanceAggregator::new, AbundanceAggregator::merge)
        .finish()
}
