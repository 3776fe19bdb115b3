//! End-to-end runs wiring sources, the index builder, the classifier and the
//! abundance summary together under one [`AnalysisConfig`].

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::abundance::aggregator::{summarize_reads, summarize_reads_parallel};
use crate::abundance::summary::AbundanceSummary;
use crate::classify::cancel::CancellationToken;
use crate::classify::engine::{ClassifyError, ReadClassifier};
use crate::core::config::{AnalysisConfig, ConfigError};
use crate::core::sequence::{Read, ReferenceGenome};
use crate::core::types::ReadClassification;
use crate::index::builder::{BuildReport, IndexError, KmerIndexBuilder};
use crate::index::store::KmerIndex;
use crate::observer::ProgressObserver;
use crate::parsing::{fasta, open_reads, require_exists, SourceError};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error("Failed to create thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A reference FASTA file and the species label for all of its records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSource {
    pub path: PathBuf,
    pub label: String,
}

impl ReferenceSource {
    pub fn new(path: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
        }
    }
}

/// Everything produced by a full run
#[derive(Debug, Clone)]
pub struct Analysis {
    pub report: BuildReport,
    pub classifications: Vec<ReadClassification>,
    pub summary: AbundanceSummary,
}

/// Build an index from reference files, in the order given.
///
/// Every path is checked for existence before any file is read.
///
/// # Errors
///
/// Returns `PipelineError::Config` for an invalid config,
/// `PipelineError::Index` if a source is missing, unreadable or corrupt, or if
/// no reference is long enough for k, and `PipelineError::ThreadPool` if the
/// requested pool cannot be created.
pub fn build_index(
    sources: &[ReferenceSource],
    config: &AnalysisConfig,
    observer: &dyn ProgressObserver,
) -> Result<(KmerIndex, BuildReport), PipelineError> {
    config.validate()?;
    for source in sources {
        require_exists(&source.path).map_err(IndexError::from)?;
    }

    in_pool(config, || {
        let genomes = read_sources(sources, config.parallel)?;
        let mut builder =
            KmerIndexBuilder::with_observer(config.kmer_size, observer)?.parallel(config.parallel);
        builder.add_genomes(&genomes);
        Ok(builder.build()?)
    })
}

/// Parse every reference file and concatenate the records in source order.
///
/// Nothing is indexed until all files parse. When several fail, the error of
/// the earliest source is returned.
fn read_sources(
    sources: &[ReferenceSource],
    parallel: bool,
) -> Result<Vec<ReferenceGenome>, IndexError> {
    let parsed: Vec<Vec<ReferenceGenome>> = if parallel {
        sources
            .par_iter()
            .map(read_source)
            .collect::<Vec<_>>()
            .into_iter()
            .collect::<Result<_, _>>()?
    } else {
        sources.iter().map(read_source).collect::<Result<_, _>>()?
    };
    Ok(parsed.into_iter().flatten().collect())
}

fn read_source(source: &ReferenceSource) -> Result<Vec<ReferenceGenome>, SourceError> {
    debug!("Loading reference {} as '{}'", source.path.display(), source.label);
    fasta::read_references(&source.path, &source.label)
}

/// Classify every read of a FASTQ or FASTA file against `index`.
///
/// Results are in input order.
///
/// # Errors
///
/// Returns `PipelineError::Classify` if `config.kmer_size` differs from the
/// index, if the read source is missing or corrupt, or if `cancel` is set
/// during the run.
pub fn classify_file(
    index: &KmerIndex,
    path: &Path,
    config: &AnalysisConfig,
    observer: &dyn ProgressObserver,
    cancel: Option<CancellationToken>,
) -> Result<Vec<ReadClassification>, PipelineError> {
    let classifier = classifier_for(index, config, observer, cancel)?;
    require_exists(path).map_err(ClassifyError::from)?;
    let reads = open_reads(path).map_err(ClassifyError::from)?;

    in_pool(config, || {
        let results = if config.parallel {
            classifier.classify_all_parallel(reads, config.batch_size)?
        } else {
            classifier.classify_all(reads)?
        };
        debug!("Classified {} reads from {}", results.len(), path.display());
        Ok(results)
    })
}

/// Classify reads already held in memory against `index`.
///
/// Results are in input order. A parallel run classifies the whole slice as
/// one batch.
///
/// # Errors
///
/// Returns `PipelineError::Classify` if `config.kmer_size` differs from the
/// index or if `cancel` is set during the run.
pub fn classify_reads(
    index: &KmerIndex,
    reads: &[Read],
    config: &AnalysisConfig,
    observer: &dyn ProgressObserver,
    cancel: Option<CancellationToken>,
) -> Result<Vec<ReadClassification>, PipelineError> {
    let classifier = classifier_for(index, config, observer, cancel)?;

    in_pool(config, || {
        let results = if config.parallel {
            classifier.classify_parallel(reads)?
        } else {
            classifier.classify_all(reads.iter().cloned().map(Ok))?
        };
        Ok(results)
    })
}

fn classifier_for<'a>(
    index: &'a KmerIndex,
    config: &AnalysisConfig,
    observer: &'a dyn ProgressObserver,
    cancel: Option<CancellationToken>,
) -> Result<ReadClassifier<'a>, PipelineError> {
    config.validate()?;
    if config.kmer_size != index.k() {
        return Err(ClassifyError::KmerSizeMismatch {
            index: index.k(),
            requested: config.kmer_size,
        }
        .into());
    }

    let classifier = ReadClassifier::new(index).with_observer(observer);
    Ok(match cancel {
        Some(token) => classifier.with_cancellation(token),
        None => classifier,
    })
}

/// Summarize classifications, chunked on the rayon pool when parallel
#[must_use]
pub fn summarize(classifications: &[ReadClassification], config: &AnalysisConfig) -> AbundanceSummary {
    if config.parallel {
        summarize_reads_parallel(classifications, config.batch_size)
    } else {
        summarize_reads(classifications)
    }
}

/// Build, classify and summarize in one call.
///
/// # Errors
///
/// Propagates any error from [`build_index`] or [`classify_file`].
pub fn analyze(
    sources: &[ReferenceSource],
    reads: &Path,
    config: &AnalysisConfig,
    observer: &dyn ProgressObserver,
) -> Result<Analysis, PipelineError> {
    let (index, report) = build_index(sources, config, observer)?;
    let classifications = classify_file(&index, reads, config, observer, None)?;
    let summary = summarize(&classifications, config);
    Ok(Analysis {
        report,
        classifications,
        summary,
    })
}

/// Run `op` on a dedicated pool when a thread count is configured for a
/// parallel run, otherwise on the current thread (and the global pool)
fn in_pool<T, F>(config: &AnalysisConfig, op: F) -> Result<T, PipelineError>
where
    T: Send,
    F: FnOnce() -> Result<T, PipelineError> + Send,
{
    match config.threads {
        Some(threads) if config.parallel => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
            pool.install(op)
        }
        _ => op(),
    }
}
