//! Sequence sources for reference genomes and reads.
//!
//! This module is a thin adapter over `noodles`:
//!
//! - **FASTA references**: every record becomes a [`ReferenceGenome`] carrying
//!   the label of its source file
//! - **FASTQ reads**: streamed lazily, one [`Read`] per record
//! - **FASTA reads**: streamed the same way, for callers without qualities
//!
//! Files ending in `.gz` or `.bgz` are decompressed on the fly.
//!
//! ## Example
//!
//! ```rust,no_run
//! use kmer_classify::parsing::{fasta, open_reads};
//! use std::path::Path;
//!
//! let genomes = fasta::read_references(Path::new("ecoli.fna"), "Escherichia coli").unwrap();
//!
//! for read in open_reads(Path::new("sample.fastq.gz")).unwrap() {
//!     let read = read.unwrap();
//!     println!("{} {}", read.id, read.len());
//! }
//! ```
//!
//! [`ReferenceGenome`]: crate::core::sequence::ReferenceGenome
//! [`Read`]: crate::core::sequence::Read

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use thiserror::Error;

use crate::core::sequence::Read;

pub mod fasta;
pub mod fastq;

/// Kind of record a source is expected to hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Genomic reference sequence (FASTA)
    Reference,
    /// Sequencing read (FASTQ or FASTA)
    Read,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reference => write!(f, "reference"),
            Self::Read => write!(f, "read"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Input source not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid {kind} record in {}: {message}", path.display())]
    Corrupt {
        path: PathBuf,
        kind: RecordKind,
        message: String,
    },

    #[error("No sequences found in {}", .0.display())]
    Empty(PathBuf),
}

impl SourceError {
    pub(crate) fn corrupt(path: &Path, kind: RecordKind, err: impl std::fmt::Display) -> Self {
        Self::Corrupt {
            path: path.to_path_buf(),
            kind,
            message: err.to_string(),
        }
    }
}

/// Fail fast if a source path does not exist.
///
/// # Errors
///
/// Returns `SourceError::Missing` when nothing exists at `path`.
pub fn require_exists(path: &Path) -> Result<(), SourceError> {
    if path.exists() {
        Ok(())
    } else {
        Err(SourceError::Missing(path.to_path_buf()))
    }
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub(crate) fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Lowercased file name with any compression suffix removed
pub(crate) fn uncompressed_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    name.strip_suffix(".gz")
        .or_else(|| name.strip_suffix(".bgz"))
        .map(str::to_string)
        .unwrap_or(name)
}

/// Open a source for buffered reading, decompressing gzip/bgzip by extension.
///
/// The returned reader owns the file handle, so the file is closed when the
/// reader is dropped on any path.
pub(crate) fn open_buffered(path: &Path) -> Result<Box<dyn BufRead + Send>, SourceError> {
    require_exists(path)?;

    let file = File::open(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// A lazily-read stream of reads from a FASTQ or FASTA file
pub enum ReadSource {
    Fastq(fastq::FastqReads),
    Fasta(fasta::FastaReads),
}

impl Iterator for ReadSource {
    type Item = Result<Read, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Fastq(reads) => reads.next(),
            Self::Fasta(reads) => reads.next(),
        }
    }
}

/// Open a read source, choosing FASTA or FASTQ from the file extension.
///
/// Unknown extensions are treated as FASTQ.
///
/// # Errors
///
/// Returns `SourceError::Missing` if the path does not exist or
/// `SourceError::Io` if it cannot be opened.
pub fn open_reads(path: &Path) -> Result<ReadSource, SourceError> {
    if fasta::is_fasta_file(path) {
        Ok(ReadSource::Fasta(fasta::FastaReads::open(path)?))
    } else {
        Ok(ReadSource::Fastq(fastq::FastqReads::open(path)?))
    }
}
