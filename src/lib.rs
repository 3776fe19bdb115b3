//! # kmer-classify
//!
//! A library for assigning sequencing reads to species by exact k-mer matching.
//!
//! Given a set of labeled reference genomes, `kmer-classify` builds an index
//! from every k-length substring to the species that owns it, classifies each
//! read by majority vote over its own k-mers, and summarizes the relative
//! abundance of each species in the sample.
//!
//! ## Features
//!
//! - **Exact k-mer index**: Stride-1 windows, case-insensitive, last reference wins
//! - **Majority-vote classification**: Deterministic tie-breaking, per-read statistics
//! - **Abundance summary**: Ranked species percentages plus unclassified and too-short reads
//! - **Parallel phases**: Optional rayon-backed building, classification and aggregation
//! - **Persisted indexes**: JSON or compact binary, with reference provenance
//!
//! ## Example
//!
//! ```rust,no_run
//! use kmer_classify::{analyze, AnalysisConfig, NoopObserver, ReferenceSource};
//! use std::path::Path;
//!
//! let sources = [
//!     ReferenceSource::new("Escherichia_coli.fna", "Escherichia coli"),
//!     ReferenceSource::new("Bacillus_subtilis.fna", "Bacillus subtilis"),
//! ];
//! let config = AnalysisConfig::default().with_kmer_size(21);
//!
//! let analysis = analyze(&sources, Path::new("sample.fastq.gz"), &config, &NoopObserver).unwrap();
//! for species in &analysis.summary.species {
//!     println!("{}: {:.2}%", species.species, species.percentage);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`index`]: K-mer index building and persistence
//! - [`classify`]: Majority-vote read classification
//! - [`abundance`]: Species abundance aggregation
//! - [`core`]: Sequences, classifications and run configuration
//! - [`parsing`]: FASTA/FASTQ sources
//! - [`pipeline`]: End-to-end runs over files
//! - [`cli`]: Command-line interface implementation

pub mod abundance;
pub mod classify;
pub mod cli;
pub mod core;
pub mod index;
pub mod observer;
pub mod parsing;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types for convenience
pub use abundance::aggregator::{summarize, summarize_reads, AbundanceAggregator};
pub use abundance::summary::AbundanceSummary;
pub use classify::cancel::CancellationToken;
pub use classify::engine::ReadClassifier;
pub use crate::core::config::AnalysisConfig;
pub use crate::core::sequence::{Read, ReferenceGenome};
pub use crate::core::types::*;
pub use index::builder::KmerIndexBuilder;
pub use index::store::KmerIndex;
pub use observer::{LoggingObserver, NoopObserver, ProgressObserver};
pub use pipeline::{analyze, ReferenceSource};
