//! Core data types for k-mer classification.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`ReferenceGenome`](sequence::ReferenceGenome): A labeled reference sequence
//! - [`Read`](sequence::Read): An unknown sequencing read
//! - [`Classification`](types::Classification): The call made for one read
//! - [`ReadClassification`](types::ReadClassification): A call plus its vote statistics
//! - [`AnalysisConfig`](config::AnalysisConfig): Parameters passed into each phase
//!
//! ## Case Normalization
//!
//! Reference and read sequences are uppercased before any k-mer is taken, so
//! `acgt` and `ACGT` produce the same k-mers. No other alphabet checks are made:
//! a window containing `N` is indexed and looked up like any other.

pub mod config;
pub mod sequence;
pub mod types;
