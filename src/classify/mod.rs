//! Majority-vote read classification.
//!
//! - [`ReadClassifier`](engine::ReadClassifier): Classifies reads against a [`KmerIndex`]
//! - [`VoteTally`](vote::VoteTally): Per-read vote counting with deterministic ties
//! - [`CancellationToken`](cancel::CancellationToken): Cooperative stop between reads
//!
//! ## Algorithm
//!
//! 1. Reads shorter than k are `TooShort`
//! 2. Every stride-1 window of the uppercased read is looked up in the index
//! 3. Each hit is one vote for its label; repeated hits accumulate
//! 4. No hits gives `Unclassified`; otherwise the label with most votes wins
//!
//! Ties are resolved in favour of the label that first reached the winning
//! count while scanning windows left to right, so results never depend on hash
//! iteration order or thread scheduling.
//!
//! ## Example
//!
//! ```rust
//! use kmer_classify::classify::engine::ReadClassifier;
//! use kmer_classify::core::sequence::{Read, ReferenceGenome};
//! use kmer_classify::core::types::Classification;
//! use kmer_classify::index::builder::KmerIndexBuilder;
//!
//! let mut builder = KmerIndexBuilder::new(3).unwrap();
//! builder.add_genome(&ReferenceGenome::new("S1", "chr1", b"AAACCC".to_vec()));
//! let (index, _) = builder.build().unwrap();
//!
//! let classifier = ReadClassifier::new(&index);
//! let result = classifier.classify_read(&Read::new("read_1", "AACC"));
//! assert_eq!(result.classification, Classification::species("S1"));
//! ```
//!
//! [`KmerIndex`]: crate::index::store::KmerIndex

pub mod cancel;
pub mod engine;
pub mod vote;
