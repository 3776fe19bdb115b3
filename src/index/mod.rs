//! Exact-match k-mer index construction and storage.
//!
//! The index maps every k-length substring seen in the references to the
//! species label that last contributed it. Labels are interned so each entry
//! stores a 4-byte id instead of a string.
//!
//! ## Example
//!
//! ```rust
//! use kmer_classify::core::sequence::ReferenceGenome;
//! use kmer_classify::index::builder::KmerIndexBuilder;
//!
//! let mut builder = KmerIndexBuilder::new(3).unwrap();
//! builder.add_genome(&ReferenceGenome::new("S1", "chr1", b"AAACCC".to_vec()));
//! let (index, report) = builder.build().unwrap();
//!
//! assert_eq!(index.len(), 4);
//! assert_eq!(index.get(b"ACC"), Some("S1"));
//! assert!(report.skipped.is_empty());
//! ```
//!
//! ## Persistence
//!
//! Indexes can be saved and reloaded. A `.json` extension selects a readable
//! JSON document (k-mers sorted); any other extension selects a compact binary
//! encoding.
//!
//! ```rust,no_run
//! use kmer_classify::index::store::KmerIndex;
//! use std::path::Path;
//!
//! let index = KmerIndex::load(Path::new("refs.kidx")).unwrap();
//! index.save(Path::new("refs.json")).unwrap();
//! ```

pub mod builder;
pub mod store;
