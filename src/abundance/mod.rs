//! Relative species abundance over a set of classifications.
//!
//! Species percentages are relative to reads assigned to a species; the
//! unclassified and too-short categories are relative to all reads. Species are
//! ranked by descending count, equal counts keeping the order in which the
//! species first appeared.
//!
//! ```rust
//! use kmer_classify::abundance::aggregator::summarize;
//! use kmer_classify::core::types::Classification;
//!
//! let summary = summarize(&[
//!     Classification::species("S1"),
//!     Classification::species("S1"),
//!     Classification::species("S2"),
//!     Classification::Unclassified,
//! ]);
//! assert_eq!(summary.total_classified, 3);
//! assert_eq!(summary.species[0].species, "S1");
//! ```

pub mod aggregator;
pub mod summary;
