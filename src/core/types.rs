use serde::{Deserialize, Serialize};

/// Label written for reads that matched no indexed k-mer
pub const UNCLASSIFIED_LABEL: &str = "Unclassified";

/// Label written for reads shorter than the k-mer size
pub const TOO_SHORT_LABEL: &str = "Too_Short_Read";

/// Helper function to convert usize count to f64 with explicit precision loss allowance
#[inline]
pub(crate) fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Outcome of classifying a single read
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Majority-vote species label
    Species(String),
    /// Read was long enough but no window matched the index
    Unclassified,
    /// Read was shorter than k
    TooShort,
}

impl Classification {
    #[must_use]
    pub fn species(label: impl Into<String>) -> Self {
        Self::Species(label.into())
    }

    /// The species label, if this is a species call
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Species(label) => Some(label),
            Self::Unclassified | Self::TooShort => None,
        }
    }

    #[must_use]
    pub fn is_classified(&self) -> bool {
        matches!(self, Self::Species(_))
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Species(label) => write!(f, "{label}"),
            Self::Unclassified => write!(f, "{UNCLASSIFIED_LABEL}"),
            Self::TooShort => write!(f, "{TOO_SHORT_LABEL}"),
        }
    }
}

/// Classification of one read together with its vote statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadClassification {
    /// Read identifier from the source
    pub read_id: String,

    pub classification: Classification,

    /// Number of k-mer windows scanned (0 for too-short reads)
    pub total_kmers: usize,

    /// Windows that hit any indexed k-mer
    pub matched_kmers: usize,

    /// Votes received by the winning label
    pub winning_votes: usize,
}

impl ReadClassification {
    #[must_use]
    pub fn too_short(read_id: impl Into<String>) -> Self {
        Self {
            read_id: read_id.into(),
            classification: Classification::TooShort,
            total_kmers: 0,
            matched_kmers: 0,
            winning_votes: 0,
        }
    }

    #[must_use]
    pub fn unclassified(read_id: impl Into<String>, total_kmers: usize) -> Self {
        Self {
            read_id: read_id.into(),
            classification: Classification::Unclassified,
            total_kmers,
            matched_kmers: 0,
            winning_votes: 0,
        }
    }

    /// Fraction of scanned windows that voted for the winning label.
    ///
    /// Zero for unclassified and too-short reads.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        if self.total_kmers == 0 {
            return 0.0;
        }
        count_to_f64(self.winning_votes) / count_to_f64(self.total_kmers)
    }
}
