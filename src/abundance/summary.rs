use serde::{Deserialize, Serialize};

/// Reads attributed to one species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesAbundance {
    pub species: String,
    pub count: usize,
    /// Share of classified reads, 0-100
    pub percentage: f64,
}

/// Count of a non-species category with its share of all reads
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryCount {
    pub count: usize,
    /// Share of total reads, 0-100
    pub percentage: f64,
}

/// Relative abundance of species in a classified read set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbundanceSummary {
    /// Every read seen, whatever its classification
    pub total_reads: usize,

    /// Reads assigned to a species
    pub total_classified: usize,

    /// `total_classified` as a share of `total_reads`, 0-100
    pub classified_percentage: f64,

    /// Species ranked by descending count, ties in first-appearance order.
    /// Empty when nothing was classified.
    pub species: Vec<SpeciesAbundance>,

    pub unclassified: CategoryCount,

    pub too_short: CategoryCount,

    /// Mean confidence of classified reads, when per-read statistics were given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_confidence: Option<f64>,
}

impl AbundanceSummary {
    /// True when no read was assigned to a species
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_classified == 0
    }

    #[must_use]
    pub fn unique_species(&self) -> usize {
        self.species.len()
    }

    /// Most abundant species
    #[must_use]
    pub fn top_species(&self) -> Option<&SpeciesAbundance> {
        self.species.first()
    }

    #[must_use]
    pub fn get(&self, species: &str) -> Option<&SpeciesAbundance> {
        self.species.iter().find(|s| s.species == species)
    }
}
