/// Uppercase a nucleotide sequence in place.
///
/// Only case is normalized; the alphabet is not validated.
pub fn normalize_sequence(sequence: &mut [u8]) {
    sequence.make_ascii_uppercase();
}

/// Number of stride-1 windows of width `k` in a sequence of `len` bases
#[must_use]
pub fn window_count(len: usize, k: usize) -> usize {
    if k == 0 || len < k {
        0
    } else {
        len - k + 1
    }
}

/// A labeled reference sequence used to build the index.
///
/// Multi-record FASTA files yield one genome per record, all carrying the
/// label of their source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceGenome {
    /// Species label attributed to every k-mer of this sequence
    pub label: String,

    /// Record name from the source (FASTA definition line)
    pub name: String,

    /// Uppercased sequence bytes
    pub sequence: Vec<u8>,
}

impl ReferenceGenome {
    pub fn new(label: impl Into<String>, name: impl Into<String>, sequence: Vec<u8>) -> Self {
        let mut sequence = sequence;
        normalize_sequence(&mut sequence);
        Self {
            label: label.into(),
            name: name.into(),
            sequence,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// MD5 of the uppercased sequence, lowercase hex
    #[must_use]
    pub fn md5(&self) -> String {
        format!("{:x}", md5::compute(&self.sequence))
    }
}

/// A sequencing read of unknown origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Read {
    pub id: String,
    pub sequence: Vec<u8>,
}

impl Read {
    pub fn new(id: impl Into<String>, sequence: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_is_uppercased() {
        let genome = ReferenceGenome::new("S1", "chr", b"acgTnn".to_vec());
        assert_eq!(genome.sequence, b"ACGTNN");
        assert_eq!(genome.len(), 6);
    }

    #[test]
    fn test_window_count() {
        assert_eq!(window_count(6, 3), 4);
        assert_eq!(window_count(3, 3), 1);
        assert_eq!(window_count(2, 3), 0);
        assert_eq!(window_count(5, 0), 0);
    }

    #[test]
    fn test_reference_md5_is_case_insensitive() {
        // "ACGT" -> f1f8f4bf413b16ad135722aa4591043e
        let upper = ReferenceGenome::new("S1", "a", b"ACGT".to_vec());
        let lower = ReferenceGenome::new("S1", "b", b"acgt".to_vec());
        assert_eq!(upper.md5(), "f1f8f4bf413b16ad135722aa4591043e");
        assert_eq!(upper.md5(), lower.md5());
    }
}
