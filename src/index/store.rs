use serde::de::{self, Deserializer, Visitor};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read or write index: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse index JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to decode binary index: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("Invalid index: {0}")]
    Invalid(String),
}

/// Index format version for compatibility checking
pub const INDEX_VERSION: &str = "1.0.0";

/// Compact identifier of an interned species label
pub type LabelId = u32;

/// On-disk encoding of a saved index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFormat {
    /// Human-readable JSON, k-mers in sorted order
    Json,
    /// Compact bincode encoding
    Binary,
}

impl IndexFormat {
    /// `.json` selects JSON; everything else is binary
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("json") => Self::Json,
            _ => Self::Binary,
        }
    }
}

/// A reference record that contributed k-mers to the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedReference {
    /// Species label
    pub label: String,

    /// Record name from the source
    pub name: String,

    /// Sequence length in bases
    pub length: u64,

    /// MD5 of the uppercased sequence
    pub md5: String,
}

/// Serializable index format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexData {
    version: String,
    created_at: String,
    kmer_size: usize,
    labels: Vec<String>,
    references: Vec<IndexedReference>,
    kmers: BTreeMap<KmerKey, LabelId>,
}

/// A k-mer as a map key: a string in JSON, raw bytes in the binary format.
///
/// Sequences are not alphabet-checked, so a key may hold any byte; only the
/// JSON encoding requires UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct KmerKey(Box<[u8]>);

impl Serialize for KmerKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            let text = std::str::from_utf8(&self.0)
                .map_err(|_| ser::Error::custom("k-mer is not valid UTF-8"))?;
            serializer.serialize_str(text)
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for KmerKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KmerKeyVisitor;

        impl Visitor<'_> for KmerKeyVisitor {
            type Value = KmerKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a k-mer string or byte array")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<KmerKey, E> {
                Ok(KmerKey(v.as_bytes().into()))
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<KmerKey, E> {
                Ok(KmerKey(v.into()))
            }

            fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<KmerKey, E> {
                Ok(KmerKey(v.into_boxed_slice()))
            }
        }

        if deserializer.is_human_readable() {
            deserializer.deserialize_str(KmerKeyVisitor)
        } else {
            deserializer.deserialize_byte_buf(KmerKeyVisitor)
        }
    }
}

/// Exact-match k-mer → species index.
///
/// Every key has length exactly `k` and maps to one label. Built by
/// [`KmerIndexBuilder`](super::builder::KmerIndexBuilder) and immutable
/// afterwards, so a shared `&KmerIndex` can be read from any number of threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KmerIndex {
    k: usize,

    /// Interned species labels, indexed by `LabelId`
    labels: Vec<String>,

    /// Reverse lookup: label -> id
    label_ids: HashMap<String, LabelId>,

    /// Index: k-mer -> label id
    kmers: HashMap<Box<[u8]>, LabelId>,

    /// References that contributed, in build order
    references: Vec<IndexedReference>,
}

impl KmerIndex {
    pub(crate) fn new(k: usize) -> Self {
        Self {
            k,
            labels: Vec::new(),
            label_ids: HashMap::new(),
            kmers: HashMap::new(),
            references: Vec::new(),
        }
    }

    /// Intern a label, returning its id
    pub(crate) fn intern_label(&mut self, label: &str) -> LabelId {
        if let Some(&id) = self.label_ids.get(label) {
            return id;
        }
        #[allow(clippy::cast_possible_truncation)] // Far fewer than 2^32 species
        let id = self.labels.len() as LabelId;
        self.labels.push(label.to_string());
        self.label_ids.insert(label.to_string(), id);
        id
    }

    /// Insert or overwrite the label of a k-mer
    pub(crate) fn insert(&mut self, kmer: &[u8], label: LabelId) {
        debug_assert_eq!(kmer.len(), self.k);
        if let Some(existing) = self.kmers.get_mut(kmer) {
            *existing = label;
        } else {
            self.kmers.insert(kmer.into(), label);
        }
    }

    pub(crate) fn push_reference(&mut self, reference: IndexedReference) {
        self.references.push(reference);
    }

    /// The k-mer length of every key
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of distinct k-mers
    #[must_use]
    pub fn len(&self) -> usize {
        self.kmers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kmers.is_empty()
    }

    /// Look up the label id of an (uppercase) k-mer
    #[must_use]
    pub fn get_id(&self, kmer: &[u8]) -> Option<LabelId> {
        self.kmers.get(kmer).copied()
    }

    /// Look up the label of an (uppercase) k-mer
    #[must_use]
    pub fn get(&self, kmer: &[u8]) -> Option<&str> {
        self.get_id(kmer).and_then(|id| self.label(id))
    }

    #[must_use]
    pub fn label(&self, id: LabelId) -> Option<&str> {
        self.labels.get(id as usize).map(String::as_str)
    }

    /// Interned labels in first-seen order
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// References that contributed k-mers, in build order
    #[must_use]
    pub fn references(&self) -> &[IndexedReference] {
        &self.references
    }

    /// All entries sorted by k-mer
    #[must_use]
    pub fn sorted_entries(&self) -> Vec<(&[u8], &str)> {
        let mut entries: Vec<(&[u8], &str)> = self
            .kmers
            .iter()
            .map(|(kmer, &id)| (kmer.as_ref(), self.labels[id as usize].as_str()))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Number of k-mers owned by each label, in label order
    #[must_use]
    pub fn kmers_per_label(&self) -> Vec<(&str, usize)> {
        let mut counts = vec![0usize; self.labels.len()];
        for &id in self.kmers.values() {
            counts[id as usize] += 1;
        }
        self.labels
            .iter()
            .map(String::as_str)
            .zip(counts)
            .collect()
    }

    /// Save the index, choosing the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the file cannot be written, a serialization
    /// error, or `StoreError::Invalid` when saving as JSON and a k-mer is not
    /// valid UTF-8. The binary format stores any byte.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let format = IndexFormat::from_path(path);
        if format == IndexFormat::Json {
            self.check_utf8()?;
        }

        let data = self.to_data();
        let mut writer = BufWriter::new(File::create(path)?);

        match format {
            IndexFormat::Json => serde_json::to_writer(&mut writer, &data)?,
            IndexFormat::Binary => bincode::serialize_into(&mut writer, &data)?,
        }
        writer.flush()?;
        Ok(())
    }

    /// Load an index saved by [`KmerIndex::save`].
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the file cannot be read, a decoding error,
    /// or `StoreError::Invalid` if the content violates index invariants.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let reader = BufReader::new(File::open(path)?);

        let data: IndexData = match IndexFormat::from_path(path) {
            IndexFormat::Json => serde_json::from_reader(reader)?,
            IndexFormat::Binary => bincode::deserialize_from(reader)?,
        };
        Self::from_data(data)
    }

    /// Export the index as a JSON string
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Invalid` if a k-mer is not valid UTF-8.
    pub fn to_json(&self) -> Result<String, StoreError> {
        self.check_utf8()?;
        Ok(serde_json::to_string(&self.to_data())?)
    }

    /// Parse an index from a JSON string
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Json` for malformed JSON or `StoreError::Invalid`
    /// if the content violates index invariants.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Self::from_data(serde_json::from_str(json)?)
    }

    fn check_utf8(&self) -> Result<(), StoreError> {
        match self.kmers.keys().find(|kmer| std::str::from_utf8(kmer).is_err()) {
            Some(kmer) => Err(StoreError::Invalid(format!(
                "k-mer '{}' is not valid UTF-8; save with a binary extension instead of .json",
                String::from_utf8_lossy(kmer)
            ))),
            None => Ok(()),
        }
    }

    fn to_data(&self) -> IndexData {
        IndexData {
            version: INDEX_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            kmer_size: self.k,
            labels: self.labels.clone(),
            references: self.references.clone(),
            kmers: self
                .kmers
                .iter()
                .map(|(kmer, &id)| (KmerKey(kmer.clone()), id))
                .collect(),
        }
    }

    fn from_data(data: IndexData) -> Result<Self, StoreError> {
        // Version check (warn but don't fail)
        if data.version != INDEX_VERSION {
            warn!(
                "Index version mismatch (expected {}, found {})",
                INDEX_VERSION, data.version
            );
        }

        if data.kmer_size == 0 {
            return Err(StoreError::Invalid("k-mer size must be positive".to_string()));
        }

        let mut index = Self::new(data.kmer_size);
        for label in &data.labels {
            let id = index.intern_label(label);
            if index.labels.len() != id as usize + 1 {
                return Err(StoreError::Invalid(format!("duplicate label '{label}'")));
            }
        }

        for (KmerKey(kmer), id) in data.kmers {
            if kmer.len() != index.k {
                return Err(StoreError::Invalid(format!(
                    "k-mer '{}' has length {} but k={}",
                    String::from_utf8_lossy(&kmer),
                    kmer.len(),
                    index.k
                )));
            }
            if id as usize >= index.labels.len() {
                return Err(StoreError::Invalid(format!(
                    "k-mer '{}' refers to unknown label id {id}",
                    String::from_utf8_lossy(&kmer)
                )));
            }
            index.kmers.insert(kmer, id);
        }

        index.references = data.references;
        Ok(index)
    }
}
