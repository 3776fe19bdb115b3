//! FASTA sources using noodles.
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.fna`, `.fas` (uncompressed)
//! - any of the above with `.gz` or `.bgz` appended

use std::io::BufRead;
use std::path::{Path, PathBuf};

use noodles::fasta;
use tracing::debug;

use crate::core::sequence::{Read, ReferenceGenome};
use crate::parsing::{open_buffered, uncompressed_name, RecordKind, SourceError};

/// Check if the path has a FASTA extension
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub fn is_fasta_file(path: &Path) -> bool {
    let name = uncompressed_name(path);
    [".fa", ".fasta", ".fna", ".fas"]
        .iter()
        .any(|ext| name.ends_with(ext))
}

/// Read every record of a FASTA file as a reference genome with `label`.
///
/// The whole file must parse: a malformed record fails the call rather than
/// being skipped.
///
/// # Errors
///
/// Returns `SourceError::Missing` if the file does not exist,
/// `SourceError::Io` if it cannot be opened, `SourceError::Corrupt` if a
/// record cannot be parsed, or `SourceError::Empty` if it holds no records.
pub fn read_references(path: &Path, label: &str) -> Result<Vec<ReferenceGenome>, SourceError> {
    let reader = open_buffered(path)?;
    let mut fasta_reader = fasta::io::Reader::new(reader);
    let genomes = parse_reference_reader(&mut fasta_reader, path, label)?;

    debug!(
        "Read {} reference record(s) from {}",
        genomes.len(),
        path.display()
    );
    Ok(genomes)
}

fn parse_reference_reader<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
    path: &Path,
    label: &str,
) -> Result<Vec<ReferenceGenome>, SourceError> {
    let mut genomes = Vec::new();

    for result in reader.records() {
        let record =
            result.map_err(|e| SourceError::corrupt(path, RecordKind::Reference, e))?;

        let name = String::from_utf8_lossy(record.name()).to_string();
        let sequence = record.sequence().as_ref().to_vec();
        genomes.push(ReferenceGenome::new(label, name, sequence));
    }

    if genomes.is_empty() {
        return Err(SourceError::Empty(path.to_path_buf()));
    }

    Ok(genomes)
}

/// Lazily iterate the records of a FASTA file as reads
pub struct FastaReads {
    reader: fasta::io::Reader<Box<dyn BufRead + Send>>,
    path: PathBuf,
    definition: String,
    done: bool,
}

impl FastaReads {
    /// # Errors
    ///
    /// Returns `SourceError::Missing` or `SourceError::Io` if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let reader = open_buffered(path)?;
        Ok(Self {
            reader: fasta::io::Reader::new(reader),
            path: path.to_path_buf(),
            definition: String::new(),
            done: false,
        })
    }

    fn read_next(&mut self) -> Result<Option<Read>, SourceError> {
        self.definition.clear();
        let n = self
            .reader
            .read_definition(&mut self.definition)
            .map_err(|e| SourceError::corrupt(&self.path, RecordKind::Read, e))?;
        if n == 0 {
            return Ok(None);
        }

        let id = parse_record_name(&self.definition).ok_or_else(|| {
            SourceError::corrupt(&self.path, RecordKind::Read, "invalid definition line")
        })?;

        let mut sequence = Vec::new();
        self.reader
            .read_sequence(&mut sequence)
            .map_err(|e| SourceError::corrupt(&self.path, RecordKind::Read, e))?;

        Ok(Some(Read::new(id, sequence)))
    }
}

impl Iterator for FastaReads {
    type Item = Result<Read, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_next() {
            Ok(Some(read)) => Some(Ok(read)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Name part of a definition line: text after `>` up to the first whitespace
fn parse_record_name(definition: &str) -> Option<String> {
    let line = definition.strip_prefix('>')?;
    line.split_whitespace().next().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(suffix: &str, content: &[u8]) -> NamedTempFile {
        let mut temp = NamedTempFile::with_suffix(suffix).unwrap();
        temp.write_all(content).unwrap();
        temp.flush().unwrap();
        temp
    }

    #[test]
    fn test_is_fasta_file() {
        assert!(is_fasta_file(Path::new("test.fa")));
        assert!(is_fasta_file(Path::new("test.fasta")));
        assert!(is_fasta_file(Path::new("test.fna")));
        assert!(is_fasta_file(Path::new("test.fa.gz")));
        assert!(is_fasta_file(Path::new("test.fna.bgz")));
        assert!(is_fasta_file(Path::new("/path/to/Reference.FA")));

        assert!(!is_fasta_file(Path::new("reads.fastq")));
        assert!(!is_fasta_file(Path::new("reads.fq.gz")));
        assert!(!is_fasta_file(Path::new("test.fai")));
    }

    #[test]
    fn test_read_references_multi_record() {
        let temp = write_temp(".fa", b">chr1 description\nacgtACGT\nACGT\n>plasmid\nGGGG\n");

        let genomes = read_references(temp.path(), "S1").unwrap();
        assert_eq!(genomes.len(), 2);
        assert_eq!(genomes[0].name, "chr1");
        assert_eq!(genomes[0].label, "S1");
        assert_eq!(genomes[0].sequence, b"ACGTACGTACGT");
        assert_eq!(genomes[1].name, "plasmid");
        assert_eq!(genomes[1].sequence, b"GGGG");
    }

    #[test]
    fn test_read_references_gzipped() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b">chr1\nAAACCC\n").unwrap();
        let temp = write_temp(".fa.gz", &encoder.finish().unwrap());

        let genomes = read_references(temp.path(), "S1").unwrap();
        assert_eq!(genomes.len(), 1);
        assert_eq!(genomes[0].sequence, b"AAACCC");
    }

    #[test]
    fn test_read_references_empty() {
        let temp = write_temp(".fa", b"");
        assert!(matches!(
            read_references(temp.path(), "S1"),
            Err(SourceError::Empty(_))
        ));
    }

    #[test]
    fn test_read_references_malformed() {
        let temp = write_temp(".fa", b"this is not fasta\n");
        let err = read_references(temp.path(), "S1").unwrap_err();
        assert!(matches!(
            err,
            SourceError::Corrupt { ref path, kind: RecordKind::Reference, .. } if path == temp.path()
        ));
    }

    #[test]
    fn test_fasta_reads_stream() {
        let temp = write_temp(".fa", b">r1 extra words\nACGT\nAC\n>r2\nTTTT\n");

        let reads: Vec<Read> = FastaReads::open(temp.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(reads.len(), 2);
        assert_eq!(reads[0].id, "r1");
        assert_eq!(reads[0].sequence, b"ACGTAC");
        assert_eq!(reads[1].id, "r2");
    }

    #[test]
    fn test_parse_record_name() {
        assert_eq!(parse_record_name(">read_1 desc"), Some("read_1".to_string()));
        assert_eq!(parse_record_name("read_2"), None);
        assert_eq!(parse_record_name(">"), None);
    }
}
