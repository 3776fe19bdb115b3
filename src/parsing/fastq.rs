//! FASTQ read sources using noodles.
//!
//! Quality scores are read and discarded; classification uses bases only.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use noodles::fastq;

use crate::core::sequence::Read;
use crate::parsing::{open_buffered, RecordKind, SourceError};

/// Lazily iterate the records of a FASTQ file.
///
/// The first parse error is yielded once, after which the iterator is exhausted.
pub struct FastqReads {
    reader: fastq::io::Reader<Box<dyn BufRead + Send>>,
    path: PathBuf,
    record: fastq::Record,
    done: bool,
}

impl FastqReads {
    /// # Errors
    ///
    /// Returns `SourceError::Missing` or `SourceError::Io` if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let reader = open_buffered(path)?;
        Ok(Self {
            reader: fastq::io::Reader::new(reader),
            path: path.to_path_buf(),
            record: fastq::Record::default(),
            done: false,
        })
    }
}

impl Iterator for FastqReads {
    type Item = Result<Read, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.reader.read_record(&mut self.record) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                let id = String::from_utf8_lossy(self.record.name()).to_string();
                Some(Ok(Read::new(id, self.record.sequence().to_vec())))
            }
            Err(e) => {
                self.done = true;
                Some(Err(SourceError::corrupt(&self.path, RecordKind::Read, e)))
            }
        }
    }
}
