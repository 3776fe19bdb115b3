//! Validation and parsing helpers for command-line inputs.

use std::path::{Path, PathBuf};

use crate::pipeline::ReferenceSource;

/// Input validation error types
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Empty reference path in '{0}'")]
    EmptyPath(String),
    #[error("Empty label in '{0}'")]
    EmptyLabel(String),
    #[error("Cannot derive a species label from '{0}'; use PATH=LABEL")]
    NoLabel(PathBuf),
}

/// Derive a species label from a reference file name.
///
/// Compression and FASTA extensions are dropped, then the first two
/// `_`-separated fields of the stem are joined with a space.
///
/// # Examples
///
/// ```
/// use kmer_classify::utils::validation::label_from_path;
/// use std::path::Path;
///
/// assert_eq!(
///     label_from_path(Path::new("refs/Escherichia_coli_K12.fna.gz")).as_deref(),
///     Some("Escherichia coli")
/// );
/// assert_eq!(label_from_path(Path::new("phiX.fa")).as_deref(), Some("phiX"));
/// ```
#[must_use]
pub fn label_from_path(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    let name = [".gz", ".bgz"]
        .iter()
        .find_map(|ext| {
            let split = name.len().checked_sub(ext.len())?;
            name.get(split..)
                .filter(|tail| tail.eq_ignore_ascii_case(ext))
                .and_then(|_| name.get(..split))
        })
        .unwrap_or(&*name);
    let stem = Path::new(name).file_stem()?.to_string_lossy();

    let label = stem
        .split('_')
        .filter(|field| !field.is_empty())
        .take(2)
        .collect::<Vec<_>>()
        .join(" ");

    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}

/// Parse a `PATH[=LABEL]` reference argument.
///
/// The first `=` separates the path from the label. Without a label, one is
/// derived with [`label_from_path`].
///
/// # Examples
///
/// ```
/// use kmer_classify::utils::validation::parse_reference_arg;
///
/// let source = parse_reference_arg("genomes/sa.fna=Staphylococcus aureus").unwrap();
/// assert_eq!(source.label, "Staphylococcus aureus");
///
/// let source = parse_reference_arg("genomes/Bacillus_subtilis_168.fa").unwrap();
/// assert_eq!(source.label, "Bacillus subtilis");
/// ```
///
/// # Errors
///
/// Returns `ValidationError::EmptyPath` or `ValidationError::EmptyLabel` for
/// blank parts, and `ValidationError::NoLabel` if no label is given and none
/// can be derived.
pub fn parse_reference_arg(arg: &str) -> Result<ReferenceSource, ValidationError> {
    let (path, label) = match arg.split_once('=') {
        Some((path, label)) => (path.trim(), Some(label.trim())),
        None => (arg.trim(), None),
    };

    if path.is_empty() {
        return Err(ValidationError::EmptyPath(arg.to_string()));
    }
    let path = PathBuf::from(path);

    let label = match label {
        Some("") => return Err(ValidationError::EmptyLabel(arg.to_string())),
        Some(label) => label.to_string(),
        None => label_from_path(&path).ok_or_else(|| ValidationError::NoLabel(path.clone()))?,
    };

    Ok(ReferenceSource { path, label })
}
