#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Two species with no 5-mer in common
pub const S1_FASTA: &str = ">s1_chr\nATGATGATGATGATGATGAT\n";
pub const S2_FASTA: &str = ">s2_chr\nCGCGCGCGCG\nCGCGCGCGCG\n";

/// Five reads for k=5: two S1, one S2, one too short, one unmatched
pub const READS_FASTQ: &str = "\
@r1
ATGATGATGA
+
IIIIIIIIII
@r2
GCGCGCGCGC
+
IIIIIIIIII
@r3
atgatgat
+
IIIIIIII
@r4
ATG
+
III
@r5
TTTTTTTTTT
+
IIIIIIIIII
";

/// Write `content` to `dir/name`
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Write the two-species references, returning their paths
pub fn write_references(dir: &Path) -> (PathBuf, PathBuf) {
    (
        write_file(dir, "s1.fa", S1_FASTA),
        write_file(dir, "s2.fa", S2_FASTA),
    )
}

/// `PATH=LABEL` argument for a reference
pub fn reference_arg(path: &Path, label: &str) -> String {
    format!("{}={label}", path.display())
}
