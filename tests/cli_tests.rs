//! End-to-end tests of the `kmer-classify` binary.

mod common;

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use common::{reference_arg, write_file, write_references, READS_FASTQ};

fn kmer_classify() -> Command {
    Command::cargo_bin("kmer-classify").unwrap()
}

#[test]
fn test_build_then_inspect() {
    let dir = TempDir::new().unwrap();
    let (s1, s2) = write_references(dir.path());
    let index = dir.path().join("refs.idx");

    kmer_classify()
        .args(["build", "-k", "5", "-o"])
        .arg(&index)
        .arg("-r")
        .arg(reference_arg(&s1, "S1"))
        .arg("-r")
        .arg(reference_arg(&s2, "S2"))
        .assert()
        .success()
        .stdout(predicate::str::contains("References indexed: 2"))
        .stdout(predicate::str::contains("Distinct k-mers: 5"));

    assert!(index.exists());

    kmer_classify()
        .arg("inspect")
        .arg(&index)
        .assert()
        .success()
        .stdout(predicate::str::contains("K-mer size: 5"))
        .stdout(predicate::str::contains("- S1: 3"))
        .stdout(predicate::str::contains("- S2: 2"))
        .stdout(predicate::str::contains("s2_chr (S2, 20 bp"));
}

#[test]
fn test_inspect_json_index() {
    let dir = TempDir::new().unwrap();
    let (s1, _) = write_references(dir.path());
    let index = dir.path().join("refs.json");

    kmer_classify()
        .args(["build", "-k", "5", "-o"])
        .arg(&index)
        .arg("-r")
        .arg(reference_arg(&s1, "S1"))
        .assert()
        .success();

    let output = kmer_classify()
        .args(["inspect", "--format", "json"])
        .arg(&index)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["kmer_size"], 5);
    assert_eq!(json["distinct_kmers"], 3);
    assert_eq!(json["references"][0]["name"], "s1_chr");
    assert_eq!(json["references"][0]["length"], 20);
}

#[test]
fn test_label_derived_from_file_name() {
    let dir = TempDir::new().unwrap();
    let reference = write_file(dir.path(), "Escherichia_coli_K12.fa", common::S1_FASTA);
    let index = dir.path().join("refs.idx");

    kmer_classify()
        .args(["build", "-k", "5", "-o"])
        .arg(&index)
        .arg("-r")
        .arg(&reference)
        .assert()
        .success();

    kmer_classify()
        .args(["inspect", "--format", "tsv"])
        .arg(&index)
        .assert()
        .success()
        .stdout(predicate::str::contains("Escherichia coli\ts1_chr\t20\t"));
}

#[test]
fn test_classify_against_saved_index() {
    let dir = TempDir::new().unwrap();
    let (s1, s2) = write_references(dir.path());
    let reads = write_file(dir.path(), "reads.fastq", READS_FASTQ);
    let index = dir.path().join("refs.idx");

    kmer_classify()
        .args(["build", "-k", "5", "-o"])
        .arg(&index)
        .arg("-r")
        .arg(reference_arg(&s1, "S1"))
        .arg("-r")
        .arg(reference_arg(&s2, "S2"))
        .assert()
        .success();

    kmer_classify()
        .arg("classify")
        .arg(&reads)
        .arg("--index")
        .arg(&index)
        .assert()
        .success()
        .stdout(predicate::str::contains("Reads: 5 total, 3 classified (60.00%)"))
        .stdout(predicate::str::contains("#1 S1: 2 reads (66.67%)"))
        .stdout(predicate::str::contains("#2 S2: 1 reads (33.33%)"))
        .stdout(predicate::str::contains("Unclassified: 1 (20.00% of reads)"))
        .stdout(predicate::str::contains("Too_Short_Read: 1 (20.00% of reads)"));
}

#[test]
fn test_classify_with_in_memory_references_json() {
    let dir = TempDir::new().unwrap();
    let (s1, s2) = write_references(dir.path());
    let reads = write_file(dir.path(), "reads.fq", READS_FASTQ);

    let output = kmer_classify()
        .args(["classify", "-k", "5", "--format", "json"])
        .arg(&reads)
        .arg("-r")
        .arg(reference_arg(&s1, "S1"))
        .arg("-r")
        .arg(reference_arg(&s2, "S2"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_reads"], 5);
    assert_eq!(json["total_classified"], 3);
    assert_eq!(json["species"][0]["species"], "S1");
    assert_eq!(json["species"][0]["count"], 2);
    assert_eq!(json["species"][1]["species"], "S2");
    assert_eq!(json["unclassified"]["count"], 1);
    assert_eq!(json["too_short"]["count"], 1);
}

#[test]
fn test_classify_parallel_tsv() {
    let dir = TempDir::new().unwrap();
    let (s1, s2) = write_references(dir.path());
    let reads = write_file(dir.path(), "reads.fq", READS_FASTQ);

    kmer_classify()
        .args(["classify", "-k", "5", "--threads", "2", "--format", "tsv"])
        .arg(&reads)
        .arg("-r")
        .arg(reference_arg(&s1, "S1"))
        .arg("-r")
        .arg(reference_arg(&s2, "S2"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "name\tcount\tpercent_classified\tpercent_total\n",
        ))
        .stdout(predicate::str::contains("S1\t2\t66.6667\t40.0000"))
        .stdout(predicate::str::contains("Too_Short_Read\t1\tNA\t20.0000"));
}

#[test]
fn test_per_read_output() {
    let dir = TempDir::new().unwrap();
    let (s1, s2) = write_references(dir.path());
    let reads = write_file(dir.path(), "reads.fq", READS_FASTQ);
    let per_read = dir.path().join("calls.tsv");

    kmer_classify()
        .args(["classify", "-k", "5"])
        .arg(&reads)
        .arg("-r")
        .arg(reference_arg(&s1, "S1"))
        .arg("-r")
        .arg(reference_arg(&s2, "S2"))
        .arg("--per-read")
        .arg(&per_read)
        .assert()
        .success();

    let content = fs::read_to_string(&per_read).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with("read_id\tclassification"));
    assert_eq!(lines[1], "r1\tS1\t6\t6\t6\t1.0000");
    assert!(lines[4].starts_with("r4\tToo_Short_Read\t0\t"));
    assert!(lines[5].starts_with("r5\tUnclassified\t6\t0\t0\t"));
}

#[test]
fn test_kmer_size_mismatch_fails() {
    let dir = TempDir::new().unwrap();
    let (s1, _) = write_references(dir.path());
    let reads = write_file(dir.path(), "reads.fq", READS_FASTQ);
    let index = dir.path().join("refs.idx");

    kmer_classify()
        .args(["build", "-k", "5", "-o"])
        .arg(&index)
        .arg("-r")
        .arg(reference_arg(&s1, "S1"))
        .assert()
        .success();

    kmer_classify()
        .args(["classify", "-k", "7"])
        .arg(&reads)
        .arg("--index")
        .arg(&index)
        .assert()
        .failure()
        .stderr(predicate::str::contains("k-mer size mismatch"));
}

#[test]
fn test_missing_reads_fails() {
    let dir = TempDir::new().unwrap();
    let (s1, _) = write_references(dir.path());

    kmer_classify()
        .args(["classify", "-k", "5"])
        .arg(dir.path().join("absent.fq"))
        .arg("-r")
        .arg(reference_arg(&s1, "S1"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input source not found"));
}

#[test]
fn test_all_references_too_short_fails() {
    let dir = TempDir::new().unwrap();
    let (s1, _) = write_references(dir.path());

    kmer_classify()
        .args(["build", "-k", "50", "-o"])
        .arg(dir.path().join("refs.idx"))
        .arg("-r")
        .arg(reference_arg(&s1, "S1"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing was indexed"));
}

#[test]
fn test_short_reference_warned_once() {
    let dir = TempDir::new().unwrap();
    let (s1, _) = write_references(dir.path());
    let short = write_file(dir.path(), "short.fa", ">tiny\nACG\n");

    let output = kmer_classify()
        .args(["build", "-k", "5", "-o"])
        .arg(dir.path().join("refs.idx"))
        .arg("-r")
        .arg(reference_arg(&s1, "S1"))
        .arg("-r")
        .arg(reference_arg(&short, "Tiny"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("is shorter than k").count(), 1, "stderr: {stderr}");
    assert!(stderr.contains("'tiny' (Tiny)"));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("- tiny (Tiny, 3 bp)"));
}

#[test]
fn test_index_and_reference_conflict() {
    let dir = TempDir::new().unwrap();
    let (s1, _) = write_references(dir.path());
    let reads = write_file(dir.path(), "reads.fq", READS_FASTQ);

    kmer_classify()
        .arg("classify")
        .arg(&reads)
        .arg("--index")
        .arg(dir.path().join("refs.idx"))
        .arg("-r")
        .arg(reference_arg(&s1, "S1"))
        .assert()
        .failure();

    kmer_classify()
        .arg("classify")
        .arg(&reads)
        .assert()
        .failure();
}

#[test]
fn test_nothing_classified_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    let (s1, _) = write_references(dir.path());
    let reads = write_file(dir.path(), "reads.fq", "@r1\nCCCCCCCC\n+\nIIIIIIII\n");

    kmer_classify()
        .args(["classify", "-k", "5"])
        .arg(&reads)
        .arg("-r")
        .arg(reference_arg(&s1, "S1"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Reads: 1 total, 0 classified"))
        .stderr(predicate::str::contains("No reads were assigned to a species"));
}
