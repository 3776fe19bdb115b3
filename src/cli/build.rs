use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::{AnalysisArgs, OutputFormat};
use crate::index::builder::BuildReport;
use crate::index::store::KmerIndex;
use crate::observer::LoggingObserver;
use crate::pipeline::{self, ReferenceSource};
use crate::utils::validation::parse_reference_arg;

#[derive(Args)]
pub struct BuildArgs {
    /// Reference FASTA as PATH or PATH=LABEL; repeat for each species.
    /// References are applied in order, so a k-mer shared by two species
    /// belongs to the one given last.
    #[arg(short, long = "reference", required = true, value_parser = parse_reference_arg)]
    pub references: Vec<ReferenceSource>,

    /// Output index file (.json for JSON, anything else for binary)
    #[arg(short, long, required = true)]
    pub output: PathBuf,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

/// Execute build subcommand
///
/// # Errors
///
/// Returns an error if a reference cannot be read, nothing could be indexed,
/// or the index cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: BuildArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.analysis.resolve()?;

    if verbose {
        eprintln!(
            "Building k={} index from {} reference file(s)",
            config.kmer_size,
            args.references.len()
        );
    }

    let observer = LoggingObserver::new(config.progress_interval);
    let (index, report) = pipeline::build_index(&args.references, &config, &observer)?;

    index
        .save(&args.output)
        .with_context(|| format!("Failed to write index {}", args.output.display()))?;

    match format {
        OutputFormat::Text => print_text_report(&index, &report, &args.output),
        OutputFormat::Json => print_json_report(&index, &report, &args.output)?,
        OutputFormat::Tsv => print_tsv_report(&index),
    }

    Ok(())
}

fn print_text_report(index: &KmerIndex, report: &BuildReport, output: &std::path::Path) {
    println!("Index written to {}", output.display());
    println!("   K-mer size: {}", index.k());
    println!("   References indexed: {}", report.indexed);
    println!("   Windows scanned: {}", report.windows);
    println!("   Distinct k-mers: {}", report.distinct_kmers);

    if !report.skipped.is_empty() {
        println!("\n   Skipped (shorter than k):");
        for skipped in &report.skipped {
            println!(
                "   - {} ({}, {} bp)",
                skipped.name, skipped.label, skipped.length
            );
        }
    }

    println!("\n   K-mers per species:");
    for (label, count) in index.kmers_per_label() {
        println!("   - {label}: {count}");
    }
}

fn print_json_report(
    index: &KmerIndex,
    report: &BuildReport,
    output: &std::path::Path,
) -> anyhow::Result<()> {
    let labels: Vec<serde_json::Value> = index
        .kmers_per_label()
        .into_iter()
        .map(|(label, kmers)| serde_json::json!({ "label": label, "kmers": kmers }))
        .collect();

    let json = serde_json::json!({
        "output": output.display().to_string(),
        "kmer_size": index.k(),
        "indexed": report.indexed,
        "windows": report.windows,
        "distinct_kmers": report.distinct_kmers,
        "skipped": report.skipped,
        "labels": labels,
    });

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn print_tsv_report(index: &KmerIndex) {
    println!("label\tkmers");
    for (label, count) in index.kmers_per_label() {
        println!("{label}\t{count}");
    }
}
