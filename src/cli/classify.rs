use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use crate::abundance::summary::AbundanceSummary;
use crate::cli::{AnalysisArgs, OutputFormat};
use crate::core::types::{ReadClassification, TOO_SHORT_LABEL, UNCLASSIFIED_LABEL};
use crate::index::store::KmerIndex;
use crate::observer::LoggingObserver;
use crate::pipeline::{self, ReferenceSource};
use crate::utils::validation::parse_reference_arg;

#[derive(Args)]
pub struct ClassifyArgs {
    /// Reads to classify (FASTQ, or FASTA by extension; .gz/.bgz supported)
    #[arg(required = true)]
    pub reads: PathBuf,

    /// Saved index to classify against
    #[arg(long, conflicts_with = "references", required_unless_present = "references")]
    pub index: Option<PathBuf>,

    /// Build the index in memory from PATH or PATH=LABEL references instead
    #[arg(short, long = "reference", value_parser = parse_reference_arg)]
    pub references: Vec<ReferenceSource>,

    /// Write one line per read (TSV) to this file
    #[arg(long)]
    pub per_read: Option<PathBuf>,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

/// Execute classify subcommand
///
/// # Errors
///
/// Returns an error if the index or reads cannot be loaded, the k-mer size
/// does not match the index, or output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ClassifyArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut config = args.analysis.resolve()?;
    let observer = LoggingObserver::new(config.progress_interval);

    let index = if let Some(path) = &args.index {
        let index = KmerIndex::load(path)
            .with_context(|| format!("Failed to load index {}", path.display()))?;
        // The index fixes k unless one was asked for explicitly
        if args.analysis.kmer_size.is_none() {
            config.kmer_size = index.k();
        }
        if verbose {
            eprintln!(
                "Loaded index with {} k-mers (k={}) for {} species",
                index.len(),
                index.k(),
                index.labels().len()
            );
        }
        index
    } else {
        let (index, report) = pipeline::build_index(&args.references, &config, &observer)?;
        if verbose {
            eprintln!(
                "Built index with {} k-mers (k={}) from {} reference record(s)",
                report.distinct_kmers,
                index.k(),
                report.indexed
            );
        }
        index
    };

    let classifications = pipeline::classify_file(&index, &args.reads, &config, &observer, None)?;
    let summary = pipeline::summarize(&classifications, &config);

    if let Some(path) = &args.per_read {
        write_per_read(path, &classifications)
            .with_context(|| format!("Failed to write per-read results {}", path.display()))?;
    }

    if summary.is_empty() {
        eprintln!("No reads were assigned to a species.");
    }

    match format {
        OutputFormat::Text => print_text_summary(&summary),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Tsv => print_tsv_summary(&summary),
    }

    Ok(())
}

fn write_per_read(path: &Path, classifications: &[ReadClassification]) -> anyhow::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(
        writer,
        "read_id\tclassification\ttotal_kmers\tmatched_kmers\twinning_votes\tconfidence"
    )?;
    for read in classifications {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{:.4}",
            read.read_id,
            read.classification,
            read.total_kmers,
            read.matched_kmers,
            read.winning_votes,
            read.confidence(),
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn print_text_summary(summary: &AbundanceSummary) {
    println!(
        "Reads: {} total, {} classified ({:.2}%)",
        summary.total_reads, summary.total_classified, summary.classified_percentage
    );
    if let Some(confidence) = summary.mean_confidence {
        println!("Mean confidence: {:.4}", confidence);
    }

    if !summary.species.is_empty() {
        println!("\nSpecies abundance ({} species):", summary.unique_species());
        for (i, species) in summary.species.iter().enumerate() {
            println!(
                "   #{} {}: {} reads ({:.2}%)",
                i + 1,
                species.species,
                species.count,
                species.percentage
            );
        }
    }

    println!();
    println!(
        "{}: {} ({:.2}% of reads)",
        UNCLASSIFIED_LABEL, summary.unclassified.count, summary.unclassified.percentage
    );
    println!(
        "{}: {} ({:.2}% of reads)",
        TOO_SHORT_LABEL, summary.too_short.count, summary.too_short.percentage
    );
}

fn print_tsv_summary(summary: &AbundanceSummary) {
    // Species percentages are of classified reads; the other two rows have none
    println!("name\tcount\tpercent_classified\tpercent_total");
    for species in &summary.species {
        let of_total = if summary.total_reads == 0 {
            0.0
        } else {
            species.percentage * summary.classified_percentage / 100.0
        };
        println!(
            "{}\t{}\t{:.4}\t{:.4}",
            species.species, species.count, species.percentage, of_total
        );
    }
    println!(
        "{}\t{}\tNA\t{:.4}",
        UNCLASSIFIED_LABEL, summary.unclassified.count, summary.unclassified.percentage
    );
    println!(
        "{}\t{}\tNA\t{:.4}",
        TOO_SHORT_LABEL, summary.too_short.count, summary.too_short.percentage
    );
}
