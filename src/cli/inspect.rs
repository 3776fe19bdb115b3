use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::index::store::KmerIndex;

#[derive(Args)]
pub struct InspectArgs {
    /// Index file written by `build`
    #[arg(required = true)]
    pub index: PathBuf,
}

/// Execute inspect subcommand
///
/// # Errors
///
/// Returns an error if the index cannot be loaded.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: InspectArgs, format: OutputFormat, _verbose: bool) -> anyhow::Result<()> {
    let index = KmerIndex::load(&args.index)
        .with_context(|| format!("Failed to load index {}", args.index.display()))?;

    match format {
        OutputFormat::Text => {
            println!("Index: {}", args.index.display());
            println!("   K-mer size: {}", index.k());
            println!("   Distinct k-mers: {}", index.len());
            println!("   Species: {}", index.labels().len());

            println!("\n   K-mers per species:");
            for (label, count) in index.kmers_per_label() {
                println!("   - {label}: {count}");
            }

            println!("\n   References:");
            for reference in index.references() {
                println!(
                    "   - {} ({}, {} bp, md5 {})",
                    reference.name, reference.label, reference.length, reference.md5
                );
            }
        }
        OutputFormat::Json => {
            let labels: Vec<serde_json::Value> = index
                .kmers_per_label()
                .into_iter()
                .map(|(label, kmers)| serde_json::json!({ "label": label, "kmers": kmers }))
                .collect();
            let json = serde_json::json!({
                "kmer_size": index.k(),
                "distinct_kmers": index.len(),
                "labels": labels,
                "references": index.references(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Tsv => {
            println!("label\tname\tlength\tmd5");
            for reference in index.references() {
                println!(
                    "{}\t{}\t{}\t{}",
                    reference.label, reference.name, reference.length, reference.md5
                );
            }
        }
    }

    Ok(())
}
