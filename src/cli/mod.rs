//! Command-line interface for kmer-classify.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **build**: Build a k-mer index from labeled reference FASTA files
//! - **classify**: Classify reads and report species abundance
//! - **inspect**: Show the contents of a saved index
//!
//! ## Usage
//!
//! ```text
//! # Build an index; labels default to the first two fields of the file name
//! kmer-classify build -r Escherichia_coli_K12.fna -r sa.fna=Staphylococcus\ aureus -o refs.idx
//!
//! # Classify reads against a saved index
//! kmer-classify classify sample.fastq.gz --index refs.idx --parallel
//!
//! # Build in memory and classify in one go, with per-read output
//! kmer-classify classify sample.fq -r s1.fa=S1 -r s2.fa=S2 -k 21 --per-read calls.tsv
//!
//! # JSON output for scripting
//! kmer-classify classify sample.fq --index refs.idx --format json
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::core::config::AnalysisConfig;

pub mod build;
pub mod classify;
pub mod inspect;

#[derive(Parser)]
#[command(name = "kmer-classify")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Classify sequencing reads to species by exact k-mer matching")]
#[command(
    long_about = "kmer-classify assigns each read to the reference species whose k-mers it shares most.\n\nIt builds an exact-match index from labeled reference genomes, classifies every read by majority vote over its k-mers, and reports:\n- Per-species read counts and relative abundance\n- Reads that matched nothing and reads shorter than k\n- Optional per-read calls with vote statistics"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a k-mer index from reference genomes
    Build(build::BuildArgs),

    /// Classify reads and summarize species abundance
    Classify(classify::ClassifyArgs),

    /// Show a saved index
    Inspect(inspect::InspectArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Options shared by commands that build or classify
#[derive(Args, Debug, Default)]
pub struct AnalysisArgs {
    /// K-mer size (default 31, or the k of a loaded index)
    #[arg(short = 'k', long = "kmer-size")]
    pub kmer_size: Option<usize>,

    /// JSON config file; command-line flags take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Use multiple threads
    #[arg(long)]
    pub parallel: bool,

    /// Number of worker threads (implies --parallel)
    #[arg(long)]
    pub threads: Option<usize>,
}

impl AnalysisArgs {
    /// Merge the config file (if any) with command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or the result is
    /// invalid.
    pub fn resolve(&self) -> anyhow::Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => AnalysisConfig::default(),
        };

        if let Some(k) = self.kmer_size {
            config.kmer_size = k;
        }
        if self.parallel {
            config.parallel = true;
        }
        if let Some(threads) = self.threads {
            config.threads = Some(threads);
            config.parallel = true;
        }

        config.validate()?;
        Ok(config)
    }
}
