//! add_dosage CLI entry point
//!
//! Annotates a gzipped VCF with per-sample genotype dosages.

use add_dosage::core::{DegeneratePolicy, DosageConfig, NonSnpPolicy, DEFAULT_QUEUE_CAPACITY};
use add_dosage::formats;
use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

/// Handling of records that are not single-nucleotide variants (CLI enum)
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum NonSnpArg {
    /// Compute dosages for every record
    #[default]
    #[value(name = "annotate")]
    Annotate,
    /// Drop records whose REF or ALT is longer than one base
    #[value(name = "skip")]
    Skip,
    /// Write such records unchanged
    #[value(name = "pass-through")]
    PassThrough,
}

impl From<NonSnpArg> for NonSnpPolicy {
    fn from(arg: NonSnpArg) -> Self {
        match arg {
            NonSnpArg::Annotate => NonSnpPolicy::Annotate,
            NonSnpArg::Skip => NonSnpPolicy::Skip,
            NonSnpArg::PassThrough => NonSnpPolicy::PassThrough,
        }
    }
}

/// Handling of likelihoods that all underflow to zero (CLI enum)
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum DegenerateArg {
    /// Write the missing value '.'
    #[default]
    #[value(name = "missing")]
    Missing,
    /// Abort the run
    #[value(name = "fail")]
    Fail,
}

impl From<DegenerateArg> for DegeneratePolicy {
    fn from(arg: DegenerateArg) -> Self {
        match arg {
            DegenerateArg::Missing => DegeneratePolicy::Missing,
            DegenerateArg::Fail => DegeneratePolicy::Fail,
        }
    }
}

#[derive(Parser)]
#[command(name = "add_dosage")]
#[command(about = "Add per-sample genotype dosages (DS) computed from PL to a gzipped VCF")]
#[command(version)]
struct Cli {
    /// Input VCF file (.vcf.gz, bgzip or plain text)
    input: PathBuf,
    /// Output VCF file (gzip compressed)
    output: PathBuf,
    /// Handling of non-SNP records
    #[arg(long = "non-snp", default_value = "annotate")]
    non_snp: NonSnpArg,
    /// Handling of likelihoods that all underflow to zero
    #[arg(long, default_value = "missing")]
    degenerate: DegenerateArg,
    /// Number of lines buffered between reader and writer threads
    #[arg(long = "queue-capacity", default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,
    /// Gzip compression level of the output (0-9)
    #[arg(long = "compression-level", default_value_t = 6)]
    compression_level: u32,
}

fn parse_args() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                // Usage errors exit with 1, not clap's default of 2
                let _ = e.print();
                std::process::exit(1);
            }
        },
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = parse_args();
    let start = Instant::now();

    let config = DosageConfig::default()
        .with_non_snp(cli.non_snp.into())
        .with_degenerate(cli.degenerate.into())
        .with_queue_capacity(cli.queue_capacity)
        .with_compression_level(cli.compression_level);

    eprintln!("Adding dosages: {:?} -> {:?}", cli.input, cli.output);
    let stats = formats::add_dosage(&cli.input, &cli.output, &config)?;

    eprintln!("\n=== Dosage Statistics ===");
    eprintln!("Header lines:    {}", stats.header_lines);
    eprintln!("Total records:   {}", stats.records);
    eprintln!("Annotated:       {}", stats.annotated);
    eprintln!("Skipped:         {}", stats.skipped);
    eprintln!("Passed through:  {}", stats.passed_through);
    eprintln!("Sample dosages:  {}", stats.samples);
    eprintln!("  - Missing:     {}", stats.missing_dosages);
    eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());

    Ok(())
}
