//! add-dosage - Streaming genotype dosage annotation for VCF files
//!
//! Reads a gzipped VCF, computes a per-sample dosage (expected alternate
//! allele count) from the Phred-scaled `PL` likelihoods of every record and
//! writes a gzipped VCF with an extra `DS` FORMAT field.
//!
//! # Features
//!
//! - Single pass with bounded memory: a line source and a record
//!   transformer connected by a bounded blocking channel
//! - Decompression, dosage arithmetic and compression overlap
//! - `PL` position resolved per record from the FORMAT column
//! - Configurable column layout, non-SNP handling and degenerate policy
//!
//! # Example
//!
//! ```ignore
//! use add_dosage::{add_dosage, DosageConfig, NonSnpPolicy};
//!
//! let config = DosageConfig::default().with_non_snp(NonSnpPolicy::Skip);
//! let stats = add_dosage("input.vcf.gz", "output.vcf.gz", &config)?;
//! println!("{} records annotated", stats.annotated);
//! ```

pub mod core;
pub mod formats;

// Re-export commonly used types
pub use crate::core::{
    AddDosageError, ChannelError, DegeneratePolicy, Dosage, DosageConfig, GenotypeLikelihoods,
    HeaderError, LikelihoodError, NonSnpPolicy, RecordError, Result, VcfLayout,
};
pub use crate::formats::{add_dosage, transform_stream, ConversionStats, RecordTransformer, VcfRecordView};
