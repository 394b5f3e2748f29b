//! VCF format adapters
//!
//! Header block handling and the dosage-annotating record transformer.

pub mod header;
pub mod vcf;

pub use header::HeaderBlock;
pub use vcf::{add_dosage, transform_stream, ConversionStats, RecordTransformer, VcfRecordView};
