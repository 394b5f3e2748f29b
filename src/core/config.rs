//! Pipeline configuration
//!
//! Column positions, separators, queue size and record policies used by the
//! dosage pipeline. Defaults follow the VCF 4.x column layout.

use crate::core::error::{AddDosageError, Result};

/// REF column index (0-based)
pub const REF_COLUMN: usize = 3;

/// ALT column index (0-based)
pub const ALT_COLUMN: usize = 4;

/// FORMAT column index (0-based); samples start right after it
pub const FORMAT_COLUMN: usize = 8;

/// Default number of slots in the line transfer channel
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Default gzip compression level of the output
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// FORMAT key holding Phred-scaled genotype likelihoods
pub const LIKELIHOOD_KEY: &str = "PL";

/// FORMAT key appended for the computed dosage
pub const DOSAGE_KEY: &str = "DS";

/// Column layout of a data line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcfLayout {
    pub ref_column: usize,
    pub alt_column: usize,
    pub format_column: usize,
    /// Separator byte between columns
    pub field_separator: u8,
    /// Separator byte between FORMAT keys and between sample sub-fields
    pub key_separator: u8,
    /// Separator byte between the values of one sub-field
    pub value_separator: u8,
}

impl Default for VcfLayout {
    fn default() -> Self {
        Self {
            ref_column: REF_COLUMN,
            alt_column: ALT_COLUMN,
            format_column: FORMAT_COLUMN,
            field_separator: b'\t',
            key_separator: b':',
            value_separator: b',',
        }
    }
}

impl VcfLayout {
    /// Index of the first sample column
    pub fn first_sample_column(&self) -> usize {
        self.format_column + 1
    }

    /// Minimum number of columns a data line needs (at least one sample)
    pub fn min_fields(&self) -> usize {
        self.first_sample_column() + 1
    }
}

/// What to do with rows that are not single-nucleotide variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonSnpPolicy {
    /// Compute dosages for every row
    #[default]
    Annotate,
    /// Drop rows whose REF or ALT is longer than one base
    Skip,
    /// Write such rows unchanged, without a dosage field
    PassThrough,
}

/// What to do when all three linear-scale likelihoods vanish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegeneratePolicy {
    /// Write the VCF missing value `.`
    #[default]
    Missing,
    /// Abort the run
    Fail,
}

/// Configuration for the dosage pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DosageConfig {
    pub layout: VcfLayout,
    pub queue_capacity: usize,
    pub likelihood_key: String,
    pub dosage_key: String,
    pub non_snp: NonSnpPolicy,
    pub degenerate: DegeneratePolicy,
    pub compression_level: u32,
}

impl Default for DosageConfig {
    fn default() -> Self {
        Self {
            layout: VcfLayout::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            likelihood_key: LIKELIHOOD_KEY.to_string(),
            dosage_key: DOSAGE_KEY.to_string(),
            non_snp: NonSnpPolicy::default(),
            degenerate: DegeneratePolicy::default(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl DosageConfig {
    pub fn with_layout(mut self, layout: VcfLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_non_snp(mut self, policy: NonSnpPolicy) -> Self {
        self.non_snp = policy;
        self
    }

    pub fn with_degenerate(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate = policy;
        self
    }

    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }

    /// The `##FORMAT` declaration inserted into the header block
    pub fn dosage_header_line(&self) -> String {
        format!(
            "##FORMAT=<ID={},Number=1,Type=Float,Description=\"Genotype dosage (expected alternate allele count) computed from {}\">",
            self.dosage_key, self.likelihood_key
        )
    }

    /// Check that the configuration can drive a pipeline
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(AddDosageError::Config(
                "queue capacity must be at least 1".to_string(),
            ));
        }
        if self.compression_level > 9 {
            return Err(AddDosageError::Config(format!(
                "compression level must be between 0 and 9, got {}",
                self.compression_level
            )));
        }
        if self.likelihood_key.is_empty() || self.dosage_key.is_empty() {
            return Err(AddDosageError::Config(
                "FORMAT keys must not be empty".to_string(),
            ));
        }
        let layout = &self.layout;
        if layout.ref_column >= layout.format_column || layout.alt_column >= layout.format_column {
            return Err(AddDosageError::Config(format!(
                "REF ({}) and ALT ({}) columns must precede FORMAT ({})",
                layout.ref_column, layout.alt_column, layout.format_column
            )));
        }
        let separators = [
            layout.field_separator,
            layout.key_separator,
            layout.value_separator,
        ];
        if separators[0] == separators[1]
            || separators[0] == separators[2]
            || separators[1] == separators[2]
        {
            return Err(AddDosageError::Config(
                "field, key and value separators must differ".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = VcfLayout::default();
        assert_eq!(layout.ref_column, 3);
        assert_eq!(layout.alt_column, 4);
        assert_eq!(layout.format_column, 8);
        assert_eq!(layout.first_sample_column(), 9);
        assert_eq!(layout.min_fields(), 10);
        assert_eq!(layout.field_separator, b'\t');
    }

    #[test]
    fn test_equal_separators_rejected() {
        let layout = VcfLayout {
            value_separator: b':',
            ..VcfLayout::default()
        };
        let config = DosageConfig::default().with_layout(layout);
        assert!(matches!(config.validate(), Err(AddDosageError::Config(_))));
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = DosageConfig::default();
        assert_eq!(config.queue_capacity, 1000);
        assert_eq!(config.non_snp, NonSnpPolicy::Annotate);
        assert_eq!(config.degenerate, DegeneratePolicy::Missing);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = DosageConfig::default().with_queue_capacity(0);
        assert!(matches!(config.validate(), Err(AddDosageError::Config(_))));
    }

    #[test]
    fn test_compression_level_rejected() {
        let config = DosageConfig::default().with_compression_level(10);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_layout_order_rejected() {
        let layout = VcfLayout {
            format_column: 2,
            ..VcfLayout::default()
        };
        let config = DosageConfig::default().with_layout(layout);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dosage_header_line() {
        let line = DosageConfig::default().dosage_header_line();
        assert!(line.starts_with("##FORMAT=<ID=DS,Number=1,Type=Float,"));
        assert!(line.ends_with('>'));
    }
}
