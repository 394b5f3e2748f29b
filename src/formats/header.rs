//! VCF header block
//!
//! Meta-information lines after the file-format declaration are collected,
//! joined by the dosage `##FORMAT` declaration and the `#CHROM` column line,
//! and written back as one sorted block. Lines are kept as raw bytes.

use crate::core::HeaderError;
use std::collections::BTreeSet;

/// Prefix of a meta-information line
pub const META_PREFIX: &[u8] = b"##";

/// Prefix of any header line
pub const HEADER_PREFIX: u8 = b'#';

/// Prefix the file-format declaration is expected to carry
pub const FILEFORMAT_PREFIX: &[u8] = b"##fileformat=";

/// Whether a line is a `##` meta-information line
pub fn is_meta_line(line: &[u8]) -> bool {
    line.starts_with(META_PREFIX)
}

/// Whether a line is the single-`#` column header line
pub fn is_column_header(line: &[u8]) -> bool {
    line.first() == Some(&HEADER_PREFIX) && !line.starts_with(META_PREFIX)
}

/// Collected header lines, kept sorted and de-duplicated
#[derive(Debug, Clone)]
pub struct HeaderBlock {
    lines: BTreeSet<Vec<u8>>,
    format_prefix: Vec<u8>,
    dosage_key: String,
}

impl HeaderBlock {
    /// Start a block that will contain the given dosage declaration
    pub fn new(dosage_key: &str, dosage_line: String) -> Self {
        let mut lines = BTreeSet::new();
        lines.insert(dosage_line.into_bytes());
        Self {
            lines,
            format_prefix: format!("##FORMAT=<ID={},", dosage_key).into_bytes(),
            dosage_key: dosage_key.to_string(),
        }
    }

    /// Add a meta-information line
    ///
    /// Fails if the input already declares the dosage field, which means it
    /// has been annotated before.
    pub fn insert(&mut self, line: Vec<u8>, line_number: usize) -> Result<(), HeaderError> {
        if line.starts_with(&self.format_prefix) {
            return Err(HeaderError::AlreadyAnnotated {
                line: line_number,
                key: self.dosage_key.clone(),
            });
        }
        self.lines.insert(line);
        Ok(())
    }

    /// Number of distinct collected lines, including the dosage declaration
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Add the column header line and render the sorted block,
    /// one line per row with a trailing line break
    pub fn finish(mut self, column_header: Vec<u8>) -> Vec<u8> {
        self.lines.insert(column_header);
        let capacity = self.lines.iter().map(|l| l.len() + 1).sum();
        let mut block = Vec::with_capacity(capacity);
        for line in &self.lines {
            block.extend_from_slice(line);
            block.push(b'\n');
        }
        block
    }
}
