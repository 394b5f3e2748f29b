//! Error types for add-dosage
//!
//! Defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for add-dosage operations
#[derive(Debug, Error)]
pub enum AddDosageError {
    /// Header block protocol errors
    #[error("Header error: {0}")]
    Header(#[from] HeaderError),

    /// Data record errors
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    /// Transfer channel errors
    #[error("Pipeline error: {0}")]
    Channel(#[from] ChannelError),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Input file not found
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// The record transformer thread panicked
    #[error("Record transformer thread panicked")]
    TransformerPanicked,

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors in the header section of the input
#[derive(Debug, Error)]
pub enum HeaderError {
    /// Input did not start with a `##` meta-information line
    #[error("Missing file-format declaration, first line was '{found}'")]
    MissingFileFormat { found: String },

    /// A data line or end of input arrived before the `#CHROM` line
    #[error("Missing column header line before line {line}")]
    MissingColumnHeader { line: usize },

    /// The header already declares the dosage field
    #[error("Header already declares FORMAT field {key} at line {line}")]
    AlreadyAnnotated { line: usize, key: String },
}

/// Errors on a single data record
#[derive(Debug, Error)]
pub enum RecordError {
    /// Not enough tab-separated columns
    #[error("Line {line}: expected at least {expected} fields, found {found}")]
    TooFewFields {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// The likelihood key is absent from the FORMAT column
    #[error("Line {line}: FORMAT '{format}' has no {key} key")]
    MissingKey {
        line: usize,
        key: String,
        format: String,
    },

    /// The FORMAT column already carries the dosage key
    #[error("Line {line}: FORMAT '{format}' already contains {key}")]
    AlreadyAnnotated {
        line: usize,
        key: String,
        format: String,
    },

    /// A sample's likelihoods could not be turned into a dosage
    #[error("Line {line}, sample {sample}: {source}")]
    Likelihood {
        line: usize,
        sample: usize,
        source: LikelihoodError,
    },
}

/// Errors converting a Phred-scaled likelihood triple into a dosage
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LikelihoodError {
    /// Not exactly three comma-separated values
    #[error("expected 3 likelihood values, found {found}")]
    WrongCount { found: usize },

    /// A value that is not a finite number
    #[error("invalid likelihood value '{0}'")]
    InvalidNumber(String),

    /// All three linear-scale likelihoods vanished
    #[error("degenerate likelihoods '{0}': linear-scale sum is zero or not finite")]
    Degenerate(String),
}

/// Errors on the line transfer channel
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// The consumer dropped its end of the channel
    #[error("record transformer stopped before input was exhausted")]
    ConsumerHungUp,

    /// The producer dropped its end without sending the end-of-stream marker
    #[error("line source stopped without signalling end of input")]
    ProducerHungUp,
}

/// Result type alias for add-dosage operations
pub type Result<T> = std::result::Result<T, AddDosageError>;

/// Result type alias for record transformation
pub type RecordResult<T> = std::result::Result<T, RecordError>;

/// Result type alias for likelihood conversion
pub type LikelihoodResult<T> = std::result::Result<T, LikelihoodError>;
