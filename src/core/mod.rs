//! Core pipeline functionality
//!
//! This module contains the line transfer channel, the line source,
//! compressed I/O, configuration and the dosage arithmetic.

mod channel;
pub mod config;
mod dosage;
mod error;
pub mod io;
mod source;

pub use channel::{bounded, LineReceiver, LineSender, Transfer};
pub use config::{
    DegeneratePolicy, DosageConfig, NonSnpPolicy, VcfLayout, ALT_COLUMN, DEFAULT_QUEUE_CAPACITY,
    DOSAGE_KEY, FORMAT_COLUMN, LIKELIHOOD_KEY, REF_COLUMN,
};
pub use dosage::{phred_to_linear, sample_dosage, Dosage, GenotypeLikelihoods, MISSING_VALUE};
pub use error::{
    AddDosageError, ChannelError, HeaderError, LikelihoodError, LikelihoodResult, RecordError,
    RecordResult, Result,
};
pub use io::{CompressionFormat, DEFAULT_BUFFER_SIZE};
pub use source::{LineSource, SourceOutcome};
