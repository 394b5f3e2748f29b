//! VCF dosage annotation
//!
//! Streams a VCF through a two-stage pipeline: a [`LineSource`] reading the
//! decompressed input, and a [`RecordTransformer`] that rewrites the header
//! block and appends a `DS` value to every sample of every data record.
//! The two stages run on separate threads connected by a bounded channel,
//! so decompression of the input overlaps with parsing, dosage arithmetic
//! and compression of the output.
//!
//! Lines travel as raw bytes. Only the FORMAT column and the `PL` sub-field
//! of each sample are decoded; every other byte is copied through as read.

use crate::core::io;
use crate::core::{
    bounded, sample_dosage, AddDosageError, Dosage, DosageConfig, HeaderError, LineReceiver,
    LineSource, NonSnpPolicy, RecordError, RecordResult, Result, VcfLayout,
};
use crate::formats::header::{self, HeaderBlock};
use log::{debug, info, warn};
use memchr::memchr;
use std::io::{BufRead, Write};
use std::path::Path;
use std::thread;

/// Zero-copy view of a data line
/// Columns are located once; nothing is copied until output
pub struct VcfRecordView<'a> {
    /// Original line
    line: &'a [u8],
    /// Field boundaries (start, end)
    field_bounds: Vec<(usize, usize)>,
    ref_column: usize,
    alt_column: usize,
    format_column: usize,
}

impl<'a> VcfRecordView<'a> {
    /// Split a data line into columns
    ///
    /// `line_number` is only used for error reporting.
    pub fn parse(line: &'a [u8], layout: &VcfLayout, line_number: usize) -> RecordResult<Self> {
        let separator = layout.field_separator;

        let mut field_bounds = Vec::with_capacity(16);
        let mut start = 0;
        while let Some(offset) = memchr(separator, &line[start..]) {
            field_bounds.push((start, start + offset));
            start += offset + 1;
        }
        field_bounds.push((start, line.len()));

        if field_bounds.len() < layout.min_fields() {
            return Err(RecordError::TooFewFields {
                line: line_number,
                expected: layout.min_fields(),
                found: field_bounds.len(),
            });
        }

        Ok(Self {
            line,
            field_bounds,
            ref_column: layout.ref_column,
            alt_column: layout.alt_column,
            format_column: layout.format_column,
        })
    }

    /// Get the number of fields
    pub fn field_count(&self) -> usize {
        self.field_bounds.len()
    }

    /// Get field as byte slice
    pub fn field(&self, index: usize) -> Option<&'a [u8]> {
        self.field_bounds
            .get(index)
            .map(|&(start, end)| &self.line[start..end])
    }

    /// Columns up to and including FORMAT
    pub fn fixed_fields(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        (0..=self.format_column).filter_map(move |i| self.field(i))
    }

    pub fn ref_allele(&self) -> &'a [u8] {
        self.field(self.ref_column).unwrap_or(b"")
    }

    pub fn alt_alleles(&self) -> &'a [u8] {
        self.field(self.alt_column).unwrap_or(b"")
    }

    pub fn format(&self) -> &'a [u8] {
        self.field(self.format_column).unwrap_or(b"")
    }

    /// Sample columns after FORMAT
    pub fn samples(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        (self.format_column + 1..self.field_count()).filter_map(move |i| self.field(i))
    }

    pub fn sample_count(&self) -> usize {
        self.field_count() - self.format_column - 1
    }

    /// Single-nucleotide variant: REF and ALT are one base each
    pub fn is_snp(&self) -> bool {
        self.ref_allele().len() == 1 && self.alt_alleles().len() == 1
    }

    /// Position of `key` in the FORMAT key list
    pub fn format_key_index(&self, key: &str, separator: u8) -> Option<usize> {
        self.format()
            .split(|&b| b == separator)
            .position(|k| k == key.as_bytes())
    }
}

/// Conversion statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConversionStats {
    /// Header lines written, including the file-format declaration
    pub header_lines: usize,
    /// Data records read
    pub records: usize,
    /// Records written with dosages
    pub annotated: usize,
    /// Non-SNP records dropped
    pub skipped: usize,
    /// Non-SNP records written unchanged
    pub passed_through: usize,
    /// Sample dosages written
    pub samples: usize,
    /// Sample dosages written as missing
    pub missing_dosages: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Waiting for the file-format declaration
    Declaration,
    /// Collecting `##` lines until the column header
    Header,
    /// Everything after the column header is a data record
    Records,
}

/// Consumer stage: turns input lines into annotated output
///
/// Each input line is formatted into a reusable buffer which is written to
/// the output before the next line is taken.
pub struct RecordTransformer<'c, W: Write> {
    writer: W,
    config: &'c DosageConfig,
    mode: Mode,
    header: Option<HeaderBlock>,
    buffer: Vec<u8>,
    line_number: usize,
    stats: ConversionStats,
}

impl<'c, W: Write> RecordTransformer<'c, W> {
    pub fn new(writer: W, config: &'c DosageConfig) -> Self {
        Self {
            writer,
            config,
            mode: Mode::Declaration,
            header: None,
            buffer: Vec::with_capacity(4096),
            line_number: 0,
            stats: ConversionStats::default(),
        }
    }

    pub fn stats(&self) -> &ConversionStats {
        &self.stats
    }

    /// Drain the channel until the end-of-stream marker, then finish
    pub fn run(mut self, mut receiver: LineReceiver) -> Result<(W, ConversionStats)> {
        while let Some(line) = receiver.recv()? {
            self.process_line(line)?;
        }
        self.finish()
    }

    /// Handle one input line
    pub fn process_line(&mut self, line: Vec<u8>) -> Result<()> {
        self.line_number += 1;
        self.buffer.clear();

        match self.mode {
            Mode::Declaration => self.declaration(line)?,
            Mode::Header => self.header_line(line)?,
            Mode::Records => self.record(&line)?,
        }

        if !self.buffer.is_empty() {
            self.writer.write_all(&self.buffer)?;
        }
        Ok(())
    }

    /// Flush the output and hand back the writer
    ///
    /// Fails if the input ended before the column header line.
    pub fn finish(mut self) -> Result<(W, ConversionStats)> {
        match self.mode {
            Mode::Declaration => {
                return Err(HeaderError::MissingFileFormat {
                    found: String::new(),
                }
                .into())
            }
            Mode::Header => {
                return Err(HeaderError::MissingColumnHeader {
                    line: self.line_number + 1,
                }
                .into())
            }
            Mode::Records => {}
        }
        self.writer.flush()?;
        Ok((self.writer, self.stats))
    }

    fn declaration(&mut self, line: Vec<u8>) -> Result<()> {
        if !header::is_meta_line(&line) {
            return Err(HeaderError::MissingFileFormat {
                found: String::from_utf8_lossy(&line).into_owned(),
            }
            .into());
        }
        if !line.starts_with(header::FILEFORMAT_PREFIX) {
            warn!(
                "First line is not a file-format declaration: {}",
                String::from_utf8_lossy(&line)
            );
        }
        self.buffer.extend_from_slice(&line);
        self.buffer.push(b'\n');
        self.stats.header_lines += 1;

        self.header = Some(HeaderBlock::new(
            &self.config.dosage_key,
            self.config.dosage_header_line(),
        ));
        self.mode = Mode::Header;
        Ok(())
    }

    fn header_line(&mut self, line: Vec<u8>) -> Result<()> {
        let block = match self.header.as_mut() {
            Some(block) => block,
            None => {
                return Err(HeaderError::MissingFileFormat {
                    found: String::from_utf8_lossy(&line).into_owned(),
                }
                .into());
            }
        };

        if header::is_meta_line(&line) {
            block.insert(line, self.line_number)?;
            return Ok(());
        }
        if !header::is_column_header(&line) {
            return Err(HeaderError::MissingColumnHeader {
                line: self.line_number,
            }
            .into());
        }

        if let Some(block) = self.header.take() {
            self.stats.header_lines += block.line_count() + 1;
            self.buffer.extend_from_slice(&block.finish(line));
        }
        info!("Header block written ({} lines)", self.stats.header_lines);
        self.mode = Mode::Records;
        Ok(())
    }

    fn record(&mut self, line: &[u8]) -> Result<()> {
        if line.is_empty() {
            debug!("Skipping empty line {}", self.line_number);
            return Ok(());
        }
        self.stats.records += 1;

        let config = self.config;
        let layout = &config.layout;
        let view = VcfRecordView::parse(line, layout, self.line_number)?;

        if !view.is_snp() {
            match config.non_snp {
                NonSnpPolicy::Annotate => {}
                NonSnpPolicy::Skip => {
                    debug!("Skipping non-SNP record at line {}", self.line_number);
                    self.stats.skipped += 1;
                    return Ok(());
                }
                NonSnpPolicy::PassThrough => {
                    debug!("Passing through non-SNP record at line {}", self.line_number);
                    self.buffer.extend_from_slice(line);
                    self.buffer.push(b'\n');
                    self.stats.passed_through += 1;
                    return Ok(());
                }
            }
        }

        if view
            .format_key_index(&config.dosage_key, layout.key_separator)
            .is_some()
        {
            return Err(RecordError::AlreadyAnnotated {
                line: self.line_number,
                key: config.dosage_key.clone(),
                format: String::from_utf8_lossy(view.format()).into_owned(),
            }
            .into());
        }
        let likelihood_index = view
            .format_key_index(&config.likelihood_key, layout.key_separator)
            .ok_or_else(|| RecordError::MissingKey {
                line: self.line_number,
                key: config.likelihood_key.clone(),
                format: String::from_utf8_lossy(view.format()).into_owned(),
            })?;

        for field in view.fixed_fields() {
            self.buffer.extend_from_slice(field);
            self.buffer.push(layout.field_separator);
        }
        // The FORMAT column was just written; extend it in place.
        self.buffer.pop();
        self.buffer.push(layout.key_separator);
        self.buffer.extend_from_slice(config.dosage_key.as_bytes());

        for (index, sample) in view.samples().enumerate() {
            let dosage = sample_dosage(
                sample,
                likelihood_index,
                layout.key_separator,
                layout.value_separator,
                config.degenerate,
            )
            .map_err(|source| RecordError::Likelihood {
                line: self.line_number,
                sample: index + 1,
                source,
            })?;

            if let Dosage::Missing = dosage {
                self.stats.missing_dosages += 1;
            }
            self.buffer.push(layout.field_separator);
            self.buffer.extend_from_slice(sample);
            self.buffer.push(layout.key_separator);
            write!(self.buffer, "{}", dosage)?;
        }
        self.buffer.push(b'\n');

        self.stats.samples += view.sample_count();
        self.stats.annotated += 1;
        Ok(())
    }
}

/// Run the two-stage pipeline from a reader to a writer
///
/// The calling thread reads lines; the record transformer runs on a scoped
/// worker thread. Returns the writer (not yet closed) and the statistics.
pub fn transform_stream<R, W>(reader: R, writer: W, config: &DosageConfig) -> Result<(W, ConversionStats)>
where
    R: BufRead,
    W: Write + Send,
{
    config.validate()?;
    let (sender, receiver) = bounded(config.queue_capacity);

    thread::scope(|scope| {
        let transformer = scope.spawn(move || RecordTransformer::new(writer, config).run(receiver));

        let produced = LineSource::new(reader).pump(sender);
        let transformed = transformer
            .join()
            .map_err(|_| AddDosageError::TransformerPanicked)?;

        // A read error is the root cause of the transformer's disconnect.
        let outcome = produced?;
        debug!("Line source outcome: {:?}", outcome);
        transformed
    })
}

/// Annotate a gzipped VCF file with per-sample dosages
///
/// On failure the output file is removed, so a readable output always holds
/// a complete run.
///
/// # Arguments
/// * `input` - Input VCF file (gzip, bgzip or plain text)
/// * `output` - Output file, always gzip compressed
/// * `config` - Pipeline configuration
///
/// # Returns
/// Conversion statistics
pub fn add_dosage<P: AsRef<Path>>(input: P, output: P, config: &DosageConfig) -> Result<ConversionStats> {
    config.validate()?;
    let output = output.as_ref();
    let reader = io::open_input(input.as_ref())?;
    let writer = io::create_output(output, config.compression_level)?;

    let result = transform_stream(reader, writer, config)
        .and_then(|(writer, stats)| io::finish_output(writer).map(|()| stats));
    let stats = match result {
        Ok(stats) => stats,
        Err(e) => {
            io::discard_output(output);
            return Err(e);
        }
    };

    info!(
        "Annotated {} of {} records ({} skipped, {} passed through)",
        stats.annotated, stats.records, stats.skipped, stats.passed_through
    );
    Ok(stats)
}
