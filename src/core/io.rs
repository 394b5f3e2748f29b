//! Compressed stream I/O
//!
//! Opens the (optionally gzipped) VCF input as a buffered line reader and
//! creates the gzipped output with explicit close semantics.

use crate::core::error::{AddDosageError, Result};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, warn};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Default buffer size for readers and writers (128KB)
pub const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

/// Gzip magic bytes
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Compression format of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Plain text (uncompressed)
    Plain,
    /// Gzip or BGZF compressed (.gz)
    Gzip,
}

/// Detect compression format from file path and/or content
pub fn detect_compression(path: &Path) -> io::Result<CompressionFormat> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if extension == "gz" || extension == "bgz" {
        return Ok(CompressionFormat::Gzip);
    }

    let mut file = File::open(path)?;
    let mut magic = [0u8; 2];
    let mut filled = 0;
    while filled < magic.len() {
        match file.read(&mut magic[filled..])? {
            0 => break,
            n => filled += n,
        }
    }

    if filled == magic.len() && magic == GZIP_MAGIC {
        Ok(CompressionFormat::Gzip)
    } else {
        Ok(CompressionFormat::Plain)
    }
}

/// Output stream: gzip encoder over a buffered file
pub type GzOutput = GzEncoder<BufWriter<File>>;

/// Open the input as a buffered line reader
///
/// Gzip input is decoded with a multi-member decoder, so bgzip files are
/// read to the end rather than stopping after the first block.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let not_found = |e: io::Error| match e.kind() {
        io::ErrorKind::NotFound => AddDosageError::InputNotFound(path.to_path_buf()),
        _ => AddDosageError::Io(e),
    };
    let format = detect_compression(path).map_err(not_found)?;
    let file = File::open(path).map_err(not_found)?;

    match format {
        CompressionFormat::Gzip => {
            let decoder = MultiGzDecoder::new(file);
            Ok(Box::new(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, decoder)))
        }
        CompressionFormat::Plain => Ok(Box::new(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file))),
    }
}

/// Create the gzipped output file
pub fn create_output(path: &Path, level: u32) -> Result<GzOutput> {
    let file = File::create(path)?;
    let writer = BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file);
    Ok(GzEncoder::new(writer, Compression::new(level)))
}

/// Write the gzip trailer and flush everything to disk
pub fn finish_output(output: GzOutput) -> Result<()> {
    let mut writer = output.finish()?;
    writer.flush()?;
    Ok(())
}

/// Remove the output of a failed run
///
/// A dropped encoder still writes a valid gzip trailer, which would leave a
/// truncated file that decodes cleanly.
pub fn discard_output(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("Removed incomplete output {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove incomplete output {}: {}", path.display(), e),
    }
}
