//! Line source
//!
//! Reads the decompressed input line by line and feeds the transfer channel.

use crate::core::channel::LineSender;
use crate::core::error::Result;
use log::debug;
use std::io::{self, BufRead};

/// How the source stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOutcome {
    /// Every line and the end-of-stream marker were enqueued
    Finished { lines: usize },
    /// The consumer went away first; it holds the reason
    ConsumerStopped { lines: usize },
}

/// Producer stage reading owned byte lines from a buffered reader
///
/// Lines are not decoded; bytes outside UTF-8 pass through untouched.
pub struct LineSource<R: BufRead> {
    reader: R,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read the next line with its `\n` or `\r\n` terminator removed
    /// Returns None at EOF, Some(Ok(line)) on success, Some(Err) on error
    pub fn next_line(&mut self) -> Option<io::Result<Vec<u8>>> {
        let mut line = Vec::with_capacity(256);
        match self.reader.read_until(b'\n', &mut line) {
            Ok(0) => None,
            Ok(_) => {
                if line.last() == Some(&b'\n') {
                    line.pop();
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                }
                Some(Ok(line))
            }
            Err(e) => Some(Err(e)),
        }
    }

    /// Push every line into the channel, then the end-of-stream marker
    ///
    /// A read error is returned immediately; the sender is dropped without
    /// the marker so the consumer stops as well.
    pub fn pump(mut self, sender: LineSender) -> Result<SourceOutcome> {
        let mut lines = 0;
        while let Some(line) = self.next_line() {
            let line = line?;
            if sender.send(line).is_err() {
                debug!("Record transformer stopped after {} lines", lines);
                return Ok(SourceOutcome::ConsumerStopped { lines });
            }
            lines += 1;
        }
        match sender.finish() {
            Ok(()) => {
                debug!("Line source finished after {} lines", lines);
                Ok(SourceOutcome::Finished { lines })
            }
            Err(_) => Ok(SourceOutcome::ConsumerStopped { lines }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::channel;
    use crate::core::error::{AddDosageError, ChannelError};
    use std::io::{BufReader, Cursor, Read};

    #[test]
    fn test_next_line_strips_terminators() {
        let mut source = LineSource::new(Cursor::new("line1\nline2\r\nline3"));
        assert_eq!(source.next_line().unwrap().unwrap(), b"line1");
        assert_eq!(source.next_line().unwrap().unwrap(), b"line2");
        assert_eq!(source.next_line().unwrap().unwrap(), b"line3");
        assert!(source.next_line().is_none());
    }

    #[test]
    fn test_next_line_keeps_non_utf8_bytes() {
        let mut source = LineSource::new(Cursor::new(b"##source=caf\xe9\n".to_vec()));
        assert_eq!(source.next_line().unwrap().unwrap(), b"##source=caf\xe9");
        assert!(source.next_line().is_none());
    }

    #[test]
    fn test_pump_sends_lines_then_marker() {
        let (tx, mut rx) = channel::bounded(8);
        let outcome = LineSource::new(Cursor::new("a\nb\n")).pump(tx).unwrap();
        assert_eq!(outcome, SourceOutcome::Finished { lines: 2 });

        assert_eq!(rx.recv().unwrap(), Some(b"a".to_vec()));
        assert_eq!(rx.recv().unwrap(), Some(b"b".to_vec()));
        assert_eq!(rx.recv().unwrap(), None);
    }

    #[test]
    fn test_pump_keeps_empty_lines() {
        let (tx, mut rx) = channel::bounded(8);
        LineSource::new(Cursor::new("a\n\nb\n")).pump(tx).unwrap();
        assert_eq!(rx.recv().unwrap(), Some(b"a".to_vec()));
        assert_eq!(rx.recv().unwrap(), Some(Vec::new()));
        assert_eq!(rx.recv().unwrap(), Some(b"b".to_vec()));
    }

    #[test]
    fn test_pump_consumer_gone() {
        let (tx, rx) = channel::bounded(1);
        drop(rx);
        let outcome = LineSource::new(Cursor::new("a\nb\n")).pump(tx).unwrap();
        assert_eq!(outcome, SourceOutcome::ConsumerStopped { lines: 0 });
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
        }
    }

    #[test]
    fn test_pump_read_error_drops_marker() {
        let (tx, mut rx) = channel::bounded(4);
        let result = LineSource::new(BufReader::new(FailingReader)).pump(tx);
        assert!(matches!(result, Err(AddDosageError::Io(_))));
        assert_eq!(rx.recv(), Err(ChannelError::ProducerHungUp));
    }
}
