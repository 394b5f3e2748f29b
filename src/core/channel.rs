//! Line transfer channel
//!
//! A bounded single-producer/single-consumer queue of raw input lines. Both ends
//! block without polling: the producer when all slots are taken, the
//! consumer when the queue is empty.
//!
//! The end of input is an explicit [`Transfer::EndOfStream`] item rather than
//! a reserved line value, so no input line can be mistaken for it. It is sent
//! by [`LineSender::finish`], which consumes the sender, so it goes out exactly
//! once and always after the last line.

use crate::core::error::ChannelError;
use std::sync::mpsc::{self, Receiver, SyncSender};

/// One item on the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transfer {
    /// A single input line without its terminator, as read
    Line(Vec<u8>),
    /// No more lines will follow
    EndOfStream,
}

/// Producer end of the channel
pub struct LineSender {
    inner: SyncSender<Transfer>,
}

/// Consumer end of the channel
pub struct LineReceiver {
    inner: Receiver<Transfer>,
    finished: bool,
}

/// Create a channel holding at most `capacity` lines in flight
pub fn bounded(capacity: usize) -> (LineSender, LineReceiver) {
    let (tx, rx) = mpsc::sync_channel(capacity.max(1));
    (
        LineSender { inner: tx },
        LineReceiver {
            inner: rx,
            finished: false,
        },
    )
}

impl LineSender {
    /// Enqueue a line, blocking while the queue is full
    ///
    /// Fails only if the consumer has gone away.
    pub fn send(&self, line: Vec<u8>) -> Result<(), ChannelError> {
        self.inner
            .send(Transfer::Line(line))
            .map_err(|_| ChannelError::ConsumerHungUp)
    }

    /// Enqueue the end-of-stream marker and close the producer end
    pub fn finish(self) -> Result<(), ChannelError> {
        self.inner
            .send(Transfer::EndOfStream)
            .map_err(|_| ChannelError::ConsumerHungUp)
    }
}

impl LineReceiver {
    /// Dequeue the next line, blocking while the queue is empty
    ///
    /// Returns `Ok(None)` once the end-of-stream marker has been seen, and on
    /// every call after that.
    pub fn recv(&mut self) -> Result<Option<Vec<u8>>, ChannelError> {
        if self.finished {
            return Ok(None);
        }
        match self.inner.recv() {
            Ok(Transfer::Line(line)) => Ok(Some(line)),
            Ok(Transfer::EndOfStream) => {
                self.finished = true;
                Ok(None)
            }
            Err(_) => Err(ChannelError::ProducerHungUp),
        }
    }
}
