//! Relay engine moving bytes from a reader to a writer through a [`RingBuffer`].
//!
//! Every iteration runs a fill phase (one read into the free span at `tail`) followed by a drain
//! phase (writes from `head` until the buffer is empty or the destination takes fewer bytes than
//! offered). The loop ends only once the source reported end-of-file *and* the buffer is empty, so
//! bytes still held in the buffer when the source runs dry are always written out.
//!
//! Calls failing with [`std::io::ErrorKind::Interrupted`] are retried against the exact same span.

use std::io::{Read, Write};
use tracing::instrument;

use crate::ring::RingBuffer;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed reading from source after {} bytes", .summary.bytes_copied)]
    Read {
        #[source]
        source: std::io::Error,
        summary: Summary,
    },
    #[error("failed writing to destination after {} bytes", .summary.bytes_copied)]
    Write {
        #[source]
        source: std::io::Error,
        summary: Summary,
    },
}

impl Error {
    pub fn summary(&self) -> &Summary {
        match self {
            Error::Read { summary, .. } | Error::Write { summary, .. } => summary,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub bytes_copied: u64,
    /// read calls that returned data
    pub reads: usize,
    /// write calls that accepted at least one byte
    pub writes: usize,
    pub short_writes: usize,
    /// calls of either kind retried after an interruption
    pub interrupted: usize,
    /// times the fill cursor wrapped back to the start of storage
    pub wraps: usize,
}

impl std::ops::Add for Summary {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            bytes_copied: self.bytes_copied + other.bytes_copied,
            reads: self.reads + other.reads,
            writes: self.writes + other.writes,
            short_writes: self.short_writes + other.short_writes,
            interrupted: self.interrupted + other.interrupted,
            wraps: self.wraps + other.wraps,
        }
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "bytes copied: {}\n\
            reads: {}\n\
            writes: {}\n\
            short writes: {}\n\
            interrupted calls retried: {}\n\
            buffer wraparounds: {}",
            bytesize::ByteSize(self.bytes_copied),
            self.reads,
            self.writes,
            self.short_writes,
            self.interrupted,
            self.wraps,
        )
    }
}

#[derive(Debug)]
pub struct Relay {
    ring: RingBuffer,
    source_exhausted: bool,
    summary: Summary,
}

impl Relay {
    pub fn new(capacity: usize) -> Self {
        Self::with_buffer(RingBuffer::new(capacity))
    }

    /// Relays through `ring`, which must be empty.
    pub fn with_buffer(ring: RingBuffer) -> Self {
        assert!(ring.is_empty(), "relay buffer must start empty");
        Self {
            ring,
            source_exhausted: false,
            summary: Summary::default(),
        }
    }

    /// Runs the transfer to completion, consuming the relay and its buffer.
    #[instrument(skip_all)]
    pub fn run<R, W>(mut self, src: &mut R, dst: &mut W) -> Result<Summary, Error>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        tracing::debug!("relaying through a {} byte buffer", self.ring.capacity());
        while !self.source_exhausted || !self.ring.is_empty() {
            if !self.source_exhausted && !self.ring.is_full() {
                self.fill(src).map_err(|source| Error::Read {
                    source,
                    summary: self.summary,
                })?;
            }
            self.drain(dst).map_err(|source| Error::Write {
                source,
                summary: self.summary,
            })?;
        }
        dst.flush().map_err(|source| Error::Write {
            source,
            summary: self.summary,
        })?;
        tracing::debug!("relay finished: {:?}", &self.summary);
        Ok(self.summary)
    }

    fn fill<R: Read + ?Sized>(&mut self, src: &mut R) -> std::io::Result<()> {
        let span = self.ring.writable_span();
        if span.is_empty() {
            return Ok(());
        }
        let bytes_read = loop {
            match src.read(self.ring.slice_mut(span)) {
                Ok(n) => break n,
                Err(error) if error.kind() == std::io::ErrorKind::Interrupted => {
                    tracing::debug!("read interrupted, retrying at offset {}", span.offset);
                    self.summary.interrupted += 1;
                }
                Err(error) => return Err(error),
            }
        };
        if bytes_read == 0 {
            tracing::debug!("source exhausted, {} bytes left to drain", self.ring.stored());
            self.source_exhausted = true;
            return Ok(());
        }
        tracing::trace!(
            "filled {} of {} bytes at offset {}",
            bytes_read,
            span.len,
            span.offset
        );
        self.ring.commit_write(bytes_read);
        self.summary.reads += 1;
        if self.ring.tail() == 0 {
            self.summary.wraps += 1;
        }
        Ok(())
    }

    fn drain<W: Write + ?Sized>(&mut self, dst: &mut W) -> std::io::Result<()> {
        while !self.ring.is_empty() {
            let span = self.ring.readable_span();
            let written = loop {
                match dst.write(self.ring.slice(span)) {
                    Ok(0) => {
                        return Err(std::io::Error::new(
                            std::io::ErrorKind::WriteZero,
                            "destination accepted no bytes",
                        ));
                    }
                    Ok(n) => break n,
                    Err(error) if error.kind() == std::io::ErrorKind::Interrupted => {
                        tracing::debug!("write interrupted, retrying at offset {}", span.offset);
                        self.summary.interrupted += 1;
                    }
                    Err(error) => return Err(error),
                }
            };
            tracing::trace!(
                "drained {} of {} bytes at offset {}",
                written,
                span.len,
                span.offset
            );
            self.ring.commit_read(written);
            self.summary.writes += 1;
            self.summary.bytes_copied += written as u64;
            if written < span.len {
                // let the source refill before offering the remainder again
                self.summary.short_writes += 1;
                break;
            }
        }
        Ok(())
    }
}

/// Copies everything from `src` to `dst` through a fresh buffer of `capacity` bytes.
pub fn relay<R, W>(src: &mut R, dst: &mut W, capacity: usize) -> Result<Summary, Error>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    Relay::new(capacity).run(src, dst)
}
