//! Newline framing for streamed response bodies
//!
//! HTTP chunks do not line up with records, so chunks are accumulated in a
//! `BytesMut` and split on `\n`.

use bytes::{Buf, Bytes, BytesMut};

use crate::error::{Error, Result};

/// Longest line accepted from a stream
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Accumulates body chunks and yields complete lines
#[derive(Debug)]
pub struct LineBuffer {
    buf: BytesMut,
    /// Prefix of `buf` already known to hold no newline
    scanned: usize,
    max_line: usize,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::with_max_line(DEFAULT_MAX_LINE_LENGTH)
    }
}

impl LineBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer that rejects lines over `max_line` bytes
    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            scanned: 0,
            max_line,
        }
    }

    /// Append a chunk of body data
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Take the next complete line, without its terminator
    ///
    /// A trailing `\r` is stripped. Blank lines are skipped. Fails once a
    /// line, complete or not, grows past the length limit.
    pub fn next_line(&mut self) -> Result<Option<Bytes>> {
        loop {
            let Some(offset) = self.buf[self.scanned..].iter().position(|&b| b == b'\n') else {
                self.scanned = self.buf.len();
                if self.buf.len() > self.max_line {
                    return Err(Error::LineTooLong(self.max_line));
                }
                return Ok(None);
            };

            let pos = self.scanned + offset;
            self.scanned = 0;
            if pos > self.max_line {
                return Err(Error::LineTooLong(self.max_line));
            }

            let mut line = self.buf.split_to(pos);
            self.buf.advance(1);

            if line.last() == Some(&b'\r') {
                line.truncate(line.len() - 1);
            }
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Ok(Some(line.freeze()));
        }
    }

    /// Bytes buffered without a terminating newline yet
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}
