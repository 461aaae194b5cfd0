//! Newline framing across chunk boundaries
//!
//! Framing happens on raw bytes. `\n` never occurs inside a multi-byte UTF-8
//! sequence, so a character split across two chunks is simply carried in the
//! pending buffer until its line completes, and each line is decoded to text
//! exactly once.

use crate::error::{Error, Result};
use bytes::BytesMut;
use smallvec::SmallVec;

/// Complete lines produced by one [`LineAssembler::feed`] call
pub type Lines = SmallVec<[String; 4]>;

/// Incremental NDJSON line splitter
#[derive(Debug)]
pub struct LineAssembler {
    pending: BytesMut,
    /// Prefix of `pending` already known to contain no terminator
    scanned: usize,
    max_line_bytes: usize,
    /// Set once a line went over the limit; the assembler stays failed
    overflowed: bool,
}

impl LineAssembler {
    /// Create an assembler that rejects lines longer than `max_line_bytes`.
    ///
    /// The limit applies to a line's content, without its `\n` or `\r\n`
    /// terminator.
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            pending: BytesMut::new(),
            scanned: 0,
            max_line_bytes,
            overflowed: false,
        }
    }

    /// Append `chunk` and return every line it completed, in order.
    ///
    /// Blank lines are dropped. The trailing partial line stays pending.
    ///
    /// # Errors
    ///
    /// [`Error::LineTooLong`] once a line, complete or still pending, exceeds
    /// the limit. The outcome does not depend on how the bytes were chunked.
    /// Lines completed ahead of the oversized one in the same call are still
    /// returned; the error then surfaces on the next call. Lines after the
    /// oversized one are never returned.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Lines> {
        self.ensure_within_limit()?;
        self.pending.extend_from_slice(chunk);

        let mut lines = Lines::new();
        while let Some(offset) = memchr::memchr(b'\n', &self.pending[self.scanned..]) {
            let mut line = self.pending.split_to(self.scanned + offset + 1);
            self.scanned = 0;
            line.truncate(line.len() - 1);
            if content_len(&line) > self.max_line_bytes {
                self.overflowed = true;
                break;
            }
            if let Some(text) = decode_line(&line) {
                lines.push(text);
            }
        }

        if !self.overflowed && content_len(&self.pending) > self.max_line_bytes {
            self.overflowed = true;
        }
        if self.overflowed {
            self.pending.clear();
            self.scanned = 0;
            if lines.is_empty() {
                self.ensure_within_limit()?;
            }
        } else {
            self.scanned = self.pending.len();
        }
        Ok(lines)
    }

    /// Flush the unterminated remainder at end of stream.
    ///
    /// Returns `None` when nothing (or only whitespace) is pending.
    pub fn finalize(&mut self) -> Result<Option<String>> {
        self.ensure_within_limit()?;
        let remainder = self.pending.split();
        self.scanned = 0;
        Ok(decode_line(&remainder))
    }

    /// Discard pending data after cancellation
    pub fn reset(&mut self) {
        self.pending.clear();
        self.scanned = 0;
        self.overflowed = false;
    }

    /// Bytes waiting for a terminator
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn ensure_within_limit(&self) -> Result<()> {
        if self.overflowed {
            return Err(Error::LineTooLong {
                limit: self.max_line_bytes,
            });
        }
        Ok(())
    }
}

/// Length of a line without the `\r` of a CRLF terminator
fn content_len(bytes: &[u8]) -> usize {
    bytes.strip_suffix(b"\r").unwrap_or(bytes).len()
}

fn decode_line(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    let text = String::from_utf8_lossy(bytes);
    if text.trim().is_empty() {
        None
    } else {
        Some(text.into_owned())
    }
}
