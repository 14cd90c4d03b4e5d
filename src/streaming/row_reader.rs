//! Quote-aware CSV row tokenizer.
//!
//! Finds row boundaries in RFC 4180 style CSV without parsing fields. A row
//! separator inside a quoted field is data, not a boundary, so a naive
//! line-based split would cut such records in half. Rows are handed out as the
//! exact bytes that appeared in the input, minus the terminating separator.

use std::io::{self, BufRead, BufReader, Read};
use std::iter::FusedIterator;

use crate::config::{SplitConfig, DEFAULT_INITIAL_ROW_CAPACITY, DEFAULT_MAX_ROW_BYTES};
use crate::error::{Result, SplitError};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

pub const QUOTE: u8 = b'"';
pub const FIELD_SEPARATOR: u8 = b',';
pub const ROW_SEPARATOR: u8 = b'\n';

/// Size of the read buffer wrapped around the input (64 KB).
const READ_BUFFER_SIZE: usize = 64 * 1024;

// ─────────────────────────────────────────────────────────────────────────────
// Scanner State Machine
// ─────────────────────────────────────────────────────────────────────────────

/// Position of the scanner within the current row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// At the beginning of a field.
    Start,
    /// Inside a field that did not open with a quote.
    UnquotedField,
    /// Inside a quoted field.
    QuotedField,
    /// Just read a quote inside a quoted field. Either the field ends here or
    /// the quote is the first half of an escaped `""`.
    AfterQuote,
}

/// Outcome of feeding one byte to the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The byte belongs to the current row.
    Continue(ScanState),
    /// The byte terminates the current row.
    RowEnd,
    /// The byte cannot follow a closing quote.
    Invalid,
}

impl ScanState {
    /// Returns the transition taken on `byte` from this state.
    pub fn advance(self, byte: u8) -> Transition {
        use ScanState::*;

        match (self, byte) {
            (Start | UnquotedField | AfterQuote, ROW_SEPARATOR) => Transition::RowEnd,
            (Start | UnquotedField | AfterQuote, FIELD_SEPARATOR) => Transition::Continue(Start),
            (Start, QUOTE) => Transition::Continue(QuotedField),
            (Start | UnquotedField, _) => Transition::Continue(UnquotedField),
            (QuotedField, QUOTE) => Transition::Continue(AfterQuote),
            (QuotedField, _) => Transition::Continue(QuotedField),
            // Escaped quote
            (AfterQuote, QUOTE) => Transition::Continue(QuotedField),
            (AfterQuote, _) => Transition::Invalid,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row
// ─────────────────────────────────────────────────────────────────────────────

/// One CSV record as raw bytes, without its terminator.
///
/// May contain row separators that sat inside quoted fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Row(Vec<u8>);

impl Row {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Size of the row once written out, terminator included.
    pub fn encoded_len(&self) -> u64 {
        self.0.len() as u64 + 1
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Row {
    fn from(bytes: Vec<u8>) -> Self {
        Row(bytes)
    }
}

impl From<&[u8]> for Row {
    fn from(bytes: &[u8]) -> Self {
        Row(bytes.to_vec())
    }
}

impl From<&str> for Row {
    fn from(s: &str) -> Self {
        Row(s.as_bytes().to_vec())
    }
}

impl AsRef<[u8]> for Row {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row Reader
// ─────────────────────────────────────────────────────────────────────────────

/// Pulls rows out of a byte stream, one at a time.
///
/// Iteration is single-pass. The iterator is fused: after the stream ends or
/// the first error is returned, it only yields `None`.
pub struct RowReader<R> {
    reader: BufReader<R>,
    /// Bytes of the row being assembled.
    row: Vec<u8>,
    initial_capacity: usize,
    max_row_bytes: usize,
    rows_read: u64,
    /// Bytes consumed from the input so far.
    position: u64,
    done: bool,
}

impl<R: Read> RowReader<R> {
    /// Creates a reader with the default 64 KB initial and 10 MB maximum row
    /// buffer.
    pub fn new(reader: R) -> Self {
        Self::with_limits(reader, DEFAULT_INITIAL_ROW_CAPACITY, DEFAULT_MAX_ROW_BYTES)
    }

    /// Creates a reader whose row buffer starts at `initial_capacity` bytes
    /// and never grows past `max_row_bytes`.
    pub fn with_limits(reader: R, initial_capacity: usize, max_row_bytes: usize) -> Self {
        let initial_capacity = initial_capacity.min(max_row_bytes);
        Self {
            reader: BufReader::with_capacity(READ_BUFFER_SIZE, reader),
            row: Vec::with_capacity(initial_capacity),
            initial_capacity,
            max_row_bytes,
            rows_read: 0,
            position: 0,
            done: false,
        }
    }

    pub fn from_config(reader: R, config: &SplitConfig) -> Self {
        Self::with_limits(reader, config.initial_row_capacity, config.max_row_bytes)
    }

    /// Number of rows produced so far.
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Reads the next row, or `None` at end of stream.
    fn read_row(&mut self) -> Result<Option<Row>> {
        self.row.clear();
        let mut state = ScanState::Start;

        loop {
            let available = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(SplitError::io("reading input", e)),
            };

            if available.is_empty() {
                // A final row without a terminator still counts.
                if self.row.is_empty() {
                    return Ok(None);
                }
                self.rows_read += 1;
                return Ok(Some(Row::from(self.row.as_slice())));
            }

            let mut boundary = None;
            let mut invalid = None;
            for (i, &byte) in available.iter().enumerate() {
                match state.advance(byte) {
                    Transition::Continue(next) => state = next,
                    Transition::RowEnd => {
                        boundary = Some(i);
                        break;
                    }
                    Transition::Invalid => {
                        invalid = Some((i, byte));
                        break;
                    }
                }
            }

            let body_len = boundary
                .or(invalid.map(|(i, _)| i))
                .unwrap_or(available.len());

            if self.row.len() + body_len > self.max_row_bytes {
                return Err(SplitError::RowTooLarge {
                    row: self.rows_read + 1,
                    max_bytes: self.max_row_bytes,
                });
            }

            if let Some((i, byte)) = invalid {
                return Err(SplitError::MalformedQuoting {
                    byte,
                    row: self.rows_read + 1,
                    offset: self.position + i as u64,
                });
            }

            let capacity = self.row.capacity();
            self.row.extend_from_slice(&available[..body_len]);
            if self.row.capacity() > capacity && self.row.capacity() > self.initial_capacity {
                tracing::debug!(
                    row = self.rows_read + 1,
                    capacity = self.row.capacity(),
                    "Grew row buffer"
                );
            }

            let consumed = body_len + usize::from(boundary.is_some());
            self.reader.consume(consumed);
            self.position += consumed as u64;

            if boundary.is_some() {
                self.rows_read += 1;
                return Ok(Some(Row::from(self.row.as_slice())));
            }
        }
    }
}

impl<R: Read> Iterator for RowReader<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> FusedIterator for RowReader<R> {}
