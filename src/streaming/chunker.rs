//! Record-aware chunking that never splits a row.
//!
//! Rows are assigned greedily: a new chunk starts whenever the next row would
//! push the current one past the byte budget. The budget is checked before
//! each write, so a row larger than the whole budget still goes out whole, on
//! its own in a fresh chunk.

use std::io::{Read, Write};

use crate::config::SplitConfig;
use crate::error::{Result, SplitError};
use crate::sink::SinkFactory;
use crate::streaming::row_reader::{Row, RowReader, ROW_SEPARATOR};

/// Result of splitting a row stream into chunks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitSummary {
    /// Number of chunks written.
    pub chunks: u64,
    /// Total rows written across all chunks.
    pub total_rows: u64,
    /// Total bytes written, terminators included.
    pub total_bytes: u64,
    /// Number of rows in each chunk.
    pub rows_per_chunk: Vec<u64>,
    /// Number of bytes in each chunk (parallel to `rows_per_chunk`).
    pub bytes_per_chunk: Vec<u64>,
}

/// Writes rows into a sequence of sinks, one chunk per sink.
pub struct Chunker<F: SinkFactory> {
    factory: F,
    max_bytes: u64,
    sink: Option<F::Sink>,
    chunk_bytes: u64,
    chunk_rows: u64,
    summary: SplitSummary,
}

impl<F: SinkFactory> Chunker<F> {
    /// Creates a chunker that keeps each chunk at or under `max_bytes`
    /// (except a chunk holding a single oversized row).
    ///
    /// # Errors
    ///
    /// Returns `SplitError::Config` if `max_bytes` is zero.
    pub fn new(factory: F, max_bytes: u64) -> Result<Self> {
        if max_bytes == 0 {
            return Err(SplitError::Config(
                "line bytes must be a positive integer (0)".to_string(),
            ));
        }

        Ok(Self {
            factory,
            max_bytes,
            sink: None,
            // No capacity left, so the first row opens a sink.
            chunk_bytes: max_bytes,
            chunk_rows: 0,
            summary: SplitSummary::default(),
        })
    }

    /// Writes one row and its terminator, starting a new chunk first if the
    /// row does not fit in the current one. The sink is flushed before
    /// returning.
    pub fn write_row(&mut self, row: &Row) -> Result<()> {
        let row_size = row.encoded_len();

        let fits = self.chunk_bytes.saturating_add(row_size) <= self.max_bytes;
        let sink = match self.sink.take() {
            Some(sink) if fits => self.sink.insert(sink),
            current => {
                self.sink = current;
                self.start_chunk()?
            }
        };
        write_through(sink, row.as_bytes())?;

        self.chunk_bytes += row_size;
        self.chunk_rows += 1;
        self.summary.total_rows += 1;
        self.summary.total_bytes += row_size;
        Ok(())
    }

    /// Closes the last chunk and returns the summary along with the factory.
    pub fn finish(mut self) -> Result<(SplitSummary, F)> {
        self.close_chunk()?;

        tracing::debug!(
            total_rows = self.summary.total_rows,
            chunk_count = self.summary.chunks,
            "CSV split complete"
        );

        Ok((self.summary, self.factory))
    }

    /// Closes the active sink, if any, discarding its close error.
    ///
    /// Used after a failure, when the original error is the one to report.
    pub fn abort(mut self) -> F {
        if let Some(sink) = self.sink.take() {
            if let Err(e) = self.factory.close_sink(sink) {
                tracing::warn!(error = %e, "Failed to close chunk after error");
            }
        }
        self.factory
    }

    /// Closes the current chunk and opens the next one.
    fn start_chunk(&mut self) -> Result<&mut F::Sink> {
        self.close_chunk()?;

        let sink = self.factory.next_sink()?;
        self.chunk_bytes = 0;
        self.chunk_rows = 0;
        Ok(self.sink.insert(sink))
    }

    fn close_chunk(&mut self) -> Result<()> {
        let Some(sink) = self.sink.take() else {
            return Ok(());
        };

        self.factory.close_sink(sink)?;
        self.summary.chunks += 1;
        self.summary.rows_per_chunk.push(self.chunk_rows);
        self.summary.bytes_per_chunk.push(self.chunk_bytes);

        tracing::debug!(
            chunk_index = self.summary.chunks - 1,
            rows = self.chunk_rows,
            bytes = self.chunk_bytes,
            "Completed chunk"
        );
        Ok(())
    }
}

/// Writes `bytes` plus the row terminator and flushes.
fn write_through<W: Write>(sink: &mut W, bytes: &[u8]) -> Result<()> {
    sink.write_all(bytes)
        .and_then(|()| sink.write_all(&[ROW_SEPARATOR]))
        .and_then(|()| sink.flush())
        .map_err(|e| SplitError::io("writing line", e))
}

/// Splits `rows` into chunks of at most `max_bytes` each, requesting one sink
/// per chunk from `factory`.
///
/// Stops at the first error, whether it comes from the row stream, the
/// factory or a sink. Chunks completed before the error are left as they are.
///
/// # Errors
///
/// Returns `SplitError::Config` for a zero budget, and otherwise whatever
/// error aborted the split.
pub fn split<I, F>(rows: I, max_bytes: u64, factory: F) -> Result<SplitSummary>
where
    I: IntoIterator<Item = Result<Row>>,
    F: SinkFactory,
{
    let mut chunker = Chunker::new(factory, max_bytes)?;

    for row in rows {
        let written = row.and_then(|row| chunker.write_row(&row));
        if let Err(e) = written {
            chunker.abort();
            return Err(e);
        }
    }

    let (summary, _) = chunker.finish()?;
    Ok(summary)
}

/// Tokenizes `reader` and splits its rows according to `config`.
///
/// # Errors
///
/// Returns `SplitError::Config` if the config is invalid, and otherwise
/// whatever error aborted the split.
pub fn split_reader<R, F>(reader: R, config: &SplitConfig, factory: F) -> Result<SplitSummary>
where
    R: Read,
    F: SinkFactory,
{
    config.validate()?;

    #[cfg(debug_assertions)]
    tracing::debug!(
        max_bytes = config.max_bytes,
        max_row_bytes = config.max_row_bytes,
        "Starting CSV split"
    );

    split(RowReader::from_config(reader, config), config.max_bytes, factory)
}
