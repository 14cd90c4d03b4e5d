//! Output destinations for chunks.
//!
//! The chunker never opens anything itself. It asks a `SinkFactory` for a
//! fresh sink whenever a new chunk starts and hands completed sinks back to
//! the factory for finalization.

mod file;
mod memory;
mod naming;

use std::io::Write;

use crate::error::{Result, SplitError};

pub use file::FileSinkFactory;
pub use memory::MemorySinkFactory;
pub use naming::chunk_file_name;

/// Produces one writable sink per chunk.
pub trait SinkFactory {
    type Sink: Write;

    /// Opens the sink for the next chunk.
    ///
    /// Called lazily, exactly once per chunk, the first time on receipt of the
    /// first row.
    fn next_sink(&mut self) -> Result<Self::Sink>;

    /// Finalizes a sink whose chunk is complete.
    ///
    /// The default flushes and drops it.
    fn close_sink(&mut self, mut sink: Self::Sink) -> Result<()> {
        sink.flush()
            .map_err(|e| SplitError::io("flushing completed chunk", e))
    }
}

impl<F: SinkFactory + ?Sized> SinkFactory for &mut F {
    type Sink = F::Sink;

    fn next_sink(&mut self) -> Result<Self::Sink> {
        (**self).next_sink()
    }

    fn close_sink(&mut self, sink: Self::Sink) -> Result<()> {
        (**self).close_sink(sink)
    }
}
