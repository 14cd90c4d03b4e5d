use super::SinkFactory;
use crate::error::Result;

/// Collects every chunk into its own in-memory buffer.
#[derive(Debug, Default)]
pub struct MemorySinkFactory {
    chunks: Vec<Vec<u8>>,
    opened: usize,
}

impl MemorySinkFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed chunks, in order.
    pub fn chunks(&self) -> &[Vec<u8>] {
        &self.chunks
    }

    pub fn into_chunks(self) -> Vec<Vec<u8>> {
        self.chunks
    }

    /// Number of sinks handed out, closed or not.
    pub fn opened(&self) -> usize {
        self.opened
    }
}

impl SinkFactory for MemorySinkFactory {
    type Sink = Vec<u8>;

    fn next_sink(&mut self) -> Result<Vec<u8>> {
        self.opened += 1;
        Ok(Vec::new())
    }

    fn close_sink(&mut self, sink: Vec<u8>) -> Result<()> {
        self.chunks.push(sink);
        Ok(())
    }
}
