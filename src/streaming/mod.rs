//! Streaming CSV splitting.
//!
//! This module provides a quote-aware row tokenizer that finds record
//! boundaries even when quoted fields contain embedded commas and newlines,
//! and a chunker that packs whole rows into byte-bounded output chunks.

mod chunker;
mod row_reader;

pub use chunker::{split, split_reader, Chunker, SplitSummary};
pub use row_reader::{
    Row, RowReader, ScanState, Transition, FIELD_SEPARATOR, QUOTE, ROW_SEPARATOR,
};
