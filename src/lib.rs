//! Split a CSV stream into size-bounded chunks without ever dividing a row.

pub mod config;
pub mod error;
pub mod sink;
pub mod streaming;

pub use config::SplitConfig;
pub use error::{Result, SplitError};
pub use sink::{FileSinkFactory, MemorySinkFactory, SinkFactory};
pub use streaming::{split, split_reader, Row, RowReader, SplitSummary};
