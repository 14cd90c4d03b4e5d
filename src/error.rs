use std::io;

use thiserror::Error;

/// Renders a raw input byte for diagnostics (`x`, `\t`, `\xff`).
fn escape_byte(byte: &u8) -> String {
    std::ascii::escape_default(*byte).to_string()
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum SplitError {
    // ── Tokenizer ─────────────────────────────────────────────────────────────
    #[error(
        "invalid character following \" in quoted field: '{}' (row {}, byte offset {})",
        escape_byte(.byte),
        .row,
        .offset
    )]
    MalformedQuoting { byte: u8, row: u64, offset: u64 },

    #[error("row {row} exceeds the maximum row size of {max_bytes} bytes")]
    RowTooLarge { row: u64, max_bytes: usize },

    // ── I/O ───────────────────────────────────────────────────────────────────
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    // ── Configuration ─────────────────────────────────────────────────────────
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SplitError {
    /// Wraps an I/O error with a short description of what was being done.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        SplitError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T, E = SplitError> = std::result::Result<T, E>;
