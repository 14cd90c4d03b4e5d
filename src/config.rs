//! Split configuration.
//!
//! A `SplitConfig` is built once (by the CLI or a library caller) and passed
//! by reference into the tokenizer, the chunker and the file sink factory.

use crate::error::{Result, SplitError};

/// Starting size of the tokenizer's row buffer (64 KB).
pub const DEFAULT_INITIAL_ROW_CAPACITY: usize = 64 * 1024;

/// Largest row the tokenizer will buffer before giving up (10 MB).
pub const DEFAULT_MAX_ROW_BYTES: usize = 10 * 1024 * 1024;

/// Default digit width of the sequence number in generated file names.
pub const DEFAULT_SUFFIX_LENGTH: usize = 2;

/// Configuration for splitting a CSV stream into files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitConfig {
    /// Maximum bytes of records per chunk. Must be set to a positive value.
    pub max_bytes: u64,
    /// Digit width of the zero-padded sequence number in file names.
    pub suffix_length: usize,
    /// Sequence number of the first chunk file.
    pub start_number: u64,
    /// Prepended to every file name. May include a directory.
    pub prefix: String,
    /// Appended after the sequence number, e.g. `.csv`.
    pub additional_suffix: String,
    /// Log every opened file and chunk.
    pub verbose: bool,
    /// Starting size of the tokenizer's row buffer.
    pub initial_row_capacity: usize,
    /// Largest row the tokenizer will buffer.
    pub max_row_bytes: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            max_bytes: 0,
            suffix_length: DEFAULT_SUFFIX_LENGTH,
            start_number: 0,
            prefix: String::new(),
            additional_suffix: String::new(),
            verbose: false,
            initial_row_capacity: DEFAULT_INITIAL_ROW_CAPACITY,
            max_row_bytes: DEFAULT_MAX_ROW_BYTES,
        }
    }
}

impl SplitConfig {
    /// Creates a config with the given byte budget and defaults elsewhere.
    pub fn with_max_bytes(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            ..Self::default()
        }
    }

    pub fn suffix_length(mut self, width: usize) -> Self {
        self.suffix_length = width;
        self
    }

    pub fn start_number(mut self, number: u64) -> Self {
        self.start_number = number;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn additional_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.additional_suffix = suffix.into();
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the tokenizer's initial and maximum row buffer sizes.
    pub fn row_buffer(mut self, initial: usize, max: usize) -> Self {
        self.initial_row_capacity = initial;
        self.max_row_bytes = max;
        self
    }

    /// Checks the settings the core relies on.
    ///
    /// # Errors
    ///
    /// Returns `SplitError::Config` if the byte budget is zero, or the row
    /// buffer limits are zero or inverted.
    pub fn validate(&self) -> Result<()> {
        if self.max_bytes == 0 {
            return Err(SplitError::Config(format!(
                "line bytes must be a positive integer ({})",
                self.max_bytes
            )));
        }
        if self.max_row_bytes == 0 {
            return Err(SplitError::Config(
                "max row bytes must be a positive integer (0)".to_string(),
            ));
        }
        if self.initial_row_capacity > self.max_row_bytes {
            return Err(SplitError::Config(format!(
                "initial row capacity ({}) exceeds max row bytes ({})",
                self.initial_row_capacity, self.max_row_bytes
            )));
        }
        Ok(())
    }
}
