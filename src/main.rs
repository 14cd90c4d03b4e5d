//! csvsplit - splits a CSV stream into numbered files of bounded size,
//! never splitting a row across files.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;

use csvsplit::config::{DEFAULT_INITIAL_ROW_CAPACITY, DEFAULT_MAX_ROW_BYTES, DEFAULT_SUFFIX_LENGTH};
use csvsplit::{split_reader, FileSinkFactory, SplitConfig, SplitError, SplitSummary};

/// Split a CSV stream into files of at most SIZE bytes of whole records.
///
/// Rows are never divided, even when a quoted field contains newlines. A row
/// larger than SIZE is written to a file of its own.
#[derive(Parser, Debug)]
#[command(name = "csvsplit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Put at most SIZE bytes of records per output file
    #[arg(short = 'C', long = "line-bytes", value_name = "SIZE")]
    line_bytes: u64,

    /// Generate suffixes of length N
    #[arg(short = 'a', long, value_name = "N", default_value_t = DEFAULT_SUFFIX_LENGTH)]
    suffix_length: usize,

    /// Use numeric suffixes starting at X
    #[arg(short = 'd', long, value_name = "X", default_value_t = 0)]
    numeric_suffixes: u64,

    /// Append an additional SUFFIX to file names
    #[arg(long, value_name = "SUFFIX", default_value = "")]
    additional_suffix: String,

    /// Prefix for file names
    #[arg(long, default_value = "")]
    prefix: String,

    /// Fail on any row longer than SIZE bytes
    #[arg(long, value_name = "SIZE", default_value_t = DEFAULT_MAX_ROW_BYTES)]
    max_row_bytes: usize,

    /// Generate verbose output
    #[arg(long, short)]
    verbose: bool,

    /// Input file (standard input when absent or `-`)
    input: Option<PathBuf>,
}

impl Cli {
    fn to_config(&self) -> SplitConfig {
        SplitConfig::with_max_bytes(self.line_bytes)
            .suffix_length(self.suffix_length)
            .start_number(self.numeric_suffixes)
            .prefix(self.prefix.as_str())
            .additional_suffix(self.additional_suffix.as_str())
            .verbose(self.verbose)
            .row_buffer(
                DEFAULT_INITIAL_ROW_CAPACITY.min(self.max_row_bytes),
                self.max_row_bytes,
            )
    }
}

/// Log level for a run: DEBUG when verbose, otherwise warnings only.
fn log_level(config: &SplitConfig) -> tracing::Level {
    if config.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    }
}

fn main() {
    let cli = Cli::parse();
    let config = cli.to_config();

    tracing_subscriber::fmt()
        .with_max_level(log_level(&config))
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(&config, cli.input.as_deref()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &SplitConfig, input: Option<&Path>) -> Result<(), SplitError> {
    config.validate()?;

    let mut factory = FileSinkFactory::new(config);
    let summary: SplitSummary = match input {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path).map_err(|e| {
                SplitError::io(format!("opening input {}", path.display()), e)
            })?;
            split_reader(file, config, &mut factory)?
        }
        _ => split_reader(io::stdin().lock(), config, &mut factory)?,
    };

    info!(
        chunks = summary.chunks,
        rows = summary.total_rows,
        bytes = summary.total_bytes,
        "Split complete"
    );
    Ok(())
}
