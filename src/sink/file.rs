//! Numbered chunk files on disk.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use tracing::{debug, info};

use super::{chunk_file_name, SinkFactory};
use crate::config::SplitConfig;
use crate::error::{Result, SplitError};

/// Creates `prefix + zero-padded number + additional_suffix` files, one per
/// chunk, counting up from the configured start number.
///
/// Existing files with the same name are truncated.
#[derive(Debug)]
pub struct FileSinkFactory {
    prefix: String,
    additional_suffix: String,
    suffix_length: usize,
    next_number: u64,
    created: Vec<PathBuf>,
}

impl FileSinkFactory {
    pub fn new(config: &SplitConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            additional_suffix: config.additional_suffix.clone(),
            suffix_length: config.suffix_length,
            next_number: config.start_number,
            created: Vec::new(),
        }
    }

    /// Paths of every file opened so far, in creation order.
    pub fn created_paths(&self) -> &[PathBuf] {
        &self.created
    }

    fn active_path(&self) -> String {
        self.created
            .last()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }
}

impl SinkFactory for FileSinkFactory {
    type Sink = BufWriter<File>;

    fn next_sink(&mut self) -> Result<Self::Sink> {
        let name = chunk_file_name(
            &self.prefix,
            self.next_number,
            self.suffix_length,
            &self.additional_suffix,
        )?;
        let following = self.next_number.checked_add(1).ok_or_else(|| {
            SplitError::Config(format!("file number overflow after {}", self.next_number))
        })?;

        let file = File::create(&name)
            .map_err(|e| SplitError::io(format!("creating new file {}", name), e))?;

        self.next_number = following;
        info!(path = %name, "opened new file for writing");
        self.created.push(PathBuf::from(name));

        Ok(BufWriter::new(file))
    }

    fn close_sink(&mut self, sink: Self::Sink) -> Result<()> {
        let path = self.active_path();
        let file = sink.into_inner().map_err(|e| {
            SplitError::io(format!("closing previous active file {}", path), e.into_error())
        })?;
        file.sync_all()
            .map_err(|e| SplitError::io(format!("closing previous active file {}", path), e))?;
        debug!(path = %path, "closed file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    fn factory_in(dir: &TempDir, config: SplitConfig) -> FileSinkFactory {
        let prefix = format!("{}/{}", dir.path().display(), config.prefix);
        FileSinkFactory::new(&config.prefix(prefix))
    }

    #[test]
    fn test_files_are_numbered_from_start() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = SplitConfig::with_max_bytes(10)
            .prefix("part_")
            .additional_suffix(".csv")
            .suffix_length(3)
            .start_number(8);
        let mut factory = factory_in(&temp_dir, config);

        for _ in 0..3 {
            let mut sink = factory.next_sink().expect("Failed to open sink");
            sink.write_all(b"x\n").expect("Failed to write");
            factory.close_sink(sink).expect("Failed to close sink");
        }

        let paths = factory.created_paths();
        assert_eq!(paths.len(), 3);
        assert!(paths[0].ends_with("part_008.csv"));
        assert!(paths[1].ends_with("part_009.csv"));
        assert!(paths[2].ends_with("part_010.csv"));
        for path in paths {
            assert_eq!(fs::read_to_string(path).expect("Failed to read"), "x\n");
        }
    }

    #[test]
    fn test_close_writes_buffered_bytes_to_disk() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut factory = factory_in(&temp_dir, SplitConfig::with_max_bytes(10));

        let mut sink = factory.next_sink().expect("Failed to open sink");
        sink.write_all(b"a,b\n").expect("Failed to write");
        let path = factory.created_paths()[0].clone();
        assert_eq!(
            fs::read_to_string(&path).expect("Failed to read"),
            "",
            "Unflushed bytes stay in the buffer"
        );

        factory.close_sink(sink).expect("Failed to close sink");
        assert_eq!(fs::read_to_string(&path).expect("Failed to read"), "a,b\n");
    }

    #[test]
    fn test_suffix_overflow_fails_without_creating_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = SplitConfig::with_max_bytes(10).suffix_length(1).start_number(9);
        let mut factory = factory_in(&temp_dir, config);

        let sink = factory.next_sink().expect("9 fits in one digit");
        factory.close_sink(sink).expect("Failed to close sink");

        assert!(matches!(factory.next_sink(), Err(SplitError::Config(_))));
        assert_eq!(factory.created_paths().len(), 1);
        assert_eq!(
            fs::read_dir(temp_dir.path()).expect("Failed to read dir").count(),
            1
        );
    }

    #[test]
    fn test_create_failure_names_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = SplitConfig::with_max_bytes(10).prefix("missing_dir/part_");
        let mut factory = factory_in(&temp_dir, config);

        match factory.next_sink() {
            Err(SplitError::Io { context, .. }) => {
                assert!(context.starts_with("creating new file"), "got: {}", context);
                assert!(context.contains("missing_dir/part_00"), "got: {}", context);
            }
            other => panic!("Expected Io error, got {:?}", other),
        }
        assert!(factory.created_paths().is_empty());
    }

    #[test]
    fn test_existing_file_is_truncated() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let target = temp_dir.path().join("00");
        fs::write(&target, "OLD_CONTENT").expect("Failed to write dummy file");

        let mut factory = factory_in(&temp_dir, SplitConfig::with_max_bytes(10));
        let mut sink = factory.next_sink().expect("Failed to open sink");
        sink.write_all(b"new\n").expect("Failed to write");
        factory.close_sink(sink).expect("Failed to close sink");

        assert_eq!(fs::read_to_string(&target).expect("Failed to read"), "new\n");
    }
}
