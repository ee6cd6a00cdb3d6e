//! Output sink: merged records as a JSON array of index rows

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::record::{Restaurant, to_rows};

/// JSON file writer with atomic tmp→rename
pub struct JsonSink {
    writer: BufWriter<File>,
    tmp_path: PathBuf,
    final_path: PathBuf,
}

impl std::fmt::Debug for JsonSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSink")
            .field("final_path", &self.final_path)
            .finish_non_exhaustive()
    }
}

impl JsonSink {
    /// Create a new sink writing to `<path>.tmp`
    pub fn new(path: &Path) -> std::io::Result<Self> {
        let final_path = path.to_path_buf();
        let mut tmp_name = final_path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = final_path.with_file_name(tmp_name);

        // Clean up stale tmp file
        if tmp_path.exists() {
            log::warn!("Removing stale tmp file: {}", tmp_path.display());
            fs::remove_file(&tmp_path)?;
        }

        Ok(Self {
            writer: BufWriter::new(File::create(&tmp_path)?),
            tmp_path,
            final_path,
        })
    }

    /// Serialize every record as one JSON array of index rows, flush, and
    /// atomically rename tmp → final. Returns the row count.
    pub fn finish(mut self, records: &[Restaurant]) -> std::io::Result<usize> {
        let rows = to_rows(records);
        serde_json::to_writer_pretty(&mut self.writer, &rows)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        drop(self.writer);
        fs::rename(&self.tmp_path, &self.final_path)?;
        Ok(rows.len())
    }
}

/// Write every record to `path` in one go.
pub fn write_json(path: &Path, records: &[Restaurant]) -> std::io::Result<usize> {
    JsonSink::new(path)?.finish(records)
}
