//! Input collaborators: where the raw option-chain table comes from.

use optflow_core::{Error, RawTable, Result};
use optflow_ingestion::{read_csv_path, read_csv_table};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Yields one fully materialized raw table.
pub trait TableSource {
    /// Human-readable description for logs.
    fn describe(&self) -> String;

    /// Fetch the raw table.
    fn fetch(&self) -> Result<RawTable>;
}

impl<T: TableSource + ?Sized> TableSource for Box<T> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn fetch(&self) -> Result<RawTable> {
        (**self).fetch()
    }
}

/// A named CSV file.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableSource for CsvFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<RawTable> {
        if !self.path.is_file() {
            return Err(Error::source_err(format!(
                "input file not found: {}",
                self.path.display()
            )));
        }
        read_csv_path(&self.path)
    }
}

/// The most recently modified file with a given extension in a directory.
#[derive(Debug, Clone)]
pub struct LatestFileSource {
    dir: PathBuf,
    extension: String,
}

impl LatestFileSource {
    /// Pick the newest `*.csv` in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_extension(dir, "csv")
    }

    pub fn with_extension(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    /// Resolve the newest matching file; ties break on file name.
    pub fn latest_path(&self) -> Result<PathBuf> {
        let mut newest: Option<(SystemTime, PathBuf)> = None;

        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || !self.matches(&path) {
                continue;
            }
            let modified = entry.metadata()?.modified()?;
            let is_newer = match &newest {
                Some((ts, p)) => (modified, &path) > (*ts, p),
                None => true,
            };
            if is_newer {
                newest = Some((modified, path));
            }
        }

        newest.map(|(_, path)| path).ok_or_else(|| {
            Error::source_err(format!(
                "no *.{} files in {}",
                self.extension,
                self.dir.display()
            ))
        })
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.extension))
    }
}

impl TableSource for LatestFileSource {
    fn describe(&self) -> String {
        format!("latest *.{} in {}", self.extension, self.dir.display())
    }

    fn fetch(&self) -> Result<RawTable> {
        let path = self.latest_path()?;
        debug!(path = %path.display(), "selected latest input file");
        read_csv_path(&path)
    }
}

/// Raw CSV bytes already in memory.
#[derive(Debug, Clone)]
pub struct BytesSource {
    name: String,
    bytes: Vec<u8>,
}

impl BytesSource {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl TableSource for BytesSource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn fetch(&self) -> Result<RawTable> {
        read_csv_table(&self.bytes)
    }
}
