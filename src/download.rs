//! Spreadsheet exports and where they get saved.

use crate::consts::cli_consts::query::DATE_FORMAT;
use crate::model::QueryParams;
use log::debug;
use std::fs;
use std::io;
use std::path::PathBuf;

/// `{symbol}_data_{start}_to_{end}.xlsx`
pub fn spreadsheet_file_name(params: &QueryParams) -> String {
    format!(
        "{}_data_{}_to_{}.xlsx",
        params.symbol,
        params.start.format(DATE_FORMAT),
        params.end.format(DATE_FORMAT)
    )
}

/// Receives a finished export. Takes ownership so the caller holds no copy afterwards.
pub trait DownloadSink: Send + Sync {
    fn save(&self, file_name: &str, bytes: Vec<u8>) -> io::Result<PathBuf>;
}

/// Writes exports into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for DirectorySink {
    fn save(&self, file_name: &str, bytes: Vec<u8>) -> io::Result<PathBuf> {
        // Symbols come from user input; keep the file inside the target directory.
        if file_name.contains(['/', '\\']) || file_name.starts_with('.') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing to save {:?}", file_name),
            ));
        }
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        fs::write(&path, &bytes)?;
        debug!("save | {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}
