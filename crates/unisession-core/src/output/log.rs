use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::CombineError;
use crate::model::TransferRecord;

/// Parameters a run was started with, written at the top of the run log.
#[derive(Debug, Clone)]
pub struct RunHeader {
    pub started_at: DateTime<Local>,
    pub parameters: Vec<(String, String)>,
}

impl RunHeader {
    pub fn new() -> Self {
        Self {
            started_at: Local::now(),
            parameters: Vec::new(),
        }
    }

    pub fn parameter(mut self, name: &str, value: impl ToString) -> Self {
        self.parameters.push((name.to_string(), value.to_string()));
        self
    }

    fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            self.started_at.format("%a %b %e %H:%M:%S %Y").to_string(),
            "Combine sessions was run with these values:".to_string(),
        ];
        lines.extend(
            self.parameters
                .iter()
                .map(|(name, value)| format!("{name}: {value}")),
        );
        lines
    }
}

impl Default for RunHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Append-only log of a combine run. Each line is flushed as soon as it is
/// written so a failed run keeps everything logged before the failure.
pub struct TransferLog {
    path: PathBuf,
    file: File,
    records: Vec<TransferRecord>,
}

impl TransferLog {
    pub fn open(path: &Path, header: &RunHeader) -> Result<Self, CombineError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(CombineError::io(path))?;
        let mut log = Self {
            path: path.to_path_buf(),
            file,
            records: Vec::new(),
        };
        for line in header.lines() {
            log.write_line("INFO", &line)?;
        }
        Ok(log)
    }

    pub fn into_records(self) -> Vec<TransferRecord> {
        self.records
    }

    pub fn record(&mut self, source: &Path, destination: &Path) -> Result<(), CombineError> {
        let record = TransferRecord {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
        };
        tracing::info!("{record}");
        self.write_line("INFO", &record.to_string())?;
        self.records.push(record);
        Ok(())
    }

    pub fn warn(&mut self, message: &str) -> Result<(), CombineError> {
        self.write_line("WARNING", message)
    }

    fn write_line(&mut self, level: &str, message: &str) -> Result<(), CombineError> {
        writeln!(self.file, "{level}: {message}")
            .and_then(|_| self.file.flush())
            .map_err(CombineError::io(&self.path))
    }
}
