//! Report output: one `url` row per finding.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::errors::AppError;
use crate::models::finding::Finding;

/// Destination for findings produced during a run.
pub trait ReportSink {
    fn write_finding(&mut self, finding: &Finding) -> Result<(), AppError>;

    /// Flush and close. Returns the number of rows written.
    fn finish(self: Box<Self>) -> Result<usize, AppError>;
}

/// CSV report. The file is created (or truncated) on open and flushed on
/// `finish` or drop.
pub struct CsvReportSink {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows: usize,
}

impl CsvReportSink {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();
        let mut writer = csv::Writer::from_writer(File::create(&path)?);
        writer.write_record(["url"])?;
        writer.flush()?;
        Ok(Self {
            path,
            writer,
            rows: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for CsvReportSink {
    fn write_finding(&mut self, finding: &Finding) -> Result<(), AppError> {
        self.writer.write_record([finding.url.as_str()])?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<usize, AppError> {
        self.writer.flush()?;
        Ok(self.rows)
    }
}
