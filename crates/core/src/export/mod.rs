//! Client-side export of record lists to CSV or xlsx payloads.
//!
//! The writers are format-agnostic: they serialize whatever
//! [`ExportRecord`]s they are given. Domain formatting lives in
//! [`formatters`].

use std::borrow::Cow;

use chrono::{Local, NaiveDate};
use log::{debug, error, info};

mod csv_writer;
pub mod formatters;
mod record;
mod sink;
mod workbook;

pub use csv_writer::write_csv;
pub use record::{collect_headers, ExportRecord, ExportValue};
pub use sink::{DirectorySink, ExportSink, MemorySink};
pub use workbook::write_workbook;

use crate::errors::ExportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Workbook,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Workbook => "xlsx",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" | "workbook" => Ok(ExportFormat::Workbook),
            other => Err(format!("unsupported export format '{}'", other)),
        }
    }
}

/// A named dataset written to its own worksheet.
#[derive(Debug, Clone)]
pub struct ExportSheet<'a> {
    pub name: String,
    pub records: Cow<'a, [ExportRecord]>,
}

impl<'a> ExportSheet<'a> {
    pub fn borrowed(name: impl Into<String>, records: &'a [ExportRecord]) -> Self {
        Self {
            name: name.into(),
            records: Cow::Borrowed(records),
        }
    }

    pub fn owned(name: impl Into<String>, records: Vec<ExportRecord>) -> ExportSheet<'static> {
        ExportSheet {
            name: name.into(),
            records: Cow::Owned(records),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Base file name without date suffix or extension.
    pub filename: String,
    pub format: ExportFormat,
    /// Date used for the file name suffix. Defaults to today.
    pub date: Option<NaiveDate>,
}

impl ExportOptions {
    pub fn new(filename: impl Into<String>, format: ExportFormat) -> Self {
        Self {
            filename: filename.into(),
            format,
            date: None,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// `{filename}_{YYYY-MM-DD}.{ext}`
    pub fn file_name(&self) -> String {
        let date = self.date.unwrap_or_else(|| Local::now().date_naive());
        format!(
            "{}_{}.{}",
            self.filename,
            date.format("%Y-%m-%d"),
            self.format.extension()
        )
    }
}

fn finish(
    payload: Result<Vec<u8>, ExportError>,
    file_name: &str,
    sink: &dyn ExportSink,
) -> bool {
    match payload.and_then(|bytes| sink.write(file_name, &bytes).map_err(ExportError::from)) {
        Ok(()) => {
            info!("Exported {}", file_name);
            true
        }
        Err(ExportError::Empty) => {
            debug!("Skipping export of {}: nothing to export", file_name);
            false
        }
        Err(e) => {
            error!("Export of {} failed: {}", file_name, e);
            false
        }
    }
}

/// Serializes `records` and hands the file to `sink`.
///
/// Returns `false` without touching the sink when `records` is empty, and
/// `false` when serialization or writing fails.
pub fn export_records(
    records: &[ExportRecord],
    options: &ExportOptions,
    sink: &dyn ExportSink,
) -> bool {
    let file_name = options.file_name();
    if records.is_empty() {
        debug!("Skipping export of {}: no records", file_name);
        return false;
    }
    let payload = match options.format {
        ExportFormat::Csv => write_csv(records),
        ExportFormat::Workbook => {
            write_workbook(&[ExportSheet::borrowed(options.filename.as_str(), records)])
        }
    };
    finish(payload, &file_name, sink)
}

/// Writes several datasets into one workbook, one sheet each. Empty sheets
/// are left out; returns `false` when every sheet is empty.
pub fn export_workbook(
    sheets: &[ExportSheet<'_>],
    options: &ExportOptions,
    sink: &dyn ExportSink,
) -> bool {
    let options = ExportOptions {
        format: ExportFormat::Workbook,
        ..options.clone()
    };
    finish(write_workbook(sheets), &options.file_name(), sink)
}
