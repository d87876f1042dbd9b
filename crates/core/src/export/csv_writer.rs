use csv::WriterBuilder;

use super::record::{collect_headers, ExportRecord};
use crate::errors::ExportError;

/// Serializes records as UTF-8, comma-delimited text with a single header row.
///
/// Columns are the union of all record keys in first-appearance order;
/// records missing a column get an empty cell.
pub fn write_csv(records: &[ExportRecord]) -> Result<Vec<u8>, ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }
    let headers = collect_headers(records);
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(&headers)?;
    for record in records {
        let row: Vec<String> = headers
            .iter()
            .map(|h| {
                record
                    .get(h)
                    .map(|v| v.to_text().into_owned())
                    .unwrap_or_default()
            })
            .collect();
        writer.write_record(&row)?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}
