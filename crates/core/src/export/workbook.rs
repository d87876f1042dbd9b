use rust_xlsxwriter::{Format, Workbook};

use super::record::{collect_headers, ExportRecord, ExportValue};
use super::ExportSheet;
use crate::errors::ExportError;

const MAX_SHEET_NAME_LEN: usize = 31;
const MIN_COLUMN_WIDTH: usize = 8;
const MAX_COLUMN_WIDTH: usize = 60;

/// Excel rejects these characters in sheet names.
const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

pub(crate) fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    let trimmed = cleaned.trim().trim_matches('\'');
    if trimmed.is_empty() {
        "Dados".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Width of each column: the longest header or cell text, plus padding.
fn column_widths(headers: &[String], records: &[ExportRecord]) -> Vec<usize> {
    headers
        .iter()
        .map(|h| {
            let longest = records
                .iter()
                .filter_map(|r| r.get(h))
                .map(|v| v.to_text().chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0);
            (longest + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// Builds an xlsx workbook with one worksheet per non-empty sheet.
pub fn write_workbook(sheets: &[ExportSheet<'_>]) -> Result<Vec<u8>, ExportError> {
    let sheets: Vec<&ExportSheet<'_>> = sheets.iter().filter(|s| !s.records.is_empty()).collect();
    if sheets.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let mut used_names: Vec<String> = Vec::new();

    for sheet in sheets {
        let records: &[ExportRecord] = &sheet.records;
        let headers = collect_headers(records);
        let widths = column_widths(&headers, records);

        let mut name = sanitize_sheet_name(&sheet.name);
        let mut suffix = 2;
        while used_names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
            let base: String = sanitize_sheet_name(&sheet.name)
                .chars()
                .take(MAX_SHEET_NAME_LEN - 4)
                .collect();
            name = format!("{} ({})", base, suffix);
            suffix += 1;
        }
        used_names.push(name.clone());

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(name.as_str())?;

        for (col, header) in headers.iter().enumerate() {
            let col = col as u16;
            worksheet.write_string_with_format(0, col, header.as_str(), &header_format)?;
            worksheet.set_column_width(col, widths[col as usize] as f64)?;
        }

        for (row, record) in records.iter().enumerate() {
            let row = (row + 1) as u32;
            for (col, header) in headers.iter().enumerate() {
                let col = col as u16;
                match record.get(header) {
                    Some(ExportValue::Text(text)) => {
                        worksheet.write_string(row, col, text.as_str())?;
                    }
                    Some(ExportValue::Number(n)) => {
                        worksheet.write_number(row, col, *n)?;
                    }
                    Some(ExportValue::Bool(b)) => {
                        worksheet.write_boolean(row, col, *b)?;
                    }
                    Some(ExportValue::Empty) | None => {}
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
