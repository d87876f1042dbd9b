//! Plain-text tables for terminal output.

use finboard_core::export::{collect_headers, ExportRecord};
use finboard_core::models::Page;

const COLUMN_GAP: &str = "  ";

/// Lays `rows` out as left-aligned columns under a header line.
pub fn render_table(rows: &[ExportRecord]) -> String {
    let headers = collect_headers(rows);
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| row.get(h).map(|v| v.to_text().into_owned()).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, headers.iter().map(String::as_str), &widths);
    for row in &cells {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Prints a table followed by the page position, or `empty` when there
/// are no rows.
pub fn print_page<T>(page: &Page<T>, rows: &[ExportRecord], empty: &str) {
    if rows.is_empty() {
        println!("{}", empty);
        return;
    }
    print!("{}", render_table(rows));
    println!(
        "Página {} de {} ({} registros)",
        page.number + 1,
        page.total_pages.max(1),
        page.total_elements
    );
}
