//! Tabular formats (CSV, XLS, XLSX) rendered as aligned plain text.

use std::iter;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use super::ExtractError;

const MISSING_CELL: &str = "NaN";

pub fn extract_csv(path: &Path) -> Result<String, ExtractError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    Ok(render_table(&header, &rows))
}

/// Reads the first worksheet; its first row is the header.
pub fn extract_spreadsheet(path: &Path) -> Result<String, ExtractError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| ExtractError::Spreadsheet(e.to_string()))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| ExtractError::Spreadsheet(e.to_string()))?,
        None => return Ok(String::new()),
    };

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>());
    let header = rows.next().unwrap_or_default();
    let body: Vec<Vec<String>> = rows.collect();

    Ok(render_table(&header, &body))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Renders rows under a header line, each column right-aligned to its widest
/// cell and columns separated by a single space. There is no index column.
///
/// Blank header cells become `Unnamed: <n>`, blank or missing data cells
/// become `NaN`, and embedded newlines are escaped so every record stays on
/// one line.
pub fn render_table(header: &[String], rows: &[Vec<String>]) -> String {
    let columns = rows
        .iter()
        .map(Vec::len)
        .chain(iter::once(header.len()))
        .max()
        .unwrap_or(0);
    if columns == 0 {
        return String::new();
    }

    let header_cells: Vec<String> = (0..columns)
        .map(|idx| match header.get(idx) {
            Some(name) if !name.trim().is_empty() => escape_cell(name),
            _ => format!("Unnamed: {}", idx),
        })
        .collect();

    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            (0..columns)
                .map(|idx| match row.get(idx) {
                    Some(value) if !value.trim().is_empty() => escape_cell(value),
                    _ => MISSING_CELL.to_string(),
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = (0..columns)
        .map(|idx| {
            iter::once(&header_cells[idx])
                .chain(body.iter().map(|row| &row[idx]))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    iter::once(&header_cells)
        .chain(body.iter())
        .map(|cells| format_line(cells, &widths))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:>width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_cell(value: &str) -> String {
    value.replace("\r\n", "\\n").replace('\n', "\\n")
}
