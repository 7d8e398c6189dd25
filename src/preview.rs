//! Dataset preview
//!
//! Reads the first rows of a stored CSV/XLSX file into a plain table.
//! Parsing is synchronous; callers run it on the blocking pool.

use std::fmt::Write as _;
use std::path::Path;

use calamine::{open_workbook, Data, DataType, Reader, Xlsx};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("no columns to parse from file")]
    NoColumns,

    #[error("expected {expected} fields in line {line}, saw {found}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("workbook has no worksheets")]
    NoWorksheet,

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Xlsx(#[from] calamine::XlsxError),
}

/// Formats the preview renderer can read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    Csv,
    Xlsx,
}

impl DatasetKind {
    pub fn from_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(DatasetKind::Csv),
            "xlsx" => Some(DatasetKind::Xlsx),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreviewTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl PreviewTable {
    /// Render as an HTML table: header row, body rows, no index column
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table class=\"dataframe data-table\">\n  <thead>\n    <tr>");
        for header in &self.headers {
            let _ = write!(html, "<th>{}</th>", ammonia::clean_text(header));
        }
        html.push_str("</tr>\n  </thead>\n  <tbody>\n");
        for row in &self.rows {
            html.push_str("    <tr>");
            for cell in row {
                let _ = write!(html, "<td>{}</td>", ammonia::clean_text(cell));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("  </tbody>\n</table>");
        html
    }
}

/// Load at most `limit` data rows. `Ok(None)` when the extension is not a
/// dataset format.
pub fn load_preview(path: &Path, limit: usize) -> Result<Option<PreviewTable>, PreviewError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match DatasetKind::from_name(&name) {
        Some(DatasetKind::Csv) => read_csv(path, limit).map(Some),
        Some(DatasetKind::Xlsx) => read_xlsx(path, limit).map(Some),
        None => Ok(None),
    }
}

fn read_csv(path: &Path, limit: usize) -> Result<PreviewTable, PreviewError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(PreviewError::NoColumns);
    }

    let mut rows = Vec::with_capacity(limit);
    for record in reader.records().take(limit) {
        let record = record?;
        if record.len() > headers.len() {
            return Err(PreviewError::RaggedRow {
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                expected: headers.len(),
                found: record.len(),
            });
        }
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        // short rows are padded like missing values
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    Ok(PreviewTable { headers, rows })
}

fn read_xlsx(path: &Path, limit: usize) -> Result<PreviewTable, PreviewError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(PreviewError::NoWorksheet)??;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = sheet_rows
        .next()
        .ok_or(PreviewError::NoColumns)?
        .iter()
        .map(cell_text)
        .collect();

    let rows = sheet_rows
        .take(limit)
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Ok(PreviewTable { headers, rows })
}

/// Spreadsheet cell as display text. Date cells are stored as serial
/// numbers and need converting.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| cell.to_string()),
        Data::DateTimeIso(text) | Data::DurationIso(text) => text.clone(),
        other => other.to_string(),
    }
}
