//! Shared CSV reading for master and case files.

use std::path::Path;

use csv::{Position, ReaderBuilder};

use crate::error::{IngestError, Result};

/// A CSV file as ordered headers plus normalized string rows.
///
/// Rows are padded to the header width so column indexes stay valid.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<CsvRow>,
}

/// One data row plus the physical line it started on.
///
/// The line counts every line of the source file, including blank and
/// fully empty ones that never become rows, so reported locations match
/// what an editor shows.
#[derive(Debug, Clone, Default)]
pub struct CsvRow {
    /// 1-based source line of the record's first field.
    pub line: u64,
    pub cells: Vec<String>,
}

impl CsvRow {
    pub fn get(&self, idx: usize) -> Option<&String> {
        self.cells.get(idx)
    }
}

impl CsvTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn require_column(&self, name: &str, path: &Path) -> Result<usize> {
        self.column_index(name).ok_or_else(|| IngestError::MissingColumn {
            path: path.to_path_buf(),
            column: name.to_string(),
        })
    }
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Read a CSV file whose first non-empty row is the header.
///
/// Handles BOM characters, trims whitespace, skips fully empty rows, and
/// tolerates ragged records.
pub fn read_csv_table(path: &Path) -> Result<CsvTable> {
    if !path.is_file() {
        return Err(IngestError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|err| IngestError::csv(path, &err))?;

    let mut headers: Vec<String> = Vec::new();
    let mut rows: Vec<CsvRow> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| IngestError::csv(path, &err))?;
        let line = record.position().map_or(0, Position::line);
        let mut cells: Vec<String> = record.iter().map(normalize_cell).collect();
        if cells.iter().all(String::is_empty) {
            continue;
        }
        if headers.is_empty() {
            headers = cells.iter().map(|value| normalize_header(value)).collect();
            continue;
        }
        cells.resize_with(headers.len(), String::new);
        rows.push(CsvRow { line, cells });
    }
    if headers.is_empty() {
        return Ok(CsvTable::default());
    }
    Ok(CsvTable { headers, rows })
}
