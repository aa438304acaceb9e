//! Case file loading.
//!
//! A case file has one row per pathology case: the specimen id, a
//! comma-joined stain list, and optional pass-through columns such as the
//! material count.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use ihc_model::Case;

use crate::csv_table::read_csv_table;
use crate::error::Result;

/// Column holding the specimen identifier.
pub const COLUMN_CASE_ID: &str = "標本番号";
/// Column holding the comma-joined stain names.
pub const COLUMN_STAINS: &str = "染色名";

/// A problem with a single case row. The rest of the batch still loads.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseIssue {
    /// 1-based line in the case file, counting the header and any blank
    /// lines.
    pub row: u64,
    pub case_id: Option<String>,
    pub message: String,
}

impl fmt::Display for CaseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.case_id {
            Some(case_id) => write!(f, "row {}: case {}: {}", self.row, case_id, self.message),
            None => write!(f, "row {}: {}", self.row, self.message),
        }
    }
}

/// Cases loaded from one file plus any rows that could not be used.
#[derive(Debug, Clone, Default)]
pub struct CaseBatch {
    pub cases: Vec<Case>,
    pub issues: Vec<CaseIssue>,
}

/// Load a case file, collecting unusable rows as issues instead of
/// failing the batch.
///
/// A row missing its specimen id, or whose stain cell holds no stain
/// names, is skipped and recorded. Columns other than the specimen id and
/// stain list are kept verbatim as pass-through fields.
pub fn load_case_file(path: &Path) -> Result<CaseBatch> {
    let table = read_csv_table(path)?;
    let case_idx = table.require_column(COLUMN_CASE_ID, path)?;
    let stain_idx = table.require_column(COLUMN_STAINS, path)?;

    let extra_columns: Vec<(usize, String)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(idx, header)| *idx != case_idx && *idx != stain_idx && !header.is_empty())
        .map(|(idx, header)| (idx, header.clone()))
        .collect();

    let mut batch = CaseBatch::default();
    for row in &table.rows {
        let case_id = row.get(case_idx).map(String::as_str).unwrap_or("");
        if case_id.is_empty() {
            batch.issues.push(CaseIssue {
                row: row.line,
                case_id: None,
                message: format!("missing `{COLUMN_CASE_ID}`"),
            });
            continue;
        }
        // A stain cell with no usable tokens (blank, or separators only)
        // would flag every negative-only item, so the row is unusable as
        // billing input.
        let stain_cell = row.get(stain_idx).map(String::as_str).unwrap_or("");
        let stains = split_stains(stain_cell);
        if stains.is_empty() {
            batch.issues.push(CaseIssue {
                row: row.line,
                case_id: Some(case_id.to_string()),
                message: format!("missing `{COLUMN_STAINS}`"),
            });
            continue;
        }
        let mut extra_fields = BTreeMap::new();
        for (idx, header) in &extra_columns {
            let value = row.get(*idx).map(String::as_str).unwrap_or("");
            if !value.is_empty() {
                extra_fields.insert(header.clone(), value.to_string());
            }
        }
        batch.cases.push(Case {
            case_id: case_id.to_string(),
            stains,
            extra_fields,
        });
    }
    tracing::debug!(cases = batch.cases.len(), issues = batch.issues.len(), "case file loaded");
    Ok(batch)
}

/// Split a comma-joined stain cell, dropping empty entries.
fn split_stains(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|stain| !stain.is_empty())
        .map(str::to_string)
        .collect()
}
