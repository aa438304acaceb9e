//! Report output writing.
//!
//! Renders the assembled document to CSV (one file per section) and JSON.
//! Blank-for-zero is applied here, on the detail sheet only: a zero flag or
//! amount renders as an empty cell, while the summary sheet keeps literal
//! zeros (the shipping placeholder row stays visible as `0`).

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use rust_decimal::Decimal;

use crate::document::{BillingDocument, DetailCell};

/// Which renditions of the document to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
    Both,
}

/// Output file base name: `out_{institute}_from_{case file stem}_{YYYYMMDDHHMM}`.
pub fn output_base_name(institute: &str, case_file: &Path) -> String {
    let stem = case_file
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("cases");
    let stamp = Local::now().format("%Y%m%d%H%M");
    format!("out_{institute}_from_{stem}_{stamp}")
}

/// Write the selected renditions under `output_dir`, returning the paths.
pub fn write_outputs(
    output_dir: &Path,
    base_name: &str,
    document: &BillingDocument,
    format: OutputFormat,
) -> Result<Vec<PathBuf>> {
    let mut outputs = Vec::new();
    if matches!(format, OutputFormat::Csv | OutputFormat::Both) {
        outputs.extend(write_csv_outputs(output_dir, base_name, document)?);
    }
    if matches!(format, OutputFormat::Json | OutputFormat::Both) {
        outputs.push(write_json_output(output_dir, base_name, document)?);
    }
    Ok(outputs)
}

/// Write `<base>_summary.csv` and `<base>_detail.csv`.
pub fn write_csv_outputs(
    output_dir: &Path,
    base_name: &str,
    document: &BillingDocument,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir).with_context(|| format!("create {}", output_dir.display()))?;
    let summary_path = output_dir.join(format!("{base_name}_summary.csv"));
    fs::write(&summary_path, render_summary_csv(document)?)
        .with_context(|| format!("write {}", summary_path.display()))?;
    let detail_path = output_dir.join(format!("{base_name}_detail.csv"));
    fs::write(&detail_path, render_detail_csv(document)?)
        .with_context(|| format!("write {}", detail_path.display()))?;
    Ok(vec![summary_path, detail_path])
}

/// Write `<base>.json`.
pub fn write_json_output(
    output_dir: &Path,
    base_name: &str,
    document: &BillingDocument,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir).with_context(|| format!("create {}", output_dir.display()))?;
    let path = output_dir.join(format!("{base_name}.json"));
    let mut json =
        serde_json::to_string_pretty(document).context("serialize billing document")?;
    json.push('\n');
    fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// Summary sheet: `label,amount` rows, no header, zeros kept literal.
fn render_summary_csv(document: &BillingDocument) -> Result<String> {
    let mut buffer = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        for row in &document.summary.rows {
            writer.write_record([row.label.clone(), row.amount.to_string()])?;
        }
        writer.flush()?;
    }
    Ok(String::from_utf8(buffer)?)
}

/// Detail sheet: header row of case ids plus derived columns, then one row
/// per item/claim/annotation/extra with blank-for-zero applied.
fn render_detail_csv(document: &BillingDocument) -> Result<String> {
    let detail = &document.detail;
    let mut buffer = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        let mut header = Vec::with_capacity(1 + detail.case_ids.len() + detail.columns.len());
        header.push(String::new());
        header.extend(detail.case_ids.iter().cloned());
        header.extend(detail.columns.iter().cloned());
        writer.write_record(&header)?;
        for row in &detail.rows {
            let mut record = Vec::with_capacity(header.len());
            record.push(row.label.clone());
            record.extend(row.cells.iter().map(render_cell));
            record.push(render_decimal(row.claim_count));
            record.push(render_decimal(row.fee));
            record.push(render_decimal(row.ratio));
            record.push(render_decimal(row.unit_price));
            record.push(render_decimal(row.amount));
            writer.write_record(&record)?;
        }
        writer.flush()?;
    }
    Ok(String::from_utf8(buffer)?)
}

fn render_cell(cell: &DetailCell) -> String {
    match cell {
        DetailCell::Empty | DetailCell::Count(0) => String::new(),
        DetailCell::Count(count) => count.to_string(),
        // Supplementary fields pass through unmodified.
        DetailCell::Text(text) => text.clone(),
    }
}

fn render_decimal(value: Option<Decimal>) -> String {
    match value {
        Some(value) if !value.is_zero() => value.to_string(),
        _ => String::new(),
    }
}
