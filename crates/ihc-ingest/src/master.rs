//! Master directory loading: catalogue, omit list, and settings.
//!
//! The master directory holds three fixed-name CSV files: `master.csv`
//! (the price list), `ihc_blacklist.csv` (stain names excluded from
//! billing), and `settings.csv` (key/value settings such as the
//! consumption tax rate).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;

use ihc_model::{Catalogue, CatalogueItem, HighlightCategory, OmitList, StainRequirement};

use crate::csv_table::{CsvRow, read_csv_table};
use crate::error::{IngestError, Result};

/// Environment variable for overriding the master directory.
pub const MASTER_ENV_VAR: &str = "IHC_MASTER_DIR";

pub const MASTER_FILE: &str = "master.csv";
pub const BLACKLIST_FILE: &str = "ihc_blacklist.csv";
pub const SETTINGS_FILE: &str = "settings.csv";

/// Key in `settings.csv` holding the consumption tax rate.
pub const TAX_RATE_KEY: &str = "tax_rate";

const COLUMN_ITEM: &str = "item";
const COLUMN_FEE: &str = "fee";
const COLUMN_IHC1: &str = "IHC1";
const COLUMN_IHC2: &str = "IHC2";
const COLUMN_HIGHLIGHT: &str = "highlight";
const COLUMN_NAME: &str = "name";
const COLUMN_KEY: &str = "key";
const COLUMN_VAL: &str = "val";

const RESERVED_COLUMNS: &[&str] = &[
    COLUMN_ITEM,
    COLUMN_FEE,
    COLUMN_IHC1,
    COLUMN_IHC2,
    COLUMN_HIGHLIGHT,
];

/// Get the default master root directory.
///
/// Checks the `IHC_MASTER_DIR` environment variable first, then falls
/// back to `master/` under the current directory.
pub fn default_master_root() -> PathBuf {
    if let Ok(root) = std::env::var(MASTER_ENV_VAR) {
        return PathBuf::from(root);
    }
    PathBuf::from("master")
}

/// Typed settings from `settings.csv`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Consumption tax rate applied to the batch total.
    pub tax_rate: Decimal,
}

/// Everything loaded from the master directory.
#[derive(Debug, Clone)]
pub struct MasterBundle {
    pub catalogue: Catalogue,
    pub omit_list: OmitList,
    pub settings: Settings,
}

pub fn load_master_bundle(root: &Path) -> Result<MasterBundle> {
    if !root.is_dir() {
        return Err(IngestError::MissingMasterDir {
            path: root.to_path_buf(),
        });
    }
    let catalogue = load_catalogue(&root.join(MASTER_FILE))?;
    let omit_list = load_omit_list(&root.join(BLACKLIST_FILE))?;
    let settings = load_settings(&root.join(SETTINGS_FILE))?;
    tracing::debug!(
        items = catalogue.len(),
        institutes = catalogue.institutes().len(),
        omitted = omit_list.len(),
        "master directory loaded"
    );
    Ok(MasterBundle {
        catalogue,
        omit_list,
        settings,
    })
}

/// Load the price list into a validated catalogue.
///
/// Every header outside the reserved set is an institute ratio column;
/// column order is preserved. Rows with an empty item id are skipped.
pub fn load_catalogue(path: &Path) -> Result<Catalogue> {
    let table = read_csv_table(path)?;
    let item_idx = table.require_column(COLUMN_ITEM, path)?;
    let fee_idx = table.require_column(COLUMN_FEE, path)?;
    let ihc1_idx = table.require_column(COLUMN_IHC1, path)?;
    let ihc2_idx = table.require_column(COLUMN_IHC2, path)?;
    let highlight_idx = table.require_column(COLUMN_HIGHLIGHT, path)?;

    let institute_columns: Vec<(usize, String)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, header)| !header.is_empty() && !RESERVED_COLUMNS.contains(&header.as_str()))
        .map(|(idx, header)| (idx, header.clone()))
        .collect();

    let mut items = Vec::new();
    for row in &table.rows {
        let id = row.get(item_idx).map(String::as_str).unwrap_or("");
        if id.is_empty() {
            continue;
        }
        let fee = parse_decimal(row, fee_idx, COLUMN_FEE, path)?;
        let mut institute_ratio = BTreeMap::new();
        for (col_idx, institute) in &institute_columns {
            let ratio = parse_decimal(row, *col_idx, institute, path)?;
            institute_ratio.insert(institute.clone(), ratio);
        }
        let highlight_cell = row.get(highlight_idx).map(String::as_str).unwrap_or("");
        let highlight = if highlight_cell.is_empty() {
            None
        } else {
            Some(HighlightCategory::new(highlight_cell))
        };
        items.push(CatalogueItem {
            id: id.to_string(),
            fee,
            institute_ratio,
            requirements: [
                StainRequirement::parse(row.get(ihc1_idx).map(String::as_str).unwrap_or("")),
                StainRequirement::parse(row.get(ihc2_idx).map(String::as_str).unwrap_or("")),
            ],
            highlight,
        });
    }

    let institutes = institute_columns
        .into_iter()
        .map(|(_, name)| name)
        .collect();
    Ok(Catalogue::new(items, institutes)?)
}

/// Load the stain names excluded from billing.
pub fn load_omit_list(path: &Path) -> Result<OmitList> {
    let table = read_csv_table(path)?;
    let name_idx = table.require_column(COLUMN_NAME, path)?;
    let names = table
        .rows
        .iter()
        .filter_map(|row| row.get(name_idx))
        .filter(|name| !name.is_empty())
        .cloned();
    Ok(OmitList::new(names))
}

pub fn load_settings(path: &Path) -> Result<Settings> {
    let table = read_csv_table(path)?;
    let key_idx = table.require_column(COLUMN_KEY, path)?;
    let val_idx = table.require_column(COLUMN_VAL, path)?;

    let mut tax_rate = None;
    for row in &table.rows {
        let key = row.get(key_idx).map(String::as_str).unwrap_or("");
        if key != TAX_RATE_KEY {
            continue;
        }
        tax_rate = Some(parse_decimal(row, val_idx, COLUMN_VAL, path)?);
    }

    let tax_rate = tax_rate.ok_or_else(|| IngestError::MissingSetting {
        path: path.to_path_buf(),
        key: TAX_RATE_KEY.to_string(),
    })?;
    Ok(Settings { tax_rate })
}

fn parse_decimal(row: &CsvRow, idx: usize, column: &str, path: &Path) -> Result<Decimal> {
    let raw = row.get(idx).map(String::as_str).unwrap_or("");
    raw.parse::<Decimal>().map_err(|_| IngestError::InvalidNumber {
        path: path.to_path_buf(),
        row: row.line,
        column: column.to_string(),
        value: raw.to_string(),
    })
}
