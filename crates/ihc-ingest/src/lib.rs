//! Loading of master data and case files from disk.

pub mod cases;
pub mod csv_table;
pub mod error;
pub mod master;

pub use cases::{COLUMN_CASE_ID, COLUMN_STAINS, CaseBatch, CaseIssue, load_case_file};
pub use csv_table::{CsvRow, CsvTable, read_csv_table};
pub use error::{IngestError, Result};
pub use master::{
    BLACKLIST_FILE, MASTER_ENV_VAR, MASTER_FILE, MasterBundle, SETTINGS_FILE, Settings,
    TAX_RATE_KEY, default_master_root, load_catalogue, load_master_bundle, load_omit_list,
    load_settings,
};
