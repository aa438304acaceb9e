//! IHC billing report generation library.
//!
//! This crate turns the evaluation outputs into the delivered report:
//!
//! - **Document assembly**: summary section (totals block) plus detail
//!   section (cases by items grid with derived columns and annotations)
//! - **CSV**: one file per section, blank-for-zero on the detail sheet
//! - **JSON**: the full document as a structured value

mod document;
mod writers;

// Re-export public types and functions
pub use document::{
    BillingDocument, COLUMN_AMOUNT, COLUMN_CLAIM_COUNT, COLUMN_COST_SHARE, COLUMN_LIST_FEE,
    COLUMN_UNIT_PRICE, DetailCell, DetailRow, DetailSection, LABEL_CONSUMPTION_TAX,
    LABEL_INVOICE_TOTAL, LABEL_PATHOLOGY_FEES, LABEL_PRETAX_TOTAL, LABEL_SHIPPING_FEE, RowKind,
    SummaryRow, SummarySection,
};
pub use writers::{
    OutputFormat, output_base_name, write_csv_outputs, write_json_output, write_outputs,
};
