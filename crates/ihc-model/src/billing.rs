//! Evaluation and aggregation outputs.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Billing flags per case: `case id -> item id -> count`.
///
/// A count of zero means the item was evaluated and found not billable.
/// Most entries are zero or one; the excess-antibody item carries the
/// number of antibodies beyond the free-text threshold.
pub type BillingMatrix = BTreeMap<String, BTreeMap<String, u32>>;

/// Report annotations per case: `case id -> annotation key -> text`.
pub type DetailAnnotations = BTreeMap<String, BTreeMap<String, String>>;

/// Outcome of evaluating a single case against the catalogue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseEvaluation {
    /// Billable count per catalogue item id.
    pub flags: BTreeMap<String, u32>,
    /// Annotation text per highlight category or note key.
    pub details: BTreeMap<String, String>,
}

/// One catalogue item priced for an institute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemLine {
    pub item_id: String,
    /// List fee before the cost share is applied.
    pub fee: Decimal,
    /// Cost-share ratio of the selected institute.
    pub ratio: Decimal,
    /// `fee * ratio`, the per-claim price.
    pub unit_price: Decimal,
    /// Claims summed across all cases.
    pub billed_count: u64,
    /// `unit_price * billed_count`, before tax.
    pub amount: Decimal,
}

/// Batch totals before and after tax.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingTotals {
    pub grand_total: Decimal,
    /// Specimen shipping charge. Nothing bills it today, so it stays zero.
    pub shipping_fee: Decimal,
    pub tax: Decimal,
    pub total_with_tax: Decimal,
}

/// Aggregated billing for one institute over a batch of cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingSummary {
    pub institute: String,
    pub tax_rate: Decimal,
    /// One line per catalogue item, in catalogue order.
    pub item_lines: Vec<ItemLine>,
    /// Claims per case across all items.
    pub case_claims: BTreeMap<String, u32>,
    pub totals: BillingTotals,
}
