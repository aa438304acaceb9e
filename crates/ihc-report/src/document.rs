//! Billing document assembly.
//!
//! Turns the evaluation outputs into the two-section document the original
//! workbook carried: a totals summary and a cases-by-items detail grid.
//! Everything here is a pure transform over already-computed values; all
//! presentation rules (notably blank-for-zero) live in the writers.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ihc_model::{BillingMatrix, BillingSummary, Case, DetailAnnotations};

/// Summary row labels, in sheet order.
pub const LABEL_INVOICE_TOTAL: &str = "ご請求金額";
pub const LABEL_PATHOLOGY_FEES: &str = "病理検査料等";
pub const LABEL_SHIPPING_FEE: &str = "標本送付料";
pub const LABEL_PRETAX_TOTAL: &str = "税抜金額合計";
pub const LABEL_CONSUMPTION_TAX: &str = "消費税";

/// Derived per-item columns appended after the case columns, in order.
pub const COLUMN_CLAIM_COUNT: &str = "請求件数";
pub const COLUMN_LIST_FEE: &str = "検査料(税別)";
pub const COLUMN_COST_SHARE: &str = "委託割合";
pub const COLUMN_UNIT_PRICE: &str = "検査料金";
pub const COLUMN_AMOUNT: &str = "金額（税別）";

/// One labelled amount on the summary section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub label: String,
    pub amount: Decimal,
}

/// The totals block, in fixed row order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarySection {
    pub rows: Vec<SummaryRow>,
}

/// What a detail row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    /// One catalogue item with its per-case billing flags.
    Item,
    /// Claims per case, summed over all items.
    ClaimCount,
    /// A detail annotation keyed by highlight category or note phrase.
    Annotation,
    /// A supplementary case field carried through verbatim.
    Extra,
}

/// One cell of the detail grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailCell {
    /// No value for this case.
    Empty,
    /// A billing flag or count.
    Count(u32),
    /// Verbatim text, e.g. an annotation stain list.
    Text(String),
}

/// One row of the detail grid: a label, one cell per case column, and the
/// derived per-item columns (absent for rows that are not catalogue items).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    pub label: String,
    pub kind: RowKind,
    pub cells: Vec<DetailCell>,
    pub claim_count: Option<Decimal>,
    pub fee: Option<Decimal>,
    pub ratio: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub amount: Option<Decimal>,
}

/// The cases-by-items grid plus derived columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailSection {
    /// Case column order: input order, first occurrence wins the position.
    pub case_ids: Vec<String>,
    /// Derived column headers appended after the case columns.
    pub columns: Vec<String>,
    pub rows: Vec<DetailRow>,
}

/// The assembled billing report for one institute over one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingDocument {
    pub institute: String,
    pub tax_rate: Decimal,
    pub summary: SummarySection,
    pub detail: DetailSection,
}

impl BillingDocument {
    /// Assemble the report document from the evaluation outputs.
    ///
    /// Case columns follow batch input order. A duplicated case id keeps the
    /// column position of its first occurrence while the data reflects the
    /// last occurrence, consistent with the evaluator's last-write-wins
    /// handling of duplicates. Rows are laid out as: catalogue items in
    /// catalogue order, the per-case claim count, annotations (sorted by
    /// key), then supplementary case fields (sorted by name).
    pub fn assemble(
        cases: &[Case],
        matrix: &BillingMatrix,
        annotations: &DetailAnnotations,
        summary: &BillingSummary,
    ) -> Self {
        let totals = &summary.totals;
        let summary_section = SummarySection {
            rows: vec![
                SummaryRow {
                    label: LABEL_INVOICE_TOTAL.to_string(),
                    amount: totals.total_with_tax,
                },
                SummaryRow {
                    label: LABEL_PATHOLOGY_FEES.to_string(),
                    amount: totals.grand_total,
                },
                SummaryRow {
                    label: LABEL_SHIPPING_FEE.to_string(),
                    amount: totals.shipping_fee,
                },
                SummaryRow {
                    label: LABEL_PRETAX_TOTAL.to_string(),
                    amount: totals.grand_total,
                },
                SummaryRow {
                    label: LABEL_CONSUMPTION_TAX.to_string(),
                    amount: totals.tax,
                },
            ],
        };

        // Insert keeps the first position and replaces the value, which is
        // exactly the duplicate-case behaviour we want for columns.
        let mut case_index: IndexMap<&str, &Case> = IndexMap::new();
        for case in cases {
            case_index.insert(case.case_id.as_str(), case);
        }

        let mut rows = Vec::new();
        for line in &summary.item_lines {
            let cells = case_index
                .keys()
                .map(|case_id| {
                    matrix
                        .get(*case_id)
                        .and_then(|flags| flags.get(&line.item_id))
                        .map_or(DetailCell::Empty, |&count| DetailCell::Count(count))
                })
                .collect();
            rows.push(DetailRow {
                label: line.item_id.clone(),
                kind: RowKind::Item,
                cells,
                claim_count: Some(Decimal::from(line.billed_count)),
                fee: Some(line.fee),
                ratio: Some(line.ratio),
                unit_price: Some(line.unit_price),
                amount: Some(line.amount),
            });
        }

        let claim_cells = case_index
            .keys()
            .map(|case_id| {
                summary
                    .case_claims
                    .get(*case_id)
                    .map_or(DetailCell::Empty, |&count| DetailCell::Count(count))
            })
            .collect();
        let total_claims: u32 = summary.case_claims.values().sum();
        rows.push(DetailRow {
            label: COLUMN_CLAIM_COUNT.to_string(),
            kind: RowKind::ClaimCount,
            cells: claim_cells,
            claim_count: Some(Decimal::from(total_claims)),
            fee: None,
            ratio: None,
            unit_price: None,
            amount: None,
        });

        let mut detail_keys: BTreeSet<&str> = BTreeSet::new();
        for details in annotations.values() {
            detail_keys.extend(details.keys().map(String::as_str));
        }
        for key in detail_keys {
            let cells = case_index
                .keys()
                .map(|case_id| {
                    annotations
                        .get(*case_id)
                        .and_then(|details| details.get(key))
                        .map_or(DetailCell::Empty, |text| DetailCell::Text(text.clone()))
                })
                .collect();
            rows.push(DetailRow {
                label: key.to_string(),
                kind: RowKind::Annotation,
                cells,
                claim_count: None,
                fee: None,
                ratio: None,
                unit_price: None,
                amount: None,
            });
        }

        let mut extra_fields: BTreeSet<&str> = BTreeSet::new();
        for case in case_index.values() {
            extra_fields.extend(case.extra_fields.keys().map(String::as_str));
        }
        for field in extra_fields {
            let cells = case_index
                .values()
                .map(|case| {
                    case.extra_fields
                        .get(field)
                        .map_or(DetailCell::Empty, |value| DetailCell::Text(value.clone()))
                })
                .collect();
            // Mirror the spreadsheet's row sum: numeric supplementary fields
            // (specimen counts) still get a total in the claim-count column.
            let parsed: Vec<Decimal> = case_index
                .values()
                .filter_map(|case| case.extra_fields.get(field))
                .filter_map(|value| value.trim().parse::<Decimal>().ok())
                .collect();
            let claim_count = if parsed.is_empty() {
                None
            } else {
                Some(parsed.iter().sum::<Decimal>().normalize())
            };
            rows.push(DetailRow {
                label: field.to_string(),
                kind: RowKind::Extra,
                cells,
                claim_count,
                fee: None,
                ratio: None,
                unit_price: None,
                amount: None,
            });
        }

        Self {
            institute: summary.institute.clone(),
            tax_rate: summary.tax_rate,
            summary: summary_section,
            detail: DetailSection {
                case_ids: case_index.keys().map(|id| (*id).to_string()).collect(),
                columns: vec![
                    COLUMN_CLAIM_COUNT.to_string(),
                    COLUMN_LIST_FEE.to_string(),
                    COLUMN_COST_SHARE.to_string(),
                    COLUMN_UNIT_PRICE.to_string(),
                    COLUMN_AMOUNT.to_string(),
                ],
                rows,
            },
        }
    }
}
