use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use ihc_model::{BillingMatrix, BillingSummary, BillingTotals, Case, DetailAnnotations, ItemLine};
use ihc_report::{BillingDocument, DetailCell, RowKind};

fn line(item_id: &str, fee: Decimal, ratio: Decimal, billed_count: u64) -> ItemLine {
    let unit_price = (fee * ratio).normalize();
    let amount = (unit_price * Decimal::from(billed_count)).normalize();
    ItemLine {
        item_id: item_id.to_string(),
        fee,
        ratio,
        unit_price,
        billed_count,
        amount,
    }
}

fn summary(
    institute: &str,
    tax_rate: Decimal,
    item_lines: Vec<ItemLine>,
    case_claims: &[(&str, u32)],
) -> BillingSummary {
    let grand_total: Decimal = item_lines.iter().map(|line| line.amount).sum();
    let tax = (grand_total * tax_rate).normalize();
    BillingSummary {
        institute: institute.to_string(),
        tax_rate,
        item_lines,
        case_claims: case_claims
            .iter()
            .map(|(case_id, count)| ((*case_id).to_string(), *count))
            .collect(),
        totals: BillingTotals {
            grand_total,
            shipping_fee: Decimal::ZERO,
            tax,
            total_with_tax: (grand_total + tax).normalize(),
        },
    }
}

fn matrix_of(entries: &[(&str, &[(&str, u32)])]) -> BillingMatrix {
    entries
        .iter()
        .map(|(case_id, flags)| {
            let flags: BTreeMap<String, u32> = flags
                .iter()
                .map(|(item_id, count)| ((*item_id).to_string(), *count))
                .collect();
            ((*case_id).to_string(), flags)
        })
        .collect()
}

fn annotations_of(entries: &[(&str, &[(&str, &str)])]) -> DetailAnnotations {
    entries
        .iter()
        .map(|(case_id, details)| {
            let details: BTreeMap<String, String> = details
                .iter()
                .map(|(key, text)| ((*key).to_string(), (*text).to_string()))
                .collect();
            ((*case_id).to_string(), details)
        })
        .collect()
}

#[test]
fn summary_section_follows_the_workbook_layout() {
    let cases = vec![Case::new("case1", vec!["CD3".to_string()])];
    let matrix = matrix_of(&[("case1", &[("A", 1)])]);
    let summary = summary(
        "LabA",
        dec!(0.1),
        vec![line("A", dec!(1000), dec!(0.5), 1)],
        &[("case1", 1)],
    );

    let document = BillingDocument::assemble(&cases, &matrix, &DetailAnnotations::new(), &summary);

    let rows: Vec<(&str, Decimal)> = document
        .summary
        .rows
        .iter()
        .map(|row| (row.label.as_str(), row.amount))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("ご請求金額", dec!(550)),
            ("病理検査料等", dec!(500)),
            ("標本送付料", dec!(0)),
            ("税抜金額合計", dec!(500)),
            ("消費税", dec!(50)),
        ]
    );
}

#[test]
fn detail_rows_are_items_then_claims_then_annotations_then_extras() {
    let mut first = Case::new("case1", vec!["CD3".to_string()]);
    first.extra_fields.insert("材料数".to_string(), "2".to_string());
    let mut second = Case::new("case2", vec![]);
    second.extra_fields.insert("材料数".to_string(), "3".to_string());
    let cases = vec![first, second];

    let matrix = matrix_of(&[
        ("case1", &[("A", 1), ("B", 0)]),
        ("case2", &[("A", 0), ("B", 0)]),
    ]);
    let annotations = annotations_of(&[("case1", &[("ク", "X1,X2")])]);
    let summary = summary(
        "LabA",
        dec!(0.1),
        vec![
            line("A", dec!(100), dec!(1), 1),
            line("B", dec!(200), dec!(0.5), 0),
        ],
        &[("case1", 1), ("case2", 0)],
    );

    let document = BillingDocument::assemble(&cases, &matrix, &annotations, &summary);

    let labels: Vec<&str> = document
        .detail
        .rows
        .iter()
        .map(|row| row.label.as_str())
        .collect();
    assert_eq!(labels, vec!["A", "B", "請求件数", "ク", "材料数"]);

    let kinds: Vec<RowKind> = document.detail.rows.iter().map(|row| row.kind).collect();
    assert_eq!(
        kinds,
        vec![
            RowKind::Item,
            RowKind::Item,
            RowKind::ClaimCount,
            RowKind::Annotation,
            RowKind::Extra,
        ]
    );

    assert_eq!(document.detail.case_ids, vec!["case1", "case2"]);
    assert_eq!(
        document.detail.columns,
        vec!["請求件数", "検査料(税別)", "委託割合", "検査料金", "金額（税別）"]
    );
}

#[test]
fn cells_align_with_case_columns() {
    let cases = vec![
        Case::new("case1", vec!["CD3".to_string()]),
        Case::new("case2", vec![]),
    ];
    let matrix = matrix_of(&[("case1", &[("A", 1)]), ("case2", &[("A", 0)])]);
    let annotations = annotations_of(&[("case2", &[("ア", "CD3")])]);
    let summary = summary(
        "LabA",
        dec!(0.1),
        vec![line("A", dec!(100), dec!(1), 1)],
        &[("case1", 1), ("case2", 0)],
    );

    let document = BillingDocument::assemble(&cases, &matrix, &annotations, &summary);

    let item_row = &document.detail.rows[0];
    assert_eq!(item_row.cells, vec![DetailCell::Count(1), DetailCell::Count(0)]);
    assert_eq!(item_row.claim_count, Some(dec!(1)));
    assert_eq!(item_row.amount, Some(dec!(100)));

    let claim_row = &document.detail.rows[1];
    assert_eq!(claim_row.cells, vec![DetailCell::Count(1), DetailCell::Count(0)]);
    assert_eq!(claim_row.fee, None);

    let annotation_row = &document.detail.rows[2];
    assert_eq!(annotation_row.cells, vec![DetailCell::Empty, DetailCell::Text("CD3".to_string())]);
}

#[test]
fn duplicate_case_ids_keep_their_first_column_position() {
    let mut original = Case::new("case1", vec!["CD3".to_string()]);
    original.extra_fields.insert("材料数".to_string(), "2".to_string());
    let other = Case::new("case2", vec![]);
    let mut replacement = Case::new("case1", vec![]);
    replacement.extra_fields.insert("材料数".to_string(), "9".to_string());
    let cases = vec![original, other, replacement];

    let matrix = matrix_of(&[("case1", &[("A", 0)]), ("case2", &[("A", 0)])]);
    let summary = summary(
        "LabA",
        dec!(0.1),
        vec![line("A", dec!(100), dec!(1), 0)],
        &[("case1", 0), ("case2", 0)],
    );

    let document = BillingDocument::assemble(&cases, &matrix, &DetailAnnotations::new(), &summary);

    assert_eq!(document.detail.case_ids, vec!["case1", "case2"]);
    let extra_row = document
        .detail
        .rows
        .iter()
        .find(|row| row.kind == RowKind::Extra)
        .expect("extra row");
    assert_eq!(extra_row.cells[0], DetailCell::Text("9".to_string()));
    assert_eq!(extra_row.claim_count, Some(dec!(9)));
}

#[test]
fn extra_field_totals_sum_only_numeric_values() {
    let mut first = Case::new("case1", vec![]);
    first.extra_fields.insert("材料数".to_string(), "2".to_string());
    first.extra_fields.insert("備考".to_string(), "再検査".to_string());
    let mut second = Case::new("case2", vec![]);
    second.extra_fields.insert("材料数".to_string(), "3".to_string());
    let cases = vec![first, second];

    let matrix = matrix_of(&[("case1", &[("A", 0)]), ("case2", &[("A", 0)])]);
    let summary = summary(
        "LabA",
        dec!(0.1),
        vec![line("A", dec!(100), dec!(1), 0)],
        &[("case1", 0), ("case2", 0)],
    );

    let document = BillingDocument::assemble(&cases, &matrix, &DetailAnnotations::new(), &summary);

    // Extra rows come out sorted by field name; the non-numeric 備考 column
    // gets no total.
    let extras: Vec<(&str, Option<Decimal>)> = document
        .detail
        .rows
        .iter()
        .filter(|row| row.kind == RowKind::Extra)
        .map(|row| (row.label.as_str(), row.claim_count))
        .collect();
    assert_eq!(extras, vec![("備考", None), ("材料数", Some(dec!(5)))]);
}

#[test]
fn assembles_a_single_case_document() {
    let cases = vec![Case::new("case1", vec!["CD3".to_string()])];
    let matrix = matrix_of(&[("case1", &[("A", 1)])]);
    let summary = summary(
        "LabA",
        dec!(0.1),
        vec![line("A", dec!(100), dec!(1), 1)],
        &[("case1", 1)],
    );

    let document = BillingDocument::assemble(&cases, &matrix, &DetailAnnotations::new(), &summary);

    insta::assert_json_snapshot!(serde_json::to_value(&document).unwrap());
}
