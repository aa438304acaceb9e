//! Batch aggregation: price the billing matrix for one institute.

use rust_decimal::Decimal;

use ihc_model::{
    BillingMatrix, BillingSummary, BillingTotals, Catalogue, ItemLine, ModelError, Result,
};

/// Price a billing matrix for `institute` and apply the consumption tax.
///
/// The institute must be one of the catalogue's ratio columns; that is
/// checked before any amount is computed so a typo aborts the run instead
/// of pricing everything at zero. Item lines come out in catalogue order.
pub fn aggregate(
    matrix: &BillingMatrix,
    catalogue: &Catalogue,
    institute: &str,
    tax_rate: Decimal,
) -> Result<BillingSummary> {
    catalogue.require_institute(institute)?;

    let mut item_lines = Vec::with_capacity(catalogue.len());
    let mut grand_total = Decimal::ZERO;
    for item in catalogue.items() {
        let ratio = item.ratio(institute).ok_or_else(|| ModelError::MissingRatio {
            id: item.id.clone(),
            institute: institute.to_string(),
        })?;
        let billed_count: u64 = matrix
            .values()
            .filter_map(|flags| flags.get(&item.id))
            .map(|&count| u64::from(count))
            .sum();
        // Normalized so scale artifacts of the multiplication (500.0 vs
        // 500) never leak into reports.
        let unit_price = (item.fee * ratio).normalize();
        let amount = (unit_price * Decimal::from(billed_count)).normalize();
        grand_total += amount;
        item_lines.push(ItemLine {
            item_id: item.id.clone(),
            fee: item.fee,
            ratio,
            unit_price,
            billed_count,
            amount,
        });
    }

    let case_claims = matrix
        .iter()
        .map(|(case_id, flags)| (case_id.clone(), flags.values().sum::<u32>()))
        .collect();

    let tax = (grand_total * tax_rate).normalize();
    let totals = BillingTotals {
        grand_total,
        shipping_fee: Decimal::ZERO,
        tax,
        total_with_tax: (grand_total + tax).normalize(),
    };

    tracing::debug!(
        institute,
        items = item_lines.len(),
        cases = matrix.len(),
        total = %totals.grand_total,
        "billing matrix aggregated"
    );

    Ok(BillingSummary {
        institute: institute.to_string(),
        tax_rate,
        item_lines,
        case_claims,
        totals,
    })
}
