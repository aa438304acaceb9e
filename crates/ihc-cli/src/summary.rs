use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use ihc_model::EXCESS_ITEM_MARKER;

use crate::types::RunResult;

pub fn print_summary(result: &RunResult) {
    println!("Institute: {}", result.institute);
    println!("Cases: {}", result.case_count);
    println!("Output: {}", result.output_dir.display());
    if result.dry_run {
        println!("Dry run: no report files written.");
    }
    for path in &result.outputs {
        println!("Wrote: {}", path.display());
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Item"),
        header_cell("Fee"),
        header_cell("Ratio"),
        header_cell("Unit price"),
        header_cell("Claims"),
        header_cell("Amount"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let mut total_claims = 0u64;
    for line in &result.summary.item_lines {
        total_claims += line.billed_count;
        let amount_cell = if line.amount.is_zero() {
            dim_cell(line.amount)
        } else {
            Cell::new(line.amount)
        };
        table.add_row(vec![
            item_cell(&line.item_id),
            Cell::new(line.fee),
            Cell::new(line.ratio),
            Cell::new(line.unit_price),
            count_cell(line.billed_count),
            amount_cell,
        ]);
    }
    let totals = &result.summary.totals;
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(total_claims).add_attribute(Attribute::Bold),
        Cell::new(totals.grand_total).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    println!("Pre-tax total: {}", totals.grand_total);
    println!("Consumption tax (rate {}): {}", result.summary.tax_rate, totals.tax);
    println!("Total with tax: {}", totals.total_with_tax);
    print_issue_table(result);
    if !result.duplicates.is_empty() {
        eprintln!("Duplicates:");
        for case_id in &result.duplicates {
            eprintln!("- {case_id}: later row replaced the earlier one");
        }
    }
}

fn print_issue_table(result: &RunResult) {
    if result.case_issues.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Case"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for issue in &result.case_issues {
        table.add_row(vec![
            Cell::new(issue.row),
            case_cell(issue.case_id.as_deref()),
            Cell::new(&issue.message),
        ]);
    }
    println!();
    println!("Skipped rows:");
    println!("{table}");
}

fn count_cell(count: u64) -> Cell {
    if count > 0 {
        Cell::new(count)
    } else {
        dim_cell(count)
    }
}

fn case_cell(case_id: Option<&str>) -> Cell {
    match case_id {
        Some(id) => Cell::new(id),
        None => dim_cell("-"),
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    if table.column_count() >= 6 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Percentage(50)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::LowerBoundary(Width::Fixed(10)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::LowerBoundary(Width::Fixed(10)),
        ]);
    }
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    if table.column_count() >= 3 {
        table.set_constraints(vec![
            ColumnConstraint::LowerBoundary(Width::Fixed(5)),
            ColumnConstraint::UpperBoundary(Width::Fixed(16)),
            ColumnConstraint::UpperBoundary(Width::Percentage(60)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn item_cell(item_id: &str) -> Cell {
    // The excess line only ever bills through the free-text threshold, so
    // it renders as a sub-item of that row.
    if item_id.contains(EXCESS_ITEM_MARKER) {
        Cell::new(format!("  -> {item_id}")).fg(Color::DarkGrey)
    } else {
        Cell::new(item_id)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
