use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{info, info_span, warn};

use ihc_cli::logging::redact_value;
use ihc_cli::pipeline::{
    LoadedInputs, assemble_document, evaluate_batch, load_inputs, price_batch, write_reports,
};
use ihc_ingest::{MasterBundle, default_master_root, load_master_bundle};
use ihc_report::OutputFormat;

use crate::cli::{MasterArgs, OutputFormatArg, RunArgs};
use crate::summary::apply_table_style;
use crate::types::RunResult;

pub fn run_billing(args: &RunArgs) -> Result<RunResult> {
    let master_dir = args.master_dir.clone().unwrap_or_else(default_master_root);
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let run_span = info_span!("billing", institute = %args.institute);
    let _run_guard = run_span.enter();

    // =========================================================================
    // Stage 1: Load - Master directory and case file
    // =========================================================================
    let ingest_span = info_span!(
        "ingest",
        master_dir = %master_dir.display(),
        case_file = %args.case_file.display()
    );
    let ingest_start = Instant::now();
    let LoadedInputs {
        bundle,
        cases,
        issues,
    } = ingest_span.in_scope(|| load_inputs(&master_dir, &args.case_file))?;
    info!(
        items = bundle.catalogue.len(),
        institutes = bundle.catalogue.institutes().len(),
        omitted = bundle.omit_list.len(),
        cases = cases.len(),
        skipped = issues.len(),
        duration_ms = ingest_start.elapsed().as_millis(),
        "ingest complete"
    );
    for issue in &issues {
        warn!(
            row = issue.row,
            case_id = redact_value(issue.case_id.as_deref().unwrap_or("")),
            "case row skipped: {}",
            issue.message
        );
    }

    // A mistyped institute name must fail before any case is evaluated.
    bundle
        .catalogue
        .require_institute(&args.institute)
        .context("select institute")?;

    // =========================================================================
    // Stage 2: Evaluate - Flag every case against the catalogue
    // =========================================================================
    let evaluate_span = info_span!("evaluate");
    let evaluate_start = Instant::now();
    let evaluation = evaluate_span.in_scope(|| evaluate_batch(&bundle, &cases));
    info!(
        cases = evaluation.matrix.len(),
        duplicates = evaluation.duplicates.len(),
        duration_ms = evaluate_start.elapsed().as_millis(),
        "evaluation complete"
    );

    // =========================================================================
    // Stage 3: Price - Aggregate the matrix for the institute
    // =========================================================================
    let summary = price_batch(&evaluation.matrix, &bundle, &args.institute)?;
    info!(
        total = %summary.totals.grand_total,
        total_with_tax = %summary.totals.total_with_tax,
        "billing priced"
    );

    // =========================================================================
    // Stage 4-5: Assemble and write the reports
    // =========================================================================
    let document = assemble_document(&cases, &evaluation, &summary);
    let output_span = info_span!("output", output_dir = %output_dir.display());
    let output_start = Instant::now();
    let outputs = output_span.in_scope(|| {
        write_reports(
            &output_dir,
            &args.case_file,
            &document,
            format_output(args.format),
            args.dry_run,
        )
    })?;
    info!(
        files = outputs.len(),
        duration_ms = output_start.elapsed().as_millis(),
        "output complete"
    );

    let has_errors = !issues.is_empty();
    Ok(RunResult {
        institute: args.institute.clone(),
        case_count: cases.len(),
        summary,
        output_dir,
        outputs,
        dry_run: args.dry_run,
        case_issues: issues,
        duplicates: evaluation.duplicates,
        has_errors,
    })
}

pub fn run_institutes(args: &MasterArgs) -> Result<()> {
    let bundle = load_bundle(args)?;
    let mut table = Table::new();
    table.set_header(vec!["Institute"]);
    apply_table_style(&mut table);
    for institute in bundle.catalogue.institutes() {
        table.add_row(vec![institute.clone()]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_items(args: &MasterArgs) -> Result<()> {
    let bundle = load_bundle(args)?;
    let mut table = Table::new();
    table.set_header(vec!["Item", "Fee", "Requires", "Excludes", "Highlight"]);
    apply_table_style(&mut table);
    for item in bundle.catalogue.items() {
        let requires: Vec<&str> = item.required_stains().collect();
        let excludes: Vec<&str> = item.excluded_stains().collect();
        let highlight = item
            .highlight
            .as_ref()
            .map(|category| category.as_str().to_string())
            .unwrap_or_default();
        table.add_row(vec![
            item.id.clone(),
            item.fee.to_string(),
            requires.join(","),
            excludes.join(","),
            highlight,
        ]);
    }
    println!("{table}");
    Ok(())
}

fn load_bundle(args: &MasterArgs) -> Result<MasterBundle> {
    let master_dir = args.master_dir.clone().unwrap_or_else(default_master_root);
    load_master_bundle(&master_dir)
        .with_context(|| format!("load master directory {}", master_dir.display()))
}

fn format_output(format: OutputFormatArg) -> OutputFormat {
    match format {
        OutputFormatArg::Csv => OutputFormat::Csv,
        OutputFormatArg::Json => OutputFormat::Json,
        OutputFormatArg::Both => OutputFormat::Both,
    }
}
