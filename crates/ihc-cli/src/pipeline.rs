//! Billing pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Load**: Read the master directory and the case file
//! 2. **Evaluate**: Run every case through the catalogue rules
//! 3. **Price**: Aggregate the flag matrix for one institute
//! 4. **Assemble**: Build the two-section report document
//! 5. **Write**: Emit the CSV/JSON report files
//!
//! Each stage takes the output of the previous stage and returns typed results.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use ihc_engine::{BatchEvaluation, Evaluator, aggregate};
use ihc_ingest::{CaseIssue, MasterBundle, load_case_file, load_master_bundle};
use ihc_model::{BillingMatrix, BillingSummary, Case};
use ihc_report::{BillingDocument, OutputFormat, output_base_name, write_outputs};

// ============================================================================
// Stage 1: Load
// ============================================================================

/// Result of the load stage.
#[derive(Debug)]
pub struct LoadedInputs {
    /// Catalogue, omit list and settings from the master directory.
    pub bundle: MasterBundle,
    /// Case rows in input order.
    pub cases: Vec<Case>,
    /// Rows that could not be used; the batch continues without them.
    pub issues: Vec<CaseIssue>,
}

/// Read the master directory and the case file.
pub fn load_inputs(master_dir: &Path, case_file: &Path) -> Result<LoadedInputs> {
    let bundle = load_master_bundle(master_dir)
        .with_context(|| format!("load master directory {}", master_dir.display()))?;
    let batch = load_case_file(case_file)
        .with_context(|| format!("load case file {}", case_file.display()))?;
    Ok(LoadedInputs {
        bundle,
        cases: batch.cases,
        issues: batch.issues,
    })
}

// ============================================================================
// Stage 2: Evaluate
// ============================================================================

/// Evaluate every case against the catalogue rules.
pub fn evaluate_batch(bundle: &MasterBundle, cases: &[Case]) -> BatchEvaluation {
    Evaluator::new(&bundle.catalogue, &bundle.omit_list).evaluate_batch(cases)
}

// ============================================================================
// Stage 3: Price
// ============================================================================

/// Price the flag matrix for one institute using the master tax rate.
pub fn price_batch(
    matrix: &BillingMatrix,
    bundle: &MasterBundle,
    institute: &str,
) -> Result<BillingSummary> {
    aggregate(matrix, &bundle.catalogue, institute, bundle.settings.tax_rate)
        .with_context(|| format!("price batch for {institute}"))
}

// ============================================================================
// Stage 4: Assemble
// ============================================================================

/// Build the report document from the evaluation and pricing outputs.
pub fn assemble_document(
    cases: &[Case],
    evaluation: &BatchEvaluation,
    summary: &BillingSummary,
) -> BillingDocument {
    BillingDocument::assemble(cases, &evaluation.matrix, &evaluation.details, summary)
}

// ============================================================================
// Stage 5: Write
// ============================================================================

/// Write the report files, or nothing on a dry run.
///
/// Returns the paths of the files that were written.
pub fn write_reports(
    output_dir: &Path,
    case_file: &Path,
    document: &BillingDocument,
    format: OutputFormat,
    dry_run: bool,
) -> Result<Vec<PathBuf>> {
    if dry_run {
        debug!("dry run, skipping report files");
        return Ok(Vec::new());
    }
    let base_name = output_base_name(&document.institute, case_file);
    write_outputs(output_dir, &base_name, document, format)
        .with_context(|| format!("write reports under {}", output_dir.display()))
}
