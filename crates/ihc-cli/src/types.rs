use std::path::PathBuf;

use ihc_ingest::CaseIssue;
use ihc_model::BillingSummary;

#[derive(Debug)]
pub struct RunResult {
    pub institute: String,
    pub case_count: usize,
    pub summary: BillingSummary,
    pub output_dir: PathBuf,
    pub outputs: Vec<PathBuf>,
    pub dry_run: bool,
    pub case_issues: Vec<CaseIssue>,
    pub duplicates: Vec<String>,
    pub has_errors: bool,
}
