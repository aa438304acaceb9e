//! Per-case rule evaluation.
//!
//! The evaluator walks the catalogue in declaration order and produces one
//! billing flag per item plus report annotations. Order matters for one
//! cross-item dependency: the free-text ("ク") item counts uncatalogued
//! stains, and antibodies beyond the threshold carry forward into the
//! excess item that follows it. Catalogue construction validates that
//! ordering, so the accumulator here always runs front to back.

use std::collections::BTreeMap;

use indexmap::IndexSet;

use ihc_model::{
    BillingMatrix, Case, CaseEvaluation, Catalogue, DetailAnnotations, EXCESS_DETAIL_KEY,
    FREE_TEXT_CATEGORY, FREE_TEXT_THRESHOLD, OmitList,
};

/// Evaluates cases against one catalogue and omit list.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    catalogue: &'a Catalogue,
    omit_list: &'a OmitList,
}

/// Flags and annotations for a whole batch, keyed by case id.
#[derive(Debug, Clone, Default)]
pub struct BatchEvaluation {
    pub matrix: BillingMatrix,
    pub details: DetailAnnotations,
    /// Case ids that appeared more than once, in input order. The later
    /// row replaced the earlier evaluation.
    pub duplicates: Vec<String>,
}

impl<'a> Evaluator<'a> {
    pub fn new(catalogue: &'a Catalogue, omit_list: &'a OmitList) -> Self {
        Self {
            catalogue,
            omit_list,
        }
    }

    /// Evaluate one case: exactly one flag per catalogue item, plus detail
    /// annotations keyed by highlight category or note phrase.
    pub fn evaluate(&self, case: &Case) -> CaseEvaluation {
        let stains: Vec<&str> = case
            .stains
            .iter()
            .map(String::as_str)
            .filter(|stain| !self.omit_list.contains(stain))
            .collect();

        // Stains no requirement slot references, deduplicated in
        // first-occurrence order so the threshold truncation is stable.
        let uncatalogued: IndexSet<&str> = stains
            .iter()
            .copied()
            .filter(|stain| !self.catalogue.is_special_stain(stain))
            .collect();

        let mut flags = BTreeMap::new();
        let mut details = BTreeMap::new();
        let mut excess_count = 0u32;

        for item in self.catalogue.items() {
            if item.is_free_text() && !uncatalogued.is_empty() {
                let billed: Vec<&str> = uncatalogued
                    .iter()
                    .copied()
                    .take(FREE_TEXT_THRESHOLD)
                    .collect();
                let overflow: Vec<&str> = uncatalogued
                    .iter()
                    .copied()
                    .skip(FREE_TEXT_THRESHOLD)
                    .collect();
                if !overflow.is_empty() {
                    excess_count = overflow.len() as u32;
                    details.insert(EXCESS_DETAIL_KEY.to_string(), overflow.join(","));
                }
                details.insert(FREE_TEXT_CATEGORY.to_string(), billed.join(","));
                flags.insert(item.id.clone(), 1);
                continue;
            }

            // The excess item bills one claim per antibody beyond the
            // threshold counted above. Finalized here either way.
            if item.is_excess_item() {
                flags.insert(item.id.clone(), excess_count);
                continue;
            }

            let include: Vec<&str> = item.required_stains().collect();
            let exclude: Vec<&str> = item.excluded_stains().collect();

            // Nothing to check means never billable.
            if include.is_empty() && exclude.is_empty() {
                flags.insert(item.id.clone(), 0);
                continue;
            }

            let matched = include.iter().all(|stain| stains.contains(stain))
                && exclude.iter().all(|stain| !stains.contains(stain));
            if matched {
                flags.insert(item.id.clone(), 1);
                // The ク detail carries uncatalogued stain lists only; a ク
                // item matching by requirement reports nothing.
                if let Some(highlight) = &item.highlight {
                    if !highlight.is_free_text() {
                        details.insert(highlight.as_str().to_string(), include.join(","));
                    }
                }
            } else {
                flags.insert(item.id.clone(), 0);
            }
        }

        tracing::debug!(
            stains = stains.len(),
            uncatalogued = uncatalogued.len(),
            excess = excess_count,
            "case evaluated"
        );

        CaseEvaluation { flags, details }
    }

    /// Evaluate a batch in input order.
    ///
    /// A repeated case id replaces the earlier evaluation and is reported
    /// in `duplicates` so the caller can surface it.
    pub fn evaluate_batch(&self, cases: &[Case]) -> BatchEvaluation {
        let mut batch = BatchEvaluation::default();
        for (idx, case) in cases.iter().enumerate() {
            if batch.matrix.contains_key(&case.case_id) {
                tracing::warn!(
                    row = idx,
                    "duplicate case id: later row replaces the earlier evaluation"
                );
                batch.duplicates.push(case.case_id.clone());
            }
            let evaluation = self.evaluate(case);
            batch.matrix.insert(case.case_id.clone(), evaluation.flags);
            batch.details.insert(case.case_id.clone(), evaluation.details);
        }
        tracing::debug!(
            cases = batch.matrix.len(),
            duplicates = batch.duplicates.len(),
            "batch evaluated"
        );
        batch
    }
}
