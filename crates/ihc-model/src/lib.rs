//! Core data model for IHC billing.
//!
//! Shared type definitions used by the ingest, engine, report, and CLI
//! crates: the stain-test catalogue, per-case inputs, and billing outputs.

pub mod billing;
pub mod case;
pub mod catalogue;
pub mod error;

pub use billing::{
    BillingMatrix, BillingSummary, BillingTotals, CaseEvaluation, DetailAnnotations, ItemLine,
};
pub use case::{Case, OmitList};
pub use catalogue::{
    Catalogue, CatalogueItem, EXCESS_DETAIL_KEY, EXCESS_ITEM_MARKER, FREE_TEXT_CATEGORY,
    FREE_TEXT_THRESHOLD, HighlightCategory, StainRequirement,
};
pub use error::{ModelError, Result};
