//! Billing rule evaluation and aggregation.
//!
//! The evaluator turns cases into a per-case billing matrix; the
//! aggregator prices that matrix for one institute and applies the
//! consumption tax.

pub mod aggregator;
pub mod evaluator;

pub use aggregator::aggregate;
pub use evaluator::{BatchEvaluation, Evaluator};
