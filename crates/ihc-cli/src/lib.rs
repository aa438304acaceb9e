//! CLI library components for the IHC billing engine.

pub mod logging;
pub mod pipeline;
