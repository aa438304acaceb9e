//! Per-case inputs: the stain work performed on each pathology case.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// One pathology case and the stains performed on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Case {
    /// Specimen identifier, unique within a batch.
    pub case_id: String,
    /// Stain names in the order they were recorded.
    pub stains: Vec<String>,
    /// Pass-through columns kept verbatim for the report.
    pub extra_fields: BTreeMap<String, String>,
}

impl Case {
    pub fn new(case_id: impl Into<String>, stains: Vec<String>) -> Self {
        Self {
            case_id: case_id.into(),
            stains,
            extra_fields: BTreeMap::new(),
        }
    }
}

/// Stain names excluded from billing before evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OmitList {
    names: BTreeSet<String>,
}

impl OmitList {
    pub fn new<I>(names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            names: names.into_iter().collect(),
        }
    }

    pub fn contains(&self, stain: &str) -> bool {
        self.names.contains(stain)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
