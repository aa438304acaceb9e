//! Catalogue of billable stain-test items.
//!
//! The catalogue mirrors the master price list: one row per billable item
//! with a fixed fee, per-institute cost-share ratios, up to two stain
//! requirement slots, and an optional highlight category used for report
//! annotations. Item order follows the master file and drives both
//! evaluation and report layout.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use indexmap::IndexSet;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Highlight category whose flag is driven by counting uncatalogued stains
/// rather than by requirement matching.
pub const FREE_TEXT_CATEGORY: &str = "ク";

/// Number of uncatalogued stains billable under the free-text item itself.
/// Antibodies beyond this count are billed one by one via the excess item.
pub const FREE_TEXT_THRESHOLD: usize = 3;

/// Substring identifying the excess-antibody item in the catalogue.
pub const EXCESS_ITEM_MARKER: &str = "ケ以外の免疫染色標本を作製した場合";

/// Report annotation key for the per-antibody excess charge.
pub const EXCESS_DETAIL_KEY: &str =
    "注１（３）ケ以外の免疫染色標本を作製した場合、４抗体目から１抗体につき";

/// One requirement slot of a catalogue item.
///
/// Master cells map onto this as follows: a blank cell carries no
/// requirement, a leading `_` means the stain must be absent, and any
/// other value means the stain must be present. A bare `_` counts as
/// blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StainRequirement {
    #[default]
    None,
    /// The stain must have been performed on the case.
    Require(String),
    /// The stain must not have been performed on the case.
    Exclude(String),
}

impl StainRequirement {
    pub fn parse(raw: &str) -> Self {
        let cell = raw.trim();
        if cell.is_empty() {
            return Self::None;
        }
        match cell.strip_prefix('_') {
            Some(rest) if rest.trim().is_empty() => Self::None,
            Some(rest) => Self::Exclude(rest.trim().to_string()),
            None => Self::Require(cell.to_string()),
        }
    }

    /// Stain name carried by this slot, if any.
    pub fn stain(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Require(stain) | Self::Exclude(stain) => Some(stain),
        }
    }
}

/// Label grouping related items on the billing report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighlightCategory(String);

impl HighlightCategory {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the free-text category driven by stain counting.
    pub fn is_free_text(&self) -> bool {
        self.0 == FREE_TEXT_CATEGORY
    }
}

impl fmt::Display for HighlightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One billable stain-test item from the master price list.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogueItem {
    /// Billing item id as printed on the report.
    pub id: String,
    /// List fee in yen before the institute cost share is applied.
    pub fee: Decimal,
    /// Cost-share ratio per institute, keyed by institute name.
    pub institute_ratio: BTreeMap<String, Decimal>,
    /// Up to two stain requirement slots.
    pub requirements: [StainRequirement; 2],
    /// Optional highlight category for report annotations.
    pub highlight: Option<HighlightCategory>,
}

impl CatalogueItem {
    pub fn ratio(&self, institute: &str) -> Option<Decimal> {
        self.institute_ratio.get(institute).copied()
    }

    /// Whether this item is flagged by free-text stain counting.
    pub fn is_free_text(&self) -> bool {
        self.highlight
            .as_ref()
            .is_some_and(HighlightCategory::is_free_text)
    }

    /// Whether this item bills uncatalogued antibodies beyond the
    /// free-text threshold, one claim per antibody.
    pub fn is_excess_item(&self) -> bool {
        self.id.contains(EXCESS_ITEM_MARKER)
    }

    /// Stains that must be present for the item to flag.
    pub fn required_stains(&self) -> impl Iterator<Item = &str> {
        self.requirements.iter().filter_map(|slot| match slot {
            StainRequirement::Require(stain) => Some(stain.as_str()),
            _ => None,
        })
    }

    /// Stains that must be absent for the item to flag.
    pub fn excluded_stains(&self) -> impl Iterator<Item = &str> {
        self.requirements.iter().filter_map(|slot| match slot {
            StainRequirement::Exclude(stain) => Some(stain.as_str()),
            _ => None,
        })
    }

    /// Whether neither slot carries a requirement.
    pub fn has_no_requirements(&self) -> bool {
        self.requirements
            .iter()
            .all(|slot| matches!(slot, StainRequirement::None))
    }
}

/// Ordered collection of billable items plus derived lookup tables.
#[derive(Debug, Clone)]
pub struct Catalogue {
    items: Vec<CatalogueItem>,
    institutes: Vec<String>,
    special_stains: IndexSet<String>,
}

impl Catalogue {
    /// Build a catalogue from ordered items and the institute column list.
    ///
    /// Validates the shape once so the evaluator can assume it: institutes
    /// exist, ids are unique, fees and ratios are in range, every item
    /// carries a ratio for every institute, and the excess-antibody item
    /// appears after the free-text item whose count it extends.
    pub fn new(items: Vec<CatalogueItem>, institutes: Vec<String>) -> Result<Self> {
        if institutes.is_empty() {
            return Err(ModelError::NoInstitutes);
        }

        let mut seen = BTreeSet::new();
        let mut free_text_seen = false;
        for item in &items {
            if !seen.insert(item.id.clone()) {
                return Err(ModelError::DuplicateItemId {
                    id: item.id.clone(),
                });
            }
            if item.fee < Decimal::ZERO {
                return Err(ModelError::InvalidFee {
                    id: item.id.clone(),
                    fee: item.fee,
                });
            }
            for institute in &institutes {
                let Some(ratio) = item.ratio(institute) else {
                    return Err(ModelError::MissingRatio {
                        id: item.id.clone(),
                        institute: institute.clone(),
                    });
                };
                if ratio < Decimal::ZERO || ratio > Decimal::ONE {
                    return Err(ModelError::InvalidRatio {
                        id: item.id.clone(),
                        institute: institute.clone(),
                        ratio,
                    });
                }
            }
            if item.is_excess_item() && !free_text_seen {
                return Err(ModelError::ExcessItemBeforeFreeText {
                    id: item.id.clone(),
                });
            }
            if item.is_free_text() {
                free_text_seen = true;
            }
        }

        let special_stains = items
            .iter()
            .flat_map(|item| item.requirements.iter())
            .filter_map(StainRequirement::stain)
            .map(str::to_string)
            .collect();

        Ok(Self {
            items,
            institutes,
            special_stains,
        })
    }

    pub fn items(&self) -> &[CatalogueItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogueItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Institute names in master column order.
    pub fn institutes(&self) -> &[String] {
        &self.institutes
    }

    /// Fails when `institute` has no ratio column in the catalogue.
    pub fn require_institute(&self, institute: &str) -> Result<()> {
        if self.institutes.iter().any(|known| known == institute) {
            Ok(())
        } else {
            Err(ModelError::UnknownInstitute {
                institute: institute.to_string(),
            })
        }
    }

    /// Every stain named by any requirement slot, in first-seen order.
    ///
    /// Stains outside this set are uncatalogued and feed the free-text
    /// counting rule.
    pub fn special_stains(&self) -> &IndexSet<String> {
        &self.special_stains
    }

    pub fn is_special_stain(&self, stain: &str) -> bool {
        self.special_stains.contains(stain)
    }
}
