//! Pollen entries normalized from either pollen provider

use serde::{Deserialize, Serialize};

use crate::classification::pollen::{PollenBucket, POLLEN_INDEX_MAX};
use crate::classification::fill_ratio;

/// Source-level pollen category on the 0-5 index scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PollenCategory {
    None,
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl PollenCategory {
    /// Category matching an index value; values above 5 clamp to `VeryHigh`
    #[must_use]
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => PollenCategory::None,
            1 => PollenCategory::VeryLow,
            2 => PollenCategory::Low,
            3 => PollenCategory::Moderate,
            4 => PollenCategory::High,
            _ => PollenCategory::VeryHigh,
        }
    }

    #[must_use]
    pub fn index(self) -> u8 {
        match self {
            PollenCategory::None => 0,
            PollenCategory::VeryLow => 1,
            PollenCategory::Low => 2,
            PollenCategory::Moderate => 3,
            PollenCategory::High => 4,
            PollenCategory::VeryHigh => 5,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PollenCategory::None => "None",
            PollenCategory::VeryLow => "Very Low",
            PollenCategory::Low => "Low",
            PollenCategory::Moderate => "Moderate",
            PollenCategory::High => "High",
            PollenCategory::VeryHigh => "Very High",
        }
    }

    /// Display bucket this category collapses into
    #[must_use]
    pub fn bucket(self) -> PollenBucket {
        match self {
            PollenCategory::None => PollenBucket::None,
            PollenCategory::VeryLow | PollenCategory::Low => PollenBucket::Low,
            PollenCategory::Moderate => PollenBucket::Moderate,
            PollenCategory::High | PollenCategory::VeryHigh => PollenBucket::High,
        }
    }
}

/// Whether an entry describes a pollen group or a single plant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollenEntryKind {
    PollenType,
    Plant,
}

/// Botanical details the primary provider attaches to plant entries
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlantFacts {
    pub plant_type: Option<String>,
    pub family: Option<String>,
    pub season: Option<String>,
    pub cross_reaction: Option<String>,
}

/// Rich metadata only the primary provider supplies
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PollenExtendedInfo {
    pub description: Option<String>,
    pub health_recommendations: Vec<String>,
    pub plant_facts: Option<PlantFacts>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollenEntry {
    pub code: String,
    pub display_name: String,
    pub kind: PollenEntryKind,
    /// 0-5 severity
    pub index_value: u8,
    pub category: PollenCategory,
    /// grains/m³, only from the fallback provider
    pub raw_concentration: Option<f64>,
    pub extended_info: Option<PollenExtendedInfo>,
}

impl PollenEntry {
    /// Create an entry from an index value, clamped to 0-5
    #[must_use]
    pub fn from_index(
        code: impl Into<String>,
        display_name: impl Into<String>,
        kind: PollenEntryKind,
        index_value: u8,
        category: PollenCategory,
    ) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
            kind,
            index_value: index_value.min(POLLEN_INDEX_MAX),
            category,
            raw_concentration: None,
            extended_info: None,
        }
    }

    #[must_use]
    pub fn with_extended_info(mut self, info: PollenExtendedInfo) -> Self {
        self.extended_info = Some(info);
        self
    }

    #[must_use]
    pub fn bucket(&self) -> PollenBucket {
        self.category.bucket()
    }

    /// Bar fill in 0..=1; raw concentrations use the 100 grains/m³ scale
    #[must_use]
    pub fn fill_ratio(&self) -> f64 {
        match self.raw_concentration {
            Some(raw) => fill_ratio(raw, crate::classification::pollen::CONCENTRATION_SCALE_MAX),
            None => fill_ratio(
                f64::from(self.index_value),
                f64::from(POLLEN_INDEX_MAX),
            ),
        }
    }
}

/// Which provider produced a pollen report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollenSource {
    Primary,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollenReport {
    pub source: PollenSource,
    pub entries: Vec<PollenEntry>,
}

impl PollenReport {
    /// Highest-severity entry, if any
    #[must_use]
    pub fn dominant(&self) -> Option<&PollenEntry> {
        self.entries.iter().max_by_key(|entry| entry.category)
    }
}
