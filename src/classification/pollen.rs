//! Pollen category mapping and raw-concentration levels

use serde::{Deserialize, Serialize};

use super::ColorToken;
use crate::models::PollenCategory;

/// Top of the provider-normalized pollen index
pub const POLLEN_INDEX_MAX: u8 = 5;

/// Raw concentration (grains/m³) that fills a bar completely
pub const CONCENTRATION_SCALE_MAX: f64 = 100.0;

/// Display buckets the six source categories collapse into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollenBucket {
    None,
    Low,
    Moderate,
    /// High or extreme
    High,
}

impl PollenBucket {
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            PollenBucket::None => "none",
            PollenBucket::Low => "low",
            PollenBucket::Moderate => "moderate",
            PollenBucket::High => "high",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PollenBucket::None => "None",
            PollenBucket::Low => "Low",
            PollenBucket::Moderate => "Moderate",
            PollenBucket::High => "High",
        }
    }

    #[must_use]
    pub fn color(self) -> ColorToken {
        match self {
            PollenBucket::None | PollenBucket::Low => ColorToken::Good,
            PollenBucket::Moderate => ColorToken::Moderate,
            PollenBucket::High => ColorToken::Unhealthy,
        }
    }

    #[must_use]
    pub fn tips(self) -> &'static [&'static str] {
        match self {
            PollenBucket::None | PollenBucket::Low => &[
                "Pollen is low, enjoy the outdoors",
                "A good day to air out the house",
            ],
            PollenBucket::Moderate => &[
                "Allergy sufferers may notice symptoms",
                "Keep antihistamines within reach",
            ],
            PollenBucket::High => &[
                "Keep windows closed",
                "Shower and change clothes after being outside",
                "Limit outdoor activity in the early morning",
            ],
        }
    }
}

/// Four levels for raw concentrations from the fallback provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcentrationLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl ConcentrationLevel {
    #[must_use]
    pub fn from_grains(grains_per_m3: f64) -> Self {
        if grains_per_m3 < 10.0 {
            ConcentrationLevel::Low
        } else if grains_per_m3 < 30.0 {
            ConcentrationLevel::Moderate
        } else if grains_per_m3 < 100.0 {
            ConcentrationLevel::High
        } else {
            ConcentrationLevel::VeryHigh
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ConcentrationLevel::Low => "Low",
            ConcentrationLevel::Moderate => "Moderate",
            ConcentrationLevel::High => "High",
            ConcentrationLevel::VeryHigh => "Very High",
        }
    }

    #[must_use]
    pub fn category(self) -> PollenCategory {
        match self {
            ConcentrationLevel::Low => PollenCategory::Low,
            ConcentrationLevel::Moderate => PollenCategory::Moderate,
            ConcentrationLevel::High => PollenCategory::High,
            ConcentrationLevel::VeryHigh => PollenCategory::VeryHigh,
        }
    }
}

/// `"Very High"`, `" very-high "` and `"VERY_HIGH"` all become `"very_high"`
fn normalize_category_key(raw: &str) -> String {
    raw.split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Parse a provider category string, ignoring case and separators
#[must_use]
pub fn parse_pollen_category(raw: &str) -> Option<PollenCategory> {
    match normalize_category_key(raw).as_str() {
        "none" => Some(PollenCategory::None),
        "very_low" => Some(PollenCategory::VeryLow),
        "low" => Some(PollenCategory::Low),
        "moderate" => Some(PollenCategory::Moderate),
        "high" => Some(PollenCategory::High),
        "very_high" => Some(PollenCategory::VeryHigh),
        _ => None,
    }
}

/// Map a provider category string to a display bucket.
/// Unknown strings land in `Low` rather than failing.
#[must_use]
pub fn map_pollen_category(raw: &str) -> PollenBucket {
    parse_pollen_category(raw)
        .map(PollenCategory::bucket)
        .unwrap_or(PollenBucket::Low)
}
