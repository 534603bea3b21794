//! Classification engine
//!
//! Pure functions that turn a numeric reading into a category, a color token
//! and guidance text. Classification never fails: values outside a metric's
//! domain get the lowest tier with `unknown` set, so there is always
//! something to render.

pub mod aqi;
pub mod pollen;
pub mod pollutant;

use serde::{Deserialize, Serialize};

use crate::models::{MetricId, PollenCategory};

pub use aqi::{AqiStatus, AqiTier, TickerBucket};
pub use pollen::{map_pollen_category, parse_pollen_category, ConcentrationLevel, PollenBucket};
pub use pollutant::{PollutantInfo, PollutantLevel};

/// Display color, rendered as a CSS custom property by the frontend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorToken {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
    Neutral,
}

impl ColorToken {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ColorToken::Good => "aqi-good",
            ColorToken::Moderate => "aqi-moderate",
            ColorToken::UnhealthySensitive => "aqi-unhealthy-sensitive",
            ColorToken::Unhealthy => "aqi-unhealthy",
            ColorToken::VeryUnhealthy => "aqi-very-unhealthy",
            ColorToken::Hazardous => "aqi-hazardous",
            ColorToken::Neutral => "aqi-neutral",
        }
    }

    #[must_use]
    pub fn css_var(self) -> String {
        format!("var(--{})", self.name())
    }
}

/// Metric-specific ordered category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scale", content = "level", rename_all = "snake_case")]
pub enum Category {
    Aqi(AqiTier),
    Pollutant(PollutantLevel),
    PollenIndex(PollenBucket),
    PollenConcentration(ConcentrationLevel),
}

impl Category {
    /// 0 for the mildest category of the scale
    #[must_use]
    pub fn severity(self) -> u8 {
        match self {
            Category::Aqi(tier) => tier as u8,
            Category::Pollutant(level) => level as u8,
            Category::PollenIndex(bucket) => bucket as u8,
            Category::PollenConcentration(level) => level as u8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub metric: MetricId,
    pub category: Category,
    pub label: &'static str,
    pub description: Option<&'static str>,
    pub color: ColorToken,
    pub guidance: &'static [&'static str],
    /// Set when the input was outside the metric's domain
    pub unknown: bool,
}

/// Classify one value of one metric
#[must_use]
pub fn classify(metric: MetricId, value: f64) -> Classification {
    let unknown = !value.is_finite() || value < 0.0;
    let value = if unknown { 0.0 } else { value };

    let mut classification = match metric {
        MetricId::Aqi => {
            let tier = AqiTier::from_value(value);
            let status = tier.status();
            Classification {
                metric,
                category: Category::Aqi(tier),
                label: status.label,
                description: Some(status.description),
                color: status.color,
                guidance: status.tips,
                unknown: false,
            }
        }
        MetricId::PollenIndex => {
            let index = value.round().min(f64::from(pollen::POLLEN_INDEX_MAX)) as u8;
            let bucket = PollenCategory::from_index(index).bucket();
            Classification {
                metric,
                category: Category::PollenIndex(bucket),
                label: bucket.label(),
                description: None,
                color: bucket.color(),
                guidance: bucket.tips(),
                unknown: false,
            }
        }
        MetricId::PollenConcentration => {
            let level = ConcentrationLevel::from_grains(value);
            let bucket = level.category().bucket();
            Classification {
                metric,
                category: Category::PollenConcentration(level),
                label: level.label(),
                description: None,
                color: bucket.color(),
                guidance: bucket.tips(),
                unknown: false,
            }
        }
        pollutant => {
            let level = pollutant::breakpoints(pollutant)
                .map(|bp| bp.level(value))
                .unwrap_or(PollutantLevel::Good);
            Classification {
                metric,
                category: Category::Pollutant(level),
                label: level.label(),
                description: pollutant::info(pollutant).map(|info| info.description),
                color: level.color(),
                guidance: &[],
                unknown: false,
            }
        }
    };

    classification.unknown = unknown;
    classification
}

/// Bar fill in 0..=1 for a value on a metric-dependent scale
#[must_use]
pub fn fill_ratio(value: f64, scale_max: f64) -> f64 {
    if !value.is_finite() || scale_max <= 0.0 {
        return 0.0;
    }
    (value / scale_max).clamp(0.0, 1.0)
}
