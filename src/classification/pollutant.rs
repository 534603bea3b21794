//! Three-level pollutant status and the reference ranges shown per pollutant

use serde::{Deserialize, Serialize};

use super::ColorToken;
use crate::models::MetricId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollutantLevel {
    Good,
    Moderate,
    Poor,
}

impl PollutantLevel {
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            PollutantLevel::Good => "good",
            PollutantLevel::Moderate => "moderate",
            PollutantLevel::Poor => "poor",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PollutantLevel::Good => "Good",
            PollutantLevel::Moderate => "Moderate",
            PollutantLevel::Poor => "Unhealthy",
        }
    }

    #[must_use]
    pub fn color(self) -> ColorToken {
        match self {
            PollutantLevel::Good => ColorToken::Good,
            PollutantLevel::Moderate => ColorToken::Moderate,
            PollutantLevel::Poor => ColorToken::Unhealthy,
        }
    }
}

/// Inclusive upper limits of the good and moderate levels, in µg/m³
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoints {
    pub good_limit: f64,
    pub moderate_limit: f64,
}

impl Breakpoints {
    #[must_use]
    pub fn level(&self, value: f64) -> PollutantLevel {
        if value <= self.good_limit {
            PollutantLevel::Good
        } else if value <= self.moderate_limit {
            PollutantLevel::Moderate
        } else {
            PollutantLevel::Poor
        }
    }
}

/// Breakpoints for one of the six pollutants; `None` for other metrics
#[must_use]
pub fn breakpoints(metric: MetricId) -> Option<Breakpoints> {
    let (good_limit, moderate_limit) = match metric {
        MetricId::Pm25 => (12.0, 35.4),
        MetricId::Pm10 => (54.0, 154.0),
        MetricId::No2 => (53.0, 100.0),
        MetricId::So2 => (35.0, 75.0),
        MetricId::O3 => (54.0, 70.0),
        MetricId::Co => (4400.0, 9400.0),
        _ => return None,
    };
    Some(Breakpoints {
        good_limit,
        moderate_limit,
    })
}

/// One labeled band in a pollutant's reference table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeInfo {
    pub level: PollutantLevel,
    pub range: &'static str,
}

/// Reference text shown when a pollutant card is opened
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PollutantInfo {
    pub title: &'static str,
    pub description: &'static str,
    pub ranges: [RangeInfo; 3],
}

impl PollutantInfo {
    /// The band the given value falls in, per the pollutant's breakpoints
    #[must_use]
    pub fn current_range(&self, metric: MetricId, value: f64) -> Option<&RangeInfo> {
        let level = breakpoints(metric)?.level(value);
        self.ranges.iter().find(|range| range.level == level)
    }
}

const fn ranges(good: &'static str, moderate: &'static str, poor: &'static str) -> [RangeInfo; 3] {
    [
        RangeInfo {
            level: PollutantLevel::Good,
            range: good,
        },
        RangeInfo {
            level: PollutantLevel::Moderate,
            range: moderate,
        },
        RangeInfo {
            level: PollutantLevel::Poor,
            range: poor,
        },
    ]
}

#[must_use]
pub fn info(metric: MetricId) -> Option<PollutantInfo> {
    let info = match metric {
        MetricId::Pm25 => PollutantInfo {
            title: "Fine Particulate Matter (PM2.5)",
            description: "Tiny particles ≤2.5 micrometers that can penetrate deep into lungs and bloodstream.",
            ranges: ranges("0-12 µg/m³", "12.1-35.4 µg/m³", ">35.4 µg/m³"),
        },
        MetricId::Pm10 => PollutantInfo {
            title: "Coarse Particulate Matter (PM10)",
            description: "Inhalable particles ≤10 micrometers from dust, pollen, and mold. Affects respiratory system.",
            ranges: ranges("0-54 µg/m³", "55-154 µg/m³", ">154 µg/m³"),
        },
        MetricId::No2 => PollutantInfo {
            title: "Nitrogen Dioxide (NO₂)",
            description: "Reddish-brown gas from vehicle emissions and power plants. Irritates airways and reduces immunity.",
            ranges: ranges("0-53 µg/m³", "54-100 µg/m³", ">100 µg/m³"),
        },
        MetricId::So2 => PollutantInfo {
            title: "Sulfur Dioxide (SO₂)",
            description: "Colorless gas from fossil fuel combustion. Can trigger asthma and respiratory issues.",
            ranges: ranges("0-35 µg/m³", "36-75 µg/m³", ">75 µg/m³"),
        },
        MetricId::O3 => PollutantInfo {
            title: "Ground-Level Ozone (O₃)",
            description: "Formed by sunlight reacting with pollutants. Harmful to lungs, especially during outdoor activities.",
            ranges: ranges("0-54 µg/m³", "55-70 µg/m³", ">70 µg/m³"),
        },
        MetricId::Co => PollutantInfo {
            title: "Carbon Monoxide (CO)",
            description: "Odorless, colorless gas from incomplete combustion. Reduces oxygen delivery to body tissues.",
            ranges: ranges("0-4,400 µg/m³", "4,401-9,400 µg/m³", ">9,400 µg/m³"),
        },
        _ => return None,
    };
    Some(info)
}
