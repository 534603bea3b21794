//! US AQI status tiers and the coarser ticker buckets

use serde::{Deserialize, Serialize};

use super::ColorToken;

/// Eight ordered AQI tiers with inclusive upper bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AqiTier {
    Excellent,
    Good,
    Moderate,
    ModerateHigh,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

/// Display content attached to a tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AqiStatus {
    pub label: &'static str,
    pub description: &'static str,
    pub color: ColorToken,
    pub tips: &'static [&'static str],
}

impl AqiTier {
    pub const ALL: [AqiTier; 8] = [
        AqiTier::Excellent,
        AqiTier::Good,
        AqiTier::Moderate,
        AqiTier::ModerateHigh,
        AqiTier::UnhealthyForSensitiveGroups,
        AqiTier::Unhealthy,
        AqiTier::VeryUnhealthy,
        AqiTier::Hazardous,
    ];

    /// Inclusive upper bound; `None` for the open-ended last tier
    #[must_use]
    pub fn upper_bound(self) -> Option<f64> {
        match self {
            AqiTier::Excellent => Some(25.0),
            AqiTier::Good => Some(50.0),
            AqiTier::Moderate => Some(75.0),
            AqiTier::ModerateHigh => Some(100.0),
            AqiTier::UnhealthyForSensitiveGroups => Some(150.0),
            AqiTier::Unhealthy => Some(200.0),
            AqiTier::VeryUnhealthy => Some(300.0),
            AqiTier::Hazardous => None,
        }
    }

    /// Tier for a finite, non-negative AQI value
    #[must_use]
    pub fn from_value(aqi: f64) -> Self {
        Self::ALL
            .into_iter()
            .find(|tier| tier.upper_bound().is_some_and(|bound| aqi <= bound))
            .unwrap_or(AqiTier::Hazardous)
    }

    #[must_use]
    pub fn status(self) -> AqiStatus {
        match self {
            AqiTier::Excellent => AqiStatus {
                label: "Excellent",
                description: "Air quality is pristine! Perfect day for adventures.",
                color: ColorToken::Good,
                tips: &[
                    "Go outside and soak it all in!",
                    "Perfect time for that morning jog!",
                    "Windows open, fresh air flowing!",
                ],
            },
            AqiTier::Good => AqiStatus {
                label: "Good",
                description: "Air quality is great. Breathe easy!",
                color: ColorToken::Good,
                tips: &[
                    "Open those windows!",
                    "Great day for outdoor activities!",
                    "Take a deep breath and enjoy!",
                ],
            },
            AqiTier::Moderate => AqiStatus {
                label: "Moderate",
                description: "Air quality is acceptable for most people.",
                color: ColorToken::Moderate,
                tips: &[
                    "Sensitive folks, take it easy!",
                    "Maybe skip that marathon today",
                    "Still pretty good for most activities!",
                ],
            },
            AqiTier::ModerateHigh => AqiStatus {
                label: "Moderate High",
                description: "Getting a bit iffy for sensitive groups.",
                color: ColorToken::Moderate,
                tips: &[
                    "If you have asthma, keep that inhaler handy!",
                    "Light outdoor activities are okay",
                    "Stay hydrated!",
                ],
            },
            AqiTier::UnhealthyForSensitiveGroups => AqiStatus {
                label: "Unhealthy for Sensitive Groups",
                description: "Sensitive groups should be cautious.",
                color: ColorToken::UnhealthySensitive,
                tips: &[
                    "Kids and elderly, maybe stay inside",
                    "Asthma? Keep medicine close!",
                    "Cut that outdoor workout short",
                ],
            },
            AqiTier::Unhealthy => AqiStatus {
                label: "Unhealthy",
                description: "Everyone may feel the effects now.",
                color: ColorToken::Unhealthy,
                tips: &[
                    "Indoor day, folks!",
                    "Mask up if you must go out",
                    "Windows closed, please!",
                ],
            },
            AqiTier::VeryUnhealthy => AqiStatus {
                label: "Very Unhealthy",
                description: "Serious health concerns for everyone.",
                color: ColorToken::VeryUnhealthy,
                tips: &[
                    "Stay inside! Not a suggestion!",
                    "Air purifier time!",
                    "Seal those windows ASAP!",
                ],
            },
            AqiTier::Hazardous => AqiStatus {
                label: "Hazardous",
                description: "Emergency conditions. Seriously bad air.",
                color: ColorToken::Hazardous,
                tips: &[
                    "STAY INSIDE. Really.",
                    "N95 mask minimum if you go out",
                    "Air purifier on full blast!",
                    "Check on your neighbors!",
                ],
            },
        }
    }
}

/// Five-way grouping used by the city ticker; `Neutral` when the AQI is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickerBucket {
    Neutral,
    Good,
    Moderate,
    Unhealthy,
    Hazardous,
}

impl TickerBucket {
    #[must_use]
    pub fn from_aqi(aqi: Option<f64>) -> Self {
        match aqi {
            None => TickerBucket::Neutral,
            Some(value) if !value.is_finite() => TickerBucket::Neutral,
            Some(value) if value <= 50.0 => TickerBucket::Good,
            Some(value) if value <= 100.0 => TickerBucket::Moderate,
            Some(value) if value <= 200.0 => TickerBucket::Unhealthy,
            Some(_) => TickerBucket::Hazardous,
        }
    }

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            TickerBucket::Neutral => "neutral",
            TickerBucket::Good => "good",
            TickerBucket::Moderate => "moderate",
            TickerBucket::Unhealthy => "unhealthy",
            TickerBucket::Hazardous => "hazardous",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, AqiTier::Excellent)]
    #[case(25.0, AqiTier::Excellent)]
    #[case(26.0, AqiTier::Good)]
    #[case(50.0, AqiTier::Good)]
    #[case(75.0, AqiTier::Moderate)]
    #[case(100.0, AqiTier::ModerateHigh)]
    #[case(100.5, AqiTier::UnhealthyForSensitiveGroups)]
    #[case(150.0, AqiTier::UnhealthyForSensitiveGroups)]
    #[case(200.0, AqiTier::Unhealthy)]
    #[case(300.0, AqiTier::VeryUnhealthy)]
    #[case(301.0, AqiTier::Hazardous)]
    #[case(5000.0, AqiTier::Hazardous)]
    fn test_tier_boundaries(#[case] aqi: f64, #[case] expected: AqiTier) {
        assert_eq!(AqiTier::from_value(aqi), expected);
    }

    #[test]
    fn test_tiers_are_ordered_and_exhaustive() {
        let mut previous = AqiTier::Excellent;
        for aqi in 0..=600 {
            let tier = AqiTier::from_value(f64::from(aqi));
            assert!(tier >= previous, "tier went down at {aqi}");
            previous = tier;
        }
        assert_eq!(previous, AqiTier::Hazardous);
    }

    #[test]
    fn test_every_tier_has_guidance() {
        for tier in AqiTier::ALL {
            let status = tier.status();
            assert!((2..=4).contains(&status.tips.len()), "{tier:?}");
            assert!(!status.label.is_empty());
        }
    }

    #[rstest]
    #[case(None, TickerBucket::Neutral)]
    #[case(Some(50.0), TickerBucket::Good)]
    #[case(Some(51.0), TickerBucket::Moderate)]
    #[case(Some(200.0), TickerBucket::Unhealthy)]
    #[case(Some(201.0), TickerBucket::Hazardous)]
    fn test_ticker_buckets(#[case] aqi: Option<f64>, #[case] expected: TickerBucket) {
        assert_eq!(TickerBucket::from_aqi(aqi), expected);
    }
}
