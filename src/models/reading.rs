//! Normalized sensor/forecast readings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classification::{self, Classification};

/// Every quantity the dashboard knows how to classify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricId {
    Aqi,
    Pm25,
    Pm10,
    No2,
    So2,
    O3,
    Co,
    /// Provider-normalized 0-5 pollen index
    PollenIndex,
    /// Raw pollen concentration in grains/m³
    PollenConcentration,
}

impl MetricId {
    /// The six pollutants reported next to the AQI, in display order
    pub const POLLUTANTS: [MetricId; 6] = [
        MetricId::Pm25,
        MetricId::Pm10,
        MetricId::No2,
        MetricId::So2,
        MetricId::O3,
        MetricId::Co,
    ];

    /// Short identifier used in URLs and JSON
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            MetricId::Aqi => "aqi",
            MetricId::Pm25 => "pm25",
            MetricId::Pm10 => "pm10",
            MetricId::No2 => "no2",
            MetricId::So2 => "so2",
            MetricId::O3 => "o3",
            MetricId::Co => "co",
            MetricId::PollenIndex => "pollen_index",
            MetricId::PollenConcentration => "pollen_concentration",
        }
    }

    /// Inverse of [`MetricId::key`]
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "aqi" => Some(MetricId::Aqi),
            "pm25" => Some(MetricId::Pm25),
            "pm10" => Some(MetricId::Pm10),
            "no2" => Some(MetricId::No2),
            "so2" => Some(MetricId::So2),
            "o3" => Some(MetricId::O3),
            "co" => Some(MetricId::Co),
            "pollen_index" => Some(MetricId::PollenIndex),
            "pollen_concentration" => Some(MetricId::PollenConcentration),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            MetricId::Aqi => "AQI",
            MetricId::Pm25 => "PM2.5",
            MetricId::Pm10 => "PM10",
            MetricId::No2 => "NO₂",
            MetricId::So2 => "SO₂",
            MetricId::O3 => "O₃",
            MetricId::Co => "CO",
            MetricId::PollenIndex => "Pollen index",
            MetricId::PollenConcentration => "Pollen",
        }
    }

    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            MetricId::Aqi | MetricId::PollenIndex => "",
            MetricId::PollenConcentration => "grains/m³",
            _ => "µg/m³",
        }
    }

    #[must_use]
    pub fn is_pollutant(self) -> bool {
        Self::POLLUTANTS.contains(&self)
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value for one metric. `None` means "unavailable", which is not zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub metric: MetricId,
    pub value: Option<f64>,
    pub observed_at: DateTime<Utc>,
}

impl Reading {
    /// Create a reading observed now
    #[must_use]
    pub fn new(metric: MetricId, value: Option<f64>) -> Self {
        Self::at(metric, value, Utc::now())
    }

    #[must_use]
    pub fn at(metric: MetricId, value: Option<f64>, observed_at: DateTime<Utc>) -> Self {
        Self {
            metric,
            value,
            observed_at,
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.value.is_some()
    }

    /// Classify the value; unavailable readings never get a category
    #[must_use]
    pub fn classify(&self) -> Option<Classification> {
        self.value
            .map(|value| classification::classify(self.metric, value))
    }

    /// Value rounded for display, or `--` when unavailable
    #[must_use]
    pub fn display_value(&self) -> String {
        match self.value {
            Some(value) => format!("{}", value.round() as i64),
            None => "--".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_keys_round_trip() {
        for metric in MetricId::POLLUTANTS {
            assert_eq!(MetricId::from_key(metric.key()), Some(metric));
            assert!(metric.is_pollutant());
        }
        assert!(!MetricId::Aqi.is_pollutant());
        assert_eq!(MetricId::from_key("pm1"), None);
    }

    #[test]
    fn test_unavailable_reading_has_no_classification() {
        let reading = Reading::new(MetricId::Pm25, None);
        assert!(!reading.is_available());
        assert!(reading.classify().is_none());
        assert_eq!(reading.display_value(), "--");
    }

    #[test]
    fn test_zero_is_a_real_value() {
        let reading = Reading::new(MetricId::So2, Some(0.0));
        assert!(reading.classify().is_some());
        assert_eq!(reading.display_value(), "0");
    }

    #[test]
    fn test_display_value_rounds() {
        assert_eq!(Reading::new(MetricId::Pm10, Some(19.6)).display_value(), "20");
        assert_eq!(Reading::new(MetricId::Co, Some(201.4)).display_value(), "201");
    }
}
