//! Same-day temperature samples across decades

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trend threshold in °C; smaller deltas count as stable
pub const TREND_THRESHOLD_C: f64 = 0.1;

/// Maximum temperature for one calendar day of one year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateSample {
    pub year: i32,
    pub max_temp_c: Option<f64>,
}

impl ClimateSample {
    #[must_use]
    pub fn new(year: i32, max_temp_c: Option<f64>) -> Self {
        Self { year, max_temp_c }
    }

    #[must_use]
    pub fn missing(year: i32) -> Self {
        Self::new(year, None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarmingTrend {
    Warming,
    Cooling,
    Stable,
}

impl WarmingTrend {
    #[must_use]
    pub fn from_delta(delta_c: f64) -> Self {
        if delta_c > TREND_THRESHOLD_C {
            WarmingTrend::Warming
        } else if delta_c < -TREND_THRESHOLD_C {
            WarmingTrend::Cooling
        } else {
            WarmingTrend::Stable
        }
    }
}

impl fmt::Display for WarmingTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WarmingTrend::Warming => "warming",
            WarmingTrend::Cooling => "cooling",
            WarmingTrend::Stable => "stable",
        })
    }
}

/// Non-null samples ordered by year
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClimateSeries {
    samples: Vec<ClimateSample>,
    /// How many years were asked for, including the failed ones
    requested: usize,
}

impl ClimateSeries {
    /// Keep only samples with a temperature, sorted by year
    #[must_use]
    pub fn from_samples(samples: Vec<ClimateSample>) -> Self {
        let requested = samples.len();
        let mut samples: Vec<ClimateSample> = samples
            .into_iter()
            .filter(|sample| sample.max_temp_c.is_some_and(f64::is_finite))
            .collect();
        samples.sort_by_key(|sample| sample.year);
        Self { samples, requested }
    }

    #[must_use]
    pub fn samples(&self) -> &[ClimateSample] {
        &self.samples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn requested(&self) -> usize {
        self.requested
    }

    #[must_use]
    pub fn baseline(&self) -> Option<&ClimateSample> {
        self.samples.first()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&ClimateSample> {
        self.samples.last()
    }

    /// `latest - baseline` in °C, `None` when the series is empty
    #[must_use]
    pub fn delta(&self) -> Option<f64> {
        let latest = self.latest()?.max_temp_c?;
        let baseline = self.baseline()?.max_temp_c?;
        Some(latest - baseline)
    }

    #[must_use]
    pub fn trend(&self) -> Option<WarmingTrend> {
        self.delta().map(WarmingTrend::from_delta)
    }

    /// Bar heights interpolated linearly over the series' temperature range.
    /// A flat series gets `max_height` for every bar.
    #[must_use]
    pub fn bar_heights(&self, min_height: f64, max_height: f64) -> Vec<f64> {
        let temps: Vec<f64> = self.samples.iter().filter_map(|s| s.max_temp_c).collect();
        let Some(lowest) = temps.iter().copied().reduce(f64::min) else {
            return Vec::new();
        };
        let highest = temps.iter().copied().fold(lowest, f64::max);
        let span = highest - lowest;

        temps
            .iter()
            .map(|temp| {
                if span <= f64::EPSILON {
                    max_height
                } else {
                    min_height + (temp - lowest) / span * (max_height - min_height)
                }
            })
            .collect()
    }
}

/// Preferred display unit for temperatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }

    /// Convert an absolute temperature given in °C
    #[must_use]
    pub fn convert(self, celsius: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    /// Convert a temperature difference given in °C
    #[must_use]
    pub fn convert_delta(self, delta_c: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => delta_c,
            TemperatureUnit::Fahrenheit => delta_c * 9.0 / 5.0,
        }
    }

    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "c" | "celsius" => Some(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Some(TemperatureUnit::Fahrenheit),
            _ => None,
        }
    }
}
