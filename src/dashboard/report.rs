//! Plain-text rendering of a dashboard view, plus share and email text

use rand::RngExt;
use std::fmt::{self, Write as _};

use super::state::{DashboardView, Panel};
use crate::classification::pollutant;
use crate::models::{MetricId, TemperatureUnit};

const LOADING_MESSAGES: [&str; 5] = [
    "Checking the air...",
    "Reading conditions...",
    "Getting data...",
    "Analyzing atmosphere...",
    "Measuring quality...",
];

const BAR_WIDTH: usize = 10;
const CLIMATE_BAR_MIN: f64 = 2.0;
const CLIMATE_BAR_MAX: f64 = 20.0;

/// One of the loading messages, picked at random
#[must_use]
pub fn loading_message() -> &'static str {
    LOADING_MESSAGES[rand::rng().random_range(0..LOADING_MESSAGES.len())]
}

/// Text for the system share sheet
#[must_use]
pub fn share_text(view: &DashboardView) -> String {
    format!("Check out the air quality in {}", view.location.name)
}

/// Subject and body of the "email this report" link
#[must_use]
pub fn email_summary(view: &DashboardView, link: &str) -> (String, String) {
    let city = &view.location.name;
    let status = view
        .conditions
        .aqi_classification()
        .map_or("Unavailable", |classification| classification.label);
    let subject = format!("Air Quality Report: {city}");
    let body = format!(
        "Air Quality Index for {city}:\n\nAQI: {} ({status})\n\nView full report: {link}",
        view.conditions.aqi.display_value()
    );
    (subject, body)
}

fn bar(ratio: f64) -> String {
    let filled = (ratio.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Full report in the preferred temperature unit
pub struct Report<'a> {
    pub view: &'a DashboardView,
    pub unit: TemperatureUnit,
    /// Base URL the deep link is appended to
    pub base_url: &'a str,
}

impl Report<'_> {
    fn write_air_quality(&self, out: &mut String) -> fmt::Result {
        let conditions = &self.view.conditions;
        match conditions.aqi_classification() {
            Some(aqi) => {
                writeln!(out, "AQI {} - {}", conditions.aqi.display_value(), aqi.label)?;
                if let Some(description) = aqi.description {
                    writeln!(out, "  {description}")?;
                }
                for tip in aqi.guidance {
                    writeln!(out, "  * {tip}")?;
                }
            }
            None => writeln!(out, "AQI -- (unavailable)")?,
        }

        writeln!(out)?;
        writeln!(out, "Pollutants")?;
        for reading in &conditions.pollutants {
            let unit = reading.metric.unit();
            match reading.classify() {
                Some(classification) => {
                    let range = reading
                        .value
                        .zip(pollutant::info(reading.metric))
                        .and_then(|(value, info)| {
                            info.current_range(reading.metric, value).map(|r| r.range)
                        })
                        .unwrap_or("");
                    writeln!(
                        out,
                        "  {:<6} {:>6} {:<6} {:<9} {}",
                        reading.metric.label(),
                        reading.display_value(),
                        unit,
                        classification.label,
                        range
                    )?;
                }
                None => writeln!(
                    out,
                    "  {:<6} {:>6} {:<6} unavailable",
                    reading.metric.label(),
                    reading.display_value(),
                    unit
                )?,
            }
        }
        Ok(())
    }

    fn write_pollen(&self, out: &mut String) -> fmt::Result {
        writeln!(out)?;
        match &self.view.pollen {
            Panel::Loading => writeln!(out, "Pollen: loading"),
            Panel::Unavailable(message) => writeln!(out, "Pollen: {message}"),
            Panel::Ready(report) => {
                writeln!(out, "Pollen ({:?} provider)", report.source)?;
                for entry in &report.entries {
                    let classification = match entry.raw_concentration {
                        Some(raw) => crate::classification::classify(MetricId::PollenConcentration, raw),
                        None => crate::classification::classify(
                            MetricId::PollenIndex,
                            f64::from(entry.index_value),
                        ),
                    };
                    writeln!(
                        out,
                        "  {:<10} {} {}",
                        entry.display_name,
                        bar(entry.fill_ratio()),
                        classification.label
                    )?;
                }
                if let Some(dominant) = report.dominant() {
                    for tip in dominant.bucket().tips() {
                        writeln!(out, "  * {tip}")?;
                    }
                }
                Ok(())
            }
        }
    }

    fn write_climate(&self, out: &mut String) -> fmt::Result {
        writeln!(out)?;
        let series = match &self.view.climate {
            Panel::Loading => return writeln!(out, "Climate: loading"),
            Panel::Unavailable(message) => return writeln!(out, "Climate: {message}"),
            Panel::Ready(series) => series,
        };

        let symbol = self.unit.symbol();
        writeln!(out, "This day across the decades")?;
        let heights = series.bar_heights(CLIMATE_BAR_MIN, CLIMATE_BAR_MAX);
        for (sample, height) in series.samples().iter().zip(heights) {
            if let Some(temp) = sample.max_temp_c {
                writeln!(
                    out,
                    "  {} {:>6.1}{} {}",
                    sample.year,
                    self.unit.convert(temp),
                    symbol,
                    "▮".repeat(height.round() as usize)
                )?;
            }
        }

        if let (Some(delta), Some(trend), Some(baseline)) =
            (series.delta(), series.trend(), series.baseline())
        {
            writeln!(
                out,
                "  {:+.1}{} since {} ({})",
                self.unit.convert_delta(delta),
                symbol,
                baseline.year,
                trend
            )?;
        }
        Ok(())
    }

    fn render(&self) -> Result<String, fmt::Error> {
        let mut out = String::new();
        writeln!(out, "Air quality in {}", self.view.location.name)?;
        writeln!(out, "{}", self.view.location.format_coordinates())?;
        writeln!(out)?;
        self.write_air_quality(&mut out)?;
        self.write_pollen(&mut out)?;
        self.write_climate(&mut out)?;
        writeln!(out)?;
        write!(out, "Link: {}", self.view.link.url(self.base_url))?;
        Ok(out)
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render()?)
    }
}
