//! Same-day maximum temperature across reference years

use chrono::{Datelike, NaiveDate};
use futures::future::join_all;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{Normalize, Transport, fetch_normalized};
use crate::models::{ClimateSample, ClimateSeries, Location};
use crate::{BreezeError, Result};

#[derive(Debug, Deserialize)]
pub struct ClimateResponse {
    pub daily: Option<ClimateDaily>,
}

#[derive(Debug, Deserialize)]
pub struct ClimateDaily {
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
}

impl Normalize for ClimateResponse {
    /// Year the request was made for
    type Context = i32;
    type Output = ClimateSample;

    fn normalize(self, year: &i32) -> Result<ClimateSample> {
        let daily = self
            .daily
            .ok_or_else(|| BreezeError::malformed("Climate response has no daily section"))?;
        let max_temp_c = daily
            .temperature_2m_max
            .first()
            .copied()
            .flatten()
            .filter(|value| value.is_finite());
        Ok(ClimateSample::new(*year, max_temp_c))
    }
}

/// The calendar day of `today` in `year`; Feb 29 becomes Feb 28 in common years
#[must_use]
pub fn same_day_in(year: i32, today: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, today.month(), today.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, today.month(), today.day().saturating_sub(1)))
}

pub struct ClimateClient {
    transport: Arc<dyn Transport>,
    archive_url: String,
    forecast_url: String,
    reference_years: Vec<i32>,
}

impl ClimateClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        archive_url: impl Into<String>,
        forecast_url: impl Into<String>,
        reference_years: Vec<i32>,
    ) -> Self {
        Self {
            transport,
            archive_url: archive_url.into(),
            forecast_url: forecast_url.into(),
            reference_years,
        }
    }

    /// Reference years before `current_year`, then the current year itself
    fn years(&self, current_year: i32) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .reference_years
            .iter()
            .copied()
            .filter(|year| *year < current_year)
            .collect();
        years.sort_unstable();
        years.dedup();
        years.push(current_year);
        years
    }

    fn url(&self, location: &Location, date: NaiveDate, is_current: bool) -> String {
        // the archive lags behind the present, so today comes from the forecast API
        let base = if is_current {
            &self.forecast_url
        } else {
            &self.archive_url
        };
        let day = date.format("%Y-%m-%d");
        format!(
            "{}?latitude={}&longitude={}&start_date={}&end_date={}&daily=temperature_2m_max&timezone=auto",
            base, location.latitude, location.longitude, day, day
        )
    }

    async fn fetch_year(&self, location: &Location, year: i32, today: NaiveDate) -> ClimateSample {
        let Some(date) = same_day_in(year, today) else {
            return ClimateSample::missing(year);
        };
        let url = self.url(location, date, year == today.year());
        match fetch_normalized::<ClimateResponse>(self.transport.as_ref(), "climate", &url, &year)
            .await
        {
            Ok(sample) => sample,
            Err(e) => {
                warn!("Climate sample for {} unavailable: {}", year, e);
                ClimateSample::missing(year)
            }
        }
    }

    /// One concurrent request per year. A failed year becomes a missing
    /// sample; the series keeps only the available ones.
    #[instrument(skip(self, location), fields(location = %location.name))]
    pub async fn fetch_climate_series(&self, location: &Location, today: NaiveDate) -> ClimateSeries {
        let years = self.years(today.year());
        let samples = join_all(
            years
                .iter()
                .map(|&year| self.fetch_year(location, year, today)),
        )
        .await;

        let series = ClimateSeries::from_samples(samples);
        info!(
            "Climate series for {}: {} of {} years available",
            location.name,
            series.len(),
            series.requested()
        );
        series
    }
}
