//! Current air quality from the Open-Meteo air-quality API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{Normalize, Transport, fetch_normalized};
use crate::classification::Classification;
use crate::models::{Location, MetricId, Reading};
use crate::resolution::cities::{City, CitySnapshot};
use crate::{BreezeError, Result};

const CURRENT_FIELDS: &str =
    "us_aqi,pm10,pm2_5,carbon_monoxide,nitrogen_dioxide,sulphur_dioxide,ozone";

/// Raw payload; `current` is absent when the provider has nothing for us
#[derive(Debug, Deserialize)]
pub struct AirQualityResponse {
    pub current: Option<CurrentAirQuality>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CurrentAirQuality {
    pub us_aqi: Option<f64>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub nitrogen_dioxide: Option<f64>,
    pub sulphur_dioxide: Option<f64>,
    pub ozone: Option<f64>,
    pub carbon_monoxide: Option<f64>,
}

impl CurrentAirQuality {
    fn value(&self, metric: MetricId) -> Option<f64> {
        match metric {
            MetricId::Aqi => self.us_aqi,
            MetricId::Pm25 => self.pm2_5,
            MetricId::Pm10 => self.pm10,
            MetricId::No2 => self.nitrogen_dioxide,
            MetricId::So2 => self.sulphur_dioxide,
            MetricId::O3 => self.ozone,
            MetricId::Co => self.carbon_monoxide,
            MetricId::PollenIndex | MetricId::PollenConcentration => None,
        }
    }
}

/// AQI plus the six pollutants, in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub aqi: Reading,
    pub pollutants: Vec<Reading>,
}

impl CurrentConditions {
    #[must_use]
    pub fn pollutant(&self, metric: MetricId) -> Option<&Reading> {
        self.pollutants.iter().find(|reading| reading.metric == metric)
    }

    #[must_use]
    pub fn aqi_classification(&self) -> Option<Classification> {
        self.aqi.classify()
    }
}

impl Normalize for AirQualityResponse {
    type Context = DateTime<Utc>;
    type Output = CurrentConditions;

    fn normalize(self, observed_at: &DateTime<Utc>) -> Result<CurrentConditions> {
        let current = self
            .current
            .ok_or_else(|| BreezeError::malformed("Air quality response has no current section"))?;

        let aqi = Reading::at(MetricId::Aqi, current.value(MetricId::Aqi), *observed_at);
        let pollutants = MetricId::POLLUTANTS
            .iter()
            .map(|&metric| Reading::at(metric, current.value(metric), *observed_at))
            .collect();

        Ok(CurrentConditions { aqi, pollutants })
    }
}

#[derive(Debug, Deserialize)]
struct TickerEntry {
    current: Option<TickerCurrent>,
}

#[derive(Debug, Deserialize)]
struct TickerCurrent {
    us_aqi: Option<f64>,
}

/// A batched request answers with an array, a single coordinate with an object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TickerResponse {
    Many(Vec<TickerEntry>),
    One(TickerEntry),
}

impl TickerResponse {
    fn into_entries(self) -> Vec<TickerEntry> {
        match self {
            TickerResponse::Many(entries) => entries,
            TickerResponse::One(entry) => vec![entry],
        }
    }
}

impl Normalize for TickerResponse {
    type Context = Vec<City>;
    type Output = Vec<CitySnapshot>;

    fn normalize(self, cities: &Vec<City>) -> Result<Vec<CitySnapshot>> {
        let mut entries = self.into_entries().into_iter();
        Ok(cities
            .iter()
            .map(|city| {
                let aqi = entries
                    .next()
                    .and_then(|entry| entry.current)
                    .and_then(|current| current.us_aqi);
                CitySnapshot::new(city.clone(), aqi)
            })
            .collect())
    }
}

pub struct AirQualityClient {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl AirQualityClient {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    fn current_url(&self, location: &Location) -> String {
        format!(
            "{}?latitude={}&longitude={}&current={}&timezone=auto",
            self.base_url, location.latitude, location.longitude, CURRENT_FIELDS
        )
    }

    /// Fetch the current AQI and pollutant concentrations for a location
    #[instrument(skip(self, location), fields(location = %location.name))]
    pub async fn fetch_current_conditions(&self, location: &Location) -> Result<CurrentConditions> {
        let url = self.current_url(location);
        let conditions = fetch_normalized::<AirQualityResponse>(
            self.transport.as_ref(),
            "air quality",
            &url,
            &Utc::now(),
        )
        .await?;

        info!(
            "Current AQI for {}: {}",
            location.name,
            conditions.aqi.display_value()
        );
        Ok(conditions)
    }

    /// One batched request for the whole city list
    #[instrument(skip_all, fields(cities = cities.len()))]
    pub async fn fetch_city_snapshots(&self, cities: &[City]) -> Result<Vec<CitySnapshot>> {
        if cities.is_empty() {
            return Ok(Vec::new());
        }

        let latitudes = cities
            .iter()
            .map(|city| city.latitude.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let longitudes = cities
            .iter()
            .map(|city| city.longitude.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let url = format!(
            "{}?latitude={}&longitude={}&current=us_aqi",
            self.base_url, latitudes, longitudes
        );

        fetch_normalized::<TickerResponse>(
            self.transport.as_ref(),
            "city ticker",
            &url,
            &cities.to_vec(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::{Category, pollutant::PollutantLevel};
    use crate::classification::aqi::AqiTier;
    use crate::providers::testing::ScriptedTransport;
    use crate::resolution::cities::CURATED_CITIES;

    const GOOD_DAY: &str = r#"{
        "current": {
            "time": "2024-05-01T12:00",
            "us_aqi": 42,
            "pm2_5": 8,
            "pm10": 20,
            "nitrogen_dioxide": 12.5,
            "sulphur_dioxide": 3.1,
            "ozone": 61,
            "carbon_monoxide": 180
        }
    }"#;

    fn client(transport: Arc<ScriptedTransport>) -> AirQualityClient {
        AirQualityClient::new(transport, "https://aq.test/v1/air-quality")
    }

    #[tokio::test]
    async fn test_fetch_current_conditions_good_day() {
        let transport = Arc::new(ScriptedTransport::new().respond("aq.test", 200, GOOD_DAY));
        let conditions = client(transport.clone())
            .fetch_current_conditions(&Location::new("Paris", 48.8566, 2.3522))
            .await
            .unwrap();

        let aqi = conditions.aqi_classification().unwrap();
        assert_eq!(aqi.category, Category::Aqi(AqiTier::Good));

        let pm25 = conditions.pollutant(MetricId::Pm25).unwrap().classify().unwrap();
        assert_eq!(pm25.category, Category::Pollutant(PollutantLevel::Good));
        let pm10 = conditions.pollutant(MetricId::Pm10).unwrap().classify().unwrap();
        assert_eq!(pm10.category, Category::Pollutant(PollutantLevel::Good));

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("latitude=48.8566"));
        assert!(calls[0].contains("current=us_aqi,pm10,pm2_5"));
    }

    #[tokio::test]
    async fn test_missing_current_section_is_malformed() {
        let transport = Arc::new(ScriptedTransport::new().respond("aq.test", 200, r#"{"latitude": 1}"#));
        let err = client(transport)
            .fetch_current_conditions(&Location::new("Nowhere", 0.0, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, BreezeError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_null_pollutant_stays_unavailable() {
        let body = r#"{"current": {"us_aqi": 10, "pm2_5": null}}"#;
        let transport = Arc::new(ScriptedTransport::new().respond("aq.test", 200, body));
        let conditions = client(transport)
            .fetch_current_conditions(&Location::new("Somewhere", 1.0, 1.0))
            .await
            .unwrap();

        let pm25 = conditions.pollutant(MetricId::Pm25).unwrap();
        assert!(!pm25.is_available());
        assert!(pm25.classify().is_none());
        assert_eq!(conditions.pollutants.len(), 6);
    }

    #[tokio::test]
    async fn test_city_snapshots_accept_array_and_object() {
        let cities: Vec<City> = CURATED_CITIES.iter().take(2).cloned().collect();
        let transport = Arc::new(ScriptedTransport::new().respond(
            "aq.test",
            200,
            r#"[{"current": {"us_aqi": 30}}, {"current": {"us_aqi": 180}}]"#,
        ));
        let snapshots = client(transport).fetch_city_snapshots(&cities).await.unwrap();
        assert_eq!(snapshots[0].aqi, Some(30.0));
        assert_eq!(snapshots[1].aqi, Some(180.0));

        let single: Vec<City> = CURATED_CITIES.iter().take(1).cloned().collect();
        let transport = Arc::new(ScriptedTransport::new().respond(
            "aq.test",
            200,
            r#"{"current": {"us_aqi": 55}}"#,
        ));
        let snapshots = client(transport).fetch_city_snapshots(&single).await.unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].aqi, Some(55.0));
    }

    #[tokio::test]
    async fn test_city_snapshots_short_response_leaves_gaps() {
        let cities: Vec<City> = CURATED_CITIES.iter().take(3).cloned().collect();
        let transport = Arc::new(ScriptedTransport::new().respond(
            "aq.test",
            200,
            r#"[{"current": {"us_aqi": 30}}]"#,
        ));
        let snapshots = client(transport).fetch_city_snapshots(&cities).await.unwrap();
        assert_eq!(snapshots.len(), 3);
        assert_eq!(snapshots[2].aqi, None);
    }
}
