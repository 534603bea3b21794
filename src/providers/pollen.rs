//! Pollen adapters: Google Pollen (direct or through the credential relay)
//! with Open-Meteo hourly species as the fallback

use chrono::{DateTime, FixedOffset, Timelike, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{Normalize, Transport, fetch_normalized};
use crate::classification::pollen::{ConcentrationLevel, parse_pollen_category};
use crate::config::BreezeConfig;
use crate::models::{
    Location, PlantFacts, PollenCategory, PollenEntry, PollenEntryKind, PollenExtendedInfo,
    PollenReport, PollenSource,
};
use crate::{BreezeError, Result};

/// The primary provider never contributes more than this many entries
pub const MAX_PRIMARY_ENTRIES: usize = 5;

/// Species requested from the fallback provider, with display names
const FALLBACK_SPECIES: [(&str, &str); 6] = [
    ("alder_pollen", "Alder"),
    ("birch_pollen", "Birch"),
    ("grass_pollen", "Grass"),
    ("mugwort_pollen", "Mugwort"),
    ("olive_pollen", "Olive"),
    ("ragweed_pollen", "Ragweed"),
];

/// Google Pollen `forecast:lookup` URL. Coordinates are passed through as given.
#[must_use]
pub fn google_lookup_url(base_url: &str, api_key: &str, latitude: &str, longitude: &str) -> String {
    format!(
        "{}?key={}&location.latitude={}&location.longitude={}&days=1&languageCode=en",
        base_url,
        urlencoding::encode(api_key),
        urlencoding::encode(latitude),
        urlencoding::encode(longitude)
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GooglePollenResponse {
    #[serde(default)]
    pub daily_info: Vec<GoogleDailyInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleDailyInfo {
    #[serde(default)]
    pub pollen_type_info: Vec<GooglePollenInfo>,
    #[serde(default)]
    pub plant_info: Vec<GooglePollenInfo>,
}

/// Shared shape of `pollenTypeInfo` and `plantInfo` items
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GooglePollenInfo {
    pub code: String,
    pub display_name: Option<String>,
    pub index_info: Option<GoogleIndexInfo>,
    #[serde(default)]
    pub health_recommendations: Vec<String>,
    pub plant_description: Option<GooglePlantDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleIndexInfo {
    pub value: Option<f64>,
    pub category: Option<String>,
    pub index_description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GooglePlantDescription {
    #[serde(rename = "type")]
    pub plant_type: Option<String>,
    pub family: Option<String>,
    pub season: Option<String>,
    pub cross_reaction: Option<String>,
}

impl GooglePollenInfo {
    /// Entries without index info are out of season and skipped
    fn into_entry(self, kind: PollenEntryKind) -> Option<PollenEntry> {
        let index_info = self.index_info?;
        let index_value = index_info
            .value
            .filter(|value| value.is_finite())
            .map_or(0, |value| value.round().clamp(0.0, 5.0) as u8);
        let category = index_info
            .category
            .as_deref()
            .and_then(parse_pollen_category)
            .unwrap_or_else(|| PollenCategory::from_index(index_value));

        let plant_facts = self.plant_description.map(|desc| PlantFacts {
            plant_type: desc.plant_type,
            family: desc.family,
            season: desc.season,
            cross_reaction: desc.cross_reaction,
        });
        let display_name = self.display_name.unwrap_or_else(|| self.code.clone());

        Some(
            PollenEntry::from_index(self.code, display_name, kind, index_value, category)
                .with_extended_info(PollenExtendedInfo {
                    description: index_info.index_description,
                    health_recommendations: self.health_recommendations,
                    plant_facts,
                }),
        )
    }
}

impl Normalize for GooglePollenResponse {
    type Context = ();
    type Output = Vec<PollenEntry>;

    fn normalize(self, _: &()) -> Result<Vec<PollenEntry>> {
        let day = self
            .daily_info
            .into_iter()
            .next()
            .ok_or_else(|| BreezeError::malformed("Pollen response has no dailyInfo"))?;

        let mut entries: Vec<PollenEntry> = day
            .pollen_type_info
            .into_iter()
            .filter_map(|info| info.into_entry(PollenEntryKind::PollenType))
            .collect();

        let mut plants: Vec<PollenEntry> = day
            .plant_info
            .into_iter()
            .filter_map(|info| info.into_entry(PollenEntryKind::Plant))
            .collect();
        plants.sort_by(|a, b| b.index_value.cmp(&a.index_value));
        entries.extend(plants);
        entries.truncate(MAX_PRIMARY_ENTRIES);

        if entries.is_empty() {
            return Err(BreezeError::no_data("No pollen data for this location"));
        }
        Ok(entries)
    }
}

#[derive(Debug, Deserialize)]
pub struct OpenMeteoPollenResponse {
    pub timezone: Option<String>,
    #[serde(default)]
    pub utc_offset_seconds: i32,
    pub hourly: Option<OpenMeteoHourly>,
}

#[derive(Debug, Deserialize)]
pub struct OpenMeteoHourly {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub alder_pollen: Vec<Option<f64>>,
    #[serde(default)]
    pub birch_pollen: Vec<Option<f64>>,
    #[serde(default)]
    pub grass_pollen: Vec<Option<f64>>,
    #[serde(default)]
    pub mugwort_pollen: Vec<Option<f64>>,
    #[serde(default)]
    pub olive_pollen: Vec<Option<f64>>,
    #[serde(default)]
    pub ragweed_pollen: Vec<Option<f64>>,
}

impl OpenMeteoHourly {
    fn series(&self, field: &str) -> &[Option<f64>] {
        match field {
            "alder_pollen" => &self.alder_pollen,
            "birch_pollen" => &self.birch_pollen,
            "grass_pollen" => &self.grass_pollen,
            "mugwort_pollen" => &self.mugwort_pollen,
            "olive_pollen" => &self.olive_pollen,
            "ragweed_pollen" => &self.ragweed_pollen,
            _ => &[],
        }
    }
}

impl OpenMeteoPollenResponse {
    /// Local wall-clock time at the location, as the provider reports it
    fn local_time(&self, now: &DateTime<Utc>) -> chrono::NaiveDateTime {
        if let Some(tz) = self
            .timezone
            .as_deref()
            .and_then(|name| name.parse::<Tz>().ok())
        {
            return now.with_timezone(&tz).naive_local();
        }
        match FixedOffset::east_opt(self.utc_offset_seconds) {
            Some(offset) => now.with_timezone(&offset).naive_local(),
            None => now.naive_utc(),
        }
    }
}

/// Pick the hourly slot for the current local hour. The `time` axis is
/// preferred; without it the hour of day is used as the index.
fn hour_slot(hourly: &OpenMeteoHourly, local: chrono::NaiveDateTime) -> usize {
    let stamp = local.format("%Y-%m-%dT%H:00").to_string();
    hourly
        .time
        .iter()
        .position(|time| *time == stamp)
        .unwrap_or(local.hour() as usize)
}

fn category_for_concentration(grains_per_m3: f64) -> PollenCategory {
    if grains_per_m3 <= 0.0 {
        PollenCategory::None
    } else {
        ConcentrationLevel::from_grains(grains_per_m3).category()
    }
}

impl Normalize for OpenMeteoPollenResponse {
    type Context = DateTime<Utc>;
    type Output = Vec<PollenEntry>;

    fn normalize(self, now: &DateTime<Utc>) -> Result<Vec<PollenEntry>> {
        let local = self.local_time(now);
        let hourly = self
            .hourly
            .as_ref()
            .ok_or_else(|| BreezeError::malformed("Pollen response has no hourly section"))?;
        let slot = hour_slot(hourly, local);

        let entries: Vec<PollenEntry> = FALLBACK_SPECIES
            .iter()
            .filter_map(|(field, name)| {
                let raw = hourly.series(field).get(slot).copied().flatten()?;
                let category = category_for_concentration(raw);
                let mut entry = PollenEntry::from_index(
                    field.trim_end_matches("_pollen"),
                    *name,
                    PollenEntryKind::PollenType,
                    category.index(),
                    category,
                );
                entry.raw_concentration = Some(raw.max(0.0));
                Some(entry)
            })
            .collect();

        if entries.is_empty() {
            return Err(BreezeError::no_data("No pollen data for this location"));
        }
        Ok(entries)
    }
}

/// Where the primary provider is reached
#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryPollenEndpoint {
    /// Straight to Google with a server-held key
    Direct { url: String, api_key: String },
    /// Through the credential relay, which injects the key
    Relay { url: String },
}

pub struct GooglePollenClient {
    transport: Arc<dyn Transport>,
    endpoint: PrimaryPollenEndpoint,
}

impl GooglePollenClient {
    pub fn new(transport: Arc<dyn Transport>, endpoint: PrimaryPollenEndpoint) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    fn url(&self, location: &Location) -> String {
        let latitude = location.latitude.to_string();
        let longitude = location.longitude.to_string();
        match &self.endpoint {
            PrimaryPollenEndpoint::Direct { url, api_key } => {
                google_lookup_url(url, api_key, &latitude, &longitude)
            }
            PrimaryPollenEndpoint::Relay { url } => {
                format!("{url}?lat={latitude}&lon={longitude}")
            }
        }
    }

    pub async fn fetch(&self, location: &Location) -> Result<Vec<PollenEntry>> {
        fetch_normalized::<GooglePollenResponse>(
            self.transport.as_ref(),
            "google pollen",
            &self.url(location),
            &(),
        )
        .await
    }
}

pub struct OpenMeteoPollenClient {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl OpenMeteoPollenClient {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    /// Fetch the six species at the location's current local hour
    pub async fn fetch(&self, location: &Location, now: DateTime<Utc>) -> Result<Vec<PollenEntry>> {
        let fields = FALLBACK_SPECIES
            .iter()
            .map(|(field, _)| *field)
            .collect::<Vec<_>>()
            .join(",");
        let url = format!(
            "{}?latitude={}&longitude={}&hourly={}&timezone=auto&forecast_days=1",
            self.base_url, location.latitude, location.longitude, fields
        );
        fetch_normalized::<OpenMeteoPollenResponse>(
            self.transport.as_ref(),
            "open-meteo pollen",
            &url,
            &now,
        )
        .await
    }
}

/// Two-tier pollen chain. The fallback only runs once the primary has settled.
pub struct PollenService {
    primary: Option<GooglePollenClient>,
    fallback: OpenMeteoPollenClient,
}

impl PollenService {
    pub fn new(primary: Option<GooglePollenClient>, fallback: OpenMeteoPollenClient) -> Self {
        Self { primary, fallback }
    }

    /// Wire the chain from configuration. A missing or placeholder key without
    /// a relay means the primary is simply not configured.
    pub fn from_config(transport: Arc<dyn Transport>, config: &BreezeConfig) -> Self {
        let endpoint = match (config.pollen.usable_api_key(), &config.pollen.relay_url) {
            (Some(key), _) => Some(PrimaryPollenEndpoint::Direct {
                url: config.pollen.upstream_url.clone(),
                api_key: key.to_string(),
            }),
            (None, Some(relay)) if !relay.trim().is_empty() => {
                Some(PrimaryPollenEndpoint::Relay { url: relay.clone() })
            }
            _ => None,
        };

        let primary = endpoint.map(|endpoint| GooglePollenClient::new(transport.clone(), endpoint));
        let fallback =
            OpenMeteoPollenClient::new(transport, config.providers.pollen_fallback_url.clone());
        Self::new(primary, fallback)
    }

    #[must_use]
    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Primary errors are logged and never returned; only a fallback failure
    /// reaches the caller.
    #[instrument(skip(self, location, now), fields(location = %location.name))]
    pub async fn fetch_pollen(&self, location: &Location, now: DateTime<Utc>) -> Result<PollenReport> {
        match &self.primary {
            Some(primary) => match primary.fetch(location).await {
                Ok(entries) => {
                    info!("Pollen from primary provider: {} entries", entries.len());
                    return Ok(PollenReport {
                        source: PollenSource::Primary,
                        entries,
                    });
                }
                Err(e) => warn!("Primary pollen provider failed, using fallback: {}", e),
            },
            None => debug!("Primary pollen provider not configured, using fallback"),
        }

        let entries = self.fallback.fetch(location, now).await?;
        info!("Pollen from fallback provider: {} entries", entries.len());
        Ok(PollenReport {
            source: PollenSource::Fallback,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::pollen::PollenBucket;
    use crate::providers::testing::ScriptedTransport;
    use chrono::TimeZone;

    const GOOGLE_BODY: &str = r#"{
        "dailyInfo": [{
            "pollenTypeInfo": [
                {"code": "GRASS", "displayName": "Grass",
                 "indexInfo": {"value": 4, "category": "High", "indexDescription": "High pollen"},
                 "healthRecommendations": ["Keep windows closed"]},
                {"code": "TREE", "displayName": "Tree"},
                {"code": "WEED", "displayName": "Weed",
                 "indexInfo": {"value": 1, "category": "Very Low"}}
            ],
            "plantInfo": [
                {"code": "BIRCH", "displayName": "Birch",
                 "indexInfo": {"value": 2, "category": "LOW"},
                 "plantDescription": {"type": "TREE", "family": "Betulaceae",
                                      "season": "Spring", "crossReaction": "Alder"}},
                {"code": "OAK", "displayName": "Oak",
                 "indexInfo": {"value": 3, "category": "Moderate"}},
                {"code": "OLIVE", "displayName": "Olive",
                 "indexInfo": {"value": 1, "category": "Very Low"}},
                {"code": "RAGWEED", "displayName": "Ragweed",
                 "indexInfo": {"value": 0, "category": "None"}}
            ]
        }]
    }"#;

    fn fallback_body(hour_value: f64) -> String {
        let mut values = vec!["0.0".to_string(); 24];
        values[14] = hour_value.to_string();
        let series = format!("[{}]", values.join(","));
        let times = (0..24)
            .map(|h| format!("\"2024-05-01T{h:02}:00\""))
            .collect::<Vec<_>>()
            .join(",");
        format!(
            r#"{{"timezone": "Europe/Paris", "utc_offset_seconds": 7200,
                "hourly": {{"time": [{times}],
                  "alder_pollen": {series}, "birch_pollen": {series},
                  "grass_pollen": {series}, "mugwort_pollen": {series},
                  "olive_pollen": {series}, "ragweed_pollen": [null]}}}}"#
        )
    }

    fn paris() -> Location {
        Location::new("Paris", 48.8566, 2.3522)
    }

    // 12:30 UTC is 14:30 in Paris during summer time
    fn noon_utc() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    fn service(transport: Arc<ScriptedTransport>, with_key: bool) -> PollenService {
        let mut config = BreezeConfig::default();
        config.pollen.upstream_url = "https://pollen.test/v1/forecast:lookup".to_string();
        config.providers.pollen_fallback_url = "https://fallback.test/v1/air-quality".to_string();
        if with_key {
            config.pollen.api_key = Some("real-key-123".to_string());
        }
        PollenService::from_config(transport, &config)
    }

    #[test]
    fn test_google_normalization_limits_and_orders_entries() {
        let response: GooglePollenResponse = serde_json::from_str(GOOGLE_BODY).unwrap();
        let entries = response.normalize(&()).unwrap();

        assert_eq!(entries.len(), MAX_PRIMARY_ENTRIES);
        assert_eq!(entries[0].code, "GRASS");
        assert_eq!(entries[0].category, PollenCategory::High);
        // Tree has no index info and is skipped
        assert!(entries.iter().all(|entry| entry.code != "TREE"));
        // Plants follow types, strongest first
        assert_eq!(entries[2].code, "OAK");
        assert_eq!(entries[3].code, "BIRCH");

        let birch = &entries[3];
        let facts = birch
            .extended_info
            .as_ref()
            .and_then(|info| info.plant_facts.as_ref())
            .unwrap();
        assert_eq!(facts.family.as_deref(), Some("Betulaceae"));
        assert_eq!(birch.bucket(), PollenBucket::Low);
    }

    #[test]
    fn test_google_without_daily_info_is_malformed() {
        let response: GooglePollenResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            response.normalize(&()),
            Err(BreezeError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_fallback_normalization_uses_local_hour() {
        let response: OpenMeteoPollenResponse =
            serde_json::from_str(&fallback_body(42.0)).unwrap();
        let entries = response.normalize(&noon_utc()).unwrap();

        // ragweed has no value for this hour
        assert_eq!(entries.len(), 5);
        let grass = entries.iter().find(|entry| entry.code == "grass").unwrap();
        assert_eq!(grass.raw_concentration, Some(42.0));
        assert_eq!(grass.category, PollenCategory::High);
        assert_eq!(grass.index_value, 4);
    }

    #[test]
    fn test_fallback_zero_concentration_is_none() {
        assert_eq!(category_for_concentration(0.0), PollenCategory::None);
        assert_eq!(category_for_concentration(5.0), PollenCategory::Low);
        assert_eq!(category_for_concentration(150.0), PollenCategory::VeryHigh);
    }

    #[test]
    fn test_fallback_offset_when_timezone_unknown() {
        let body = r#"{"timezone": "Mars/Olympus", "utc_offset_seconds": -18000,
                       "hourly": {"grass_pollen": [0,1,2,3,4,5,6,7,8,9,10,11,12,13,14,15,16,17,18,19,20,21,22,23]}}"#;
        let response: OpenMeteoPollenResponse = serde_json::from_str(body).unwrap();
        let entries = response.normalize(&noon_utc()).unwrap();
        // 12:30 UTC at -05:00 is 07:30 local
        assert_eq!(entries[0].raw_concentration, Some(7.0));
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond("pollen.test", 200, GOOGLE_BODY)
                .respond("fallback.test", 200, &fallback_body(5.0)),
        );
        let report = service(transport.clone(), true)
            .fetch_pollen(&paris(), noon_utc())
            .await
            .unwrap();

        assert_eq!(report.source, PollenSource::Primary);
        assert_eq!(transport.calls_matching("fallback.test"), 0);
        assert!(transport.calls()[0].contains("key=real-key-123"));
        assert!(transport.calls()[0].contains("location.latitude=48.8566"));
    }

    #[tokio::test]
    async fn test_primary_non_2xx_falls_back() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond("pollen.test", 403, r#"{"error": "denied"}"#)
                .respond("fallback.test", 200, &fallback_body(5.0)),
        );
        let report = service(transport.clone(), true)
            .fetch_pollen(&paris(), noon_utc())
            .await
            .unwrap();

        assert_eq!(report.source, PollenSource::Fallback);
        assert_eq!(transport.calls_matching("pollen.test"), 1);
        assert_eq!(transport.calls_matching("fallback.test"), 1);
    }

    #[tokio::test]
    async fn test_primary_rejection_falls_back() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .fail("pollen.test", "connection refused")
                .respond("fallback.test", 200, &fallback_body(5.0)),
        );
        let report = service(transport, true)
            .fetch_pollen(&paris(), noon_utc())
            .await
            .unwrap();
        assert_eq!(report.source, PollenSource::Fallback);
    }

    #[tokio::test]
    async fn test_missing_key_never_calls_primary() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond("pollen.test", 200, GOOGLE_BODY)
                .respond("fallback.test", 200, &fallback_body(5.0)),
        );
        let service = service(transport.clone(), false);
        assert!(!service.has_primary());

        let report = service.fetch_pollen(&paris(), noon_utc()).await.unwrap();
        assert_eq!(report.source, PollenSource::Fallback);
        assert_eq!(transport.calls_matching("pollen.test"), 0);
        assert_eq!(transport.calls_matching("fallback.test"), 1);
    }

    #[tokio::test]
    async fn test_relay_endpoint_url() {
        let transport = Arc::new(ScriptedTransport::new().respond("/api/pollen", 200, GOOGLE_BODY));
        let client = GooglePollenClient::new(
            transport.clone(),
            PrimaryPollenEndpoint::Relay {
                url: "https://breeze.test/api/pollen".to_string(),
            },
        );
        client.fetch(&paris()).await.unwrap();
        assert_eq!(
            transport.calls()[0],
            "https://breeze.test/api/pollen?lat=48.8566&lon=2.3522"
        );
    }

    #[tokio::test]
    async fn test_fallback_failure_is_returned() {
        let transport = Arc::new(ScriptedTransport::new().respond("fallback.test", 500, "oops"));
        let err = service(transport, false)
            .fetch_pollen(&paris(), noon_utc())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
    }
}
