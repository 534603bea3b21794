//! Integration tests for Breeze: end-to-end scenarios through a scripted
//! transport, plus CLI smoke tests that need no network

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use breeze::classification::aqi::AqiTier;
use breeze::classification::pollen::{PollenBucket, map_pollen_category};
use breeze::classification::pollutant::PollutantLevel;
use breeze::classification::Category;
use breeze::config::{BreezeConfig, SearchConfig};
use breeze::models::{PollenSource, WarmingTrend};
use breeze::providers::{AirQualityClient, ClimateClient, GeocodingClient, PollenService};
use breeze::resolution::{SearchInput, Unsupported};
use breeze::{
    Action, BreezeError, ClimateSample, ClimateSeries, Dashboard, DeepLink, HttpResponse,
    Location, MetricId, Transport, classify,
};

/// Answers by URL substring, logs every URL and tracks concurrent requests
#[derive(Default)]
struct FakeTransport {
    routes: Vec<(String, Result<HttpResponse, String>, Duration)>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeTransport {
    fn new() -> Self {
        Self::default()
    }

    fn respond(mut self, pattern: &str, status: u16, body: &str) -> Self {
        self.routes.push((
            pattern.to_string(),
            Ok(HttpResponse::new(status, body)),
            Duration::ZERO,
        ));
        self
    }

    fn respond_after(mut self, pattern: &str, delay: Duration, body: &str) -> Self {
        self.routes
            .push((pattern.to_string(), Ok(HttpResponse::ok(body)), delay));
        self
    }

    fn fail(mut self, pattern: &str) -> Self {
        self.routes.push((
            pattern.to_string(),
            Err("connection refused".to_string()),
            Duration::ZERO,
        ));
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, pattern: &str) -> usize {
        self.calls().iter().filter(|url| url.contains(pattern)).count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &str) -> breeze::Result<HttpResponse> {
        self.calls.lock().unwrap().push(url.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let route = self
            .routes
            .iter()
            .find(|(pattern, _, _)| url.contains(pattern.as_str()));
        let result = match route {
            Some((_, reply, delay)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(*delay).await;
                }
                reply.clone().map_err(BreezeError::network)
            }
            None => Err(BreezeError::network(format!("no route for {url}"))),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

const GOOD_AIR: &str = r#"{"current": {"us_aqi": 42, "pm2_5": 8, "pm10": 20,
    "nitrogen_dioxide": 10, "sulphur_dioxide": 2, "ozone": 50, "carbon_monoxide": 200}}"#;
const GOOGLE_POLLEN: &str = r#"{"dailyInfo": [{"pollenTypeInfo": [
    {"code": "GRASS", "displayName": "Grass", "indexInfo": {"value": 3, "category": "Moderate"}}]}]}"#;
const FALLBACK_POLLEN: &str = r#"{"utc_offset_seconds": 0, "hourly": {
    "birch_pollen": [5,5,5,5,5,5,5,5,5,5,5,5,5,5,5,5,5,5,5,5,5,5,5,5]}}"#;

fn climate_body(temp: f64) -> String {
    format!(r#"{{"daily": {{"temperature_2m_max": [{temp}]}}}}"#)
}

fn test_config() -> BreezeConfig {
    let mut config = BreezeConfig::default();
    config.providers.air_quality_url = "https://air.test/v1/air-quality".to_string();
    config.providers.pollen_fallback_url = "https://fallback.test/v1/air-quality".to_string();
    config.providers.climate_archive_url = "https://archive.test/v1/archive".to_string();
    config.providers.forecast_url = "https://forecast.test/v1/forecast".to_string();
    config.providers.geocoding_url = "https://geo.test/v1/search".to_string();
    config.pollen.upstream_url = "https://google.test/v1/forecast:lookup".to_string();
    config
}

fn paris() -> Location {
    Location::new("Paris, France", 48.8566, 2.3522)
}

#[test]
fn test_aqi_tiers_are_exhaustive_and_ordered() {
    let tier = |value: f64| match classify(MetricId::Aqi, value).category {
        Category::Aqi(tier) => tier,
        other => panic!("unexpected category {other:?}"),
    };

    assert_eq!(tier(25.0), AqiTier::Excellent);
    assert_eq!(tier(26.0), AqiTier::Good);

    let mut previous = tier(0.0);
    for step in 0..=1000 {
        let current = tier(f64::from(step) * 0.5);
        assert!(current >= previous);
        previous = current;
    }
    assert_eq!(previous, AqiTier::Hazardous);
}

#[test]
fn test_pollutant_breakpoints_are_inclusive() {
    assert_eq!(
        classify(MetricId::Pm25, 12.0).category,
        Category::Pollutant(PollutantLevel::Good)
    );
    assert_eq!(
        classify(MetricId::Pm25, 12.1).category,
        Category::Pollutant(PollutantLevel::Moderate)
    );
}

#[test]
fn test_pollen_category_mapping_is_case_insensitive() {
    assert_eq!(map_pollen_category("Very High"), map_pollen_category("very_high"));
    assert_eq!(map_pollen_category("  LOW "), PollenBucket::Low);
    assert_eq!(map_pollen_category("mystery"), PollenBucket::Low);
}

#[test]
fn test_warming_delta() {
    let series = ClimateSeries::from_samples(vec![
        ClimateSample::new(1980, Some(10.0)),
        ClimateSample::new(2024, Some(12.0)),
    ]);
    assert_eq!(series.delta(), Some(2.0));
    assert_eq!(series.trend(), Some(WarmingTrend::Warming));
}

#[tokio::test]
async fn test_current_conditions_scenario() {
    let transport = Arc::new(FakeTransport::new().respond("air.test", 200, GOOD_AIR));
    let client = AirQualityClient::new(transport, "https://air.test/v1/air-quality");
    let conditions = client.fetch_current_conditions(&paris()).await.unwrap();

    assert_eq!(
        conditions.aqi_classification().unwrap().category,
        Category::Aqi(AqiTier::Good)
    );
    for metric in [MetricId::Pm25, MetricId::Pm10] {
        let level = conditions.pollutant(metric).unwrap().classify().unwrap();
        assert_eq!(level.category, Category::Pollutant(PollutantLevel::Good));
    }
}

#[tokio::test]
async fn test_climate_partial_failure_scenario() {
    let transport = Arc::new(
        FakeTransport::new()
            .respond("start_date=1980", 200, &climate_body(10.0))
            .respond("start_date=1990", 200, &climate_body(10.4))
            .fail("start_date=2000")
            .respond("start_date=2010", 200, &climate_body(11.1))
            .respond("start_date=2020", 200, &climate_body(11.6))
            .respond("start_date=2025", 200, &climate_body(12.5)),
    );
    let client = ClimateClient::new(
        transport.clone(),
        "https://archive.test/v1/archive",
        "https://forecast.test/v1/forecast",
        vec![1980, 1990, 2000, 2010, 2020],
    );
    let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let series = client.fetch_climate_series(&paris(), today).await;

    assert_eq!(series.len(), 5);
    assert_eq!(series.requested(), 6);
    assert_eq!(series.delta(), Some(2.5));
    assert_eq!(transport.calls().len(), 6);
}

#[tokio::test]
async fn test_pollen_fallback_after_primary_error() {
    let now = Utc.with_ymd_and_hms(2025, 4, 10, 9, 0, 0).unwrap();
    let mut config = test_config();
    config.pollen.api_key = Some("server-key".to_string());

    // rejected, then non-2xx
    for transport in [
        FakeTransport::new().fail("google.test"),
        FakeTransport::new().respond("google.test", 500, "{}"),
    ] {
        let transport = Arc::new(transport.respond("fallback.test", 200, FALLBACK_POLLEN));
        let service = PollenService::from_config(transport.clone(), &config);
        let report = service.fetch_pollen(&paris(), now).await.unwrap();

        assert_eq!(report.source, PollenSource::Fallback);
        assert_eq!(transport.count("google.test"), 1);
        assert_eq!(transport.count("fallback.test"), 1);
        let calls = transport.calls();
        assert!(calls[0].contains("google.test"));
        assert_eq!(transport.max_in_flight.load(Ordering::SeqCst), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_primary_pollen_is_never_raced() {
    let now = Utc.with_ymd_and_hms(2025, 4, 10, 9, 0, 0).unwrap();
    let mut config = test_config();
    config.pollen.api_key = Some("server-key".to_string());

    let transport = Arc::new(
        FakeTransport::new()
            .respond_after("google.test", Duration::from_secs(3), GOOGLE_POLLEN)
            .respond("fallback.test", 200, FALLBACK_POLLEN),
    );
    let service = PollenService::from_config(transport.clone(), &config);
    let report = service.fetch_pollen(&paris(), now).await.unwrap();

    assert_eq!(report.source, PollenSource::Primary);
    assert_eq!(report.entries[0].code, "GRASS");
    assert_eq!(transport.count("fallback.test"), 0);
}

#[tokio::test]
async fn test_pollen_without_key_skips_primary() {
    let now = Utc.with_ymd_and_hms(2025, 4, 10, 9, 0, 0).unwrap();
    let mut config = test_config();
    config.pollen.api_key = Some("YOUR_GOOGLE_POLLEN_API_KEY".to_string());

    let transport = Arc::new(
        FakeTransport::new()
            .respond("google.test", 200, GOOGLE_POLLEN)
            .respond("fallback.test", 200, FALLBACK_POLLEN),
    );
    let report = PollenService::from_config(transport.clone(), &config)
        .fetch_pollen(&paris(), now)
        .await
        .unwrap();

    assert_eq!(report.source, PollenSource::Fallback);
    assert_eq!(transport.count("google.test"), 0);
    assert_eq!(transport.count("fallback.test"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_search_debounce_scenario() {
    let transport = Arc::new(FakeTransport::new().respond(
        "geo.test",
        200,
        r#"{"results": [{"name": "Lyon", "latitude": 45.76, "longitude": 4.84, "country": "France"}]}"#,
    ));
    let geocoding = GeocodingClient::new(
        transport.clone(),
        "https://geo.test/v1/search",
        &SearchConfig::default(),
    );
    let (mut input, mut results) = SearchInput::new(Arc::new(geocoding), Duration::from_millis(300));

    input.input("L");
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(transport.calls().len(), 0);

    input.input("Ly");
    tokio::time::sleep(Duration::from_millis(150)).await;
    input.input("Lyo");
    let outcome = results.recv().await.unwrap();

    assert_eq!(outcome.query, "Lyo");
    assert_eq!(outcome.suggestions.unwrap()[0].full_name(), "Lyon, France");
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn test_deep_link_dashboard_end_to_end() {
    let transport = Arc::new(
        FakeTransport::new()
            .respond("air.test", 200, GOOD_AIR)
            .respond("fallback.test", 200, FALLBACK_POLLEN)
            .respond("archive.test", 200, &climate_body(18.0))
            .respond("forecast.test", 200, &climate_body(19.5)),
    );
    let dashboard = Dashboard::new(&test_config(), transport.clone(), Arc::new(Unsupported));
    let link = DeepLink::from_query("?city=Paris%2C+France&lat=48.8566&lon=2.3522").unwrap();
    dashboard.dispatch(Action::OpenLink(link)).await.unwrap();

    let state = dashboard.state();
    let view = state.view.unwrap();
    assert_eq!(view.location, paris());
    assert_eq!(view.pollen.ready().unwrap().source, PollenSource::Fallback);
    let climate = view.climate.ready().unwrap();
    assert_eq!(climate.delta(), Some(1.5));
    assert_eq!(
        view.link.to_query_string(),
        "city=Paris%2C+France&lat=48.8566&lon=2.3522"
    );
    assert_eq!(transport.count("google.test"), 0);
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_breeze"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Air quality, pollen and climate"));
    assert!(stdout.contains("report"));
    assert!(stdout.contains("ticker"));
}

/// Test that an incomplete deep link is rejected before any network access
#[test]
fn test_cli_rejects_incomplete_link() {
    let prefs = tempfile::TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_breeze"))
        .args(["report", "--link", "city=Paris&lat=48.85"])
        .env("BREEZE__PREFERENCES__LOCATION", prefs.path())
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("A deep link needs city, lat and lon"));
}

/// Test that preferences default to dark mode and can be changed
#[test]
fn test_cli_prefs_round_trip() {
    let prefs = tempfile::TempDir::new().unwrap();
    let run = |args: &[&str]| {
        Command::new(env!("CARGO_BIN_EXE_breeze"))
            .args(args)
            .env("BREEZE__PREFERENCES__LOCATION", prefs.path())
            .output()
            .expect("Failed to execute command")
    };

    let output = run(&["prefs"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("dark mode: on"));
    assert!(stdout.contains("temperature unit: °C"));

    let output = run(&["prefs", "--dark-mode", "off", "--unit", "f"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("dark mode: off"));
    assert!(stdout.contains("temperature unit: °F"));
}
