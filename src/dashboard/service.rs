//! Dashboard orchestration: resolve, fetch, classify, publish

use chrono::{Local, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

use super::state::{Action, AppState, DashboardView, Event, Panel, apply, is_current};
use crate::config::BreezeConfig;
use crate::models::{ClimateSeries, Location, PollenReport};
use crate::preferences::PreferenceStore;
use crate::providers::{
    AirQualityClient, ClimateClient, GeocodingClient, PollenService, Suggestion, Transport,
};
use crate::resolution::{
    CURATED_CITIES, CitySnapshot, DeepLink, GeolocationProvider, LocationRequest, LocationResolver,
    NavigationHistory, RequestId, SearchInput, SearchResults,
};
use crate::{BreezeError, Result};

const POLLEN_UNAVAILABLE: &str = "Pollen data unavailable for this location.";
const CLIMATE_UNAVAILABLE: &str = "Historical climate data unavailable.";

pub struct Dashboard {
    resolver: LocationResolver,
    air_quality: AirQualityClient,
    pollen: PollenService,
    climate: ClimateClient,
    preferences: Option<PreferenceStore>,
    debounce: Duration,
    state: watch::Sender<AppState>,
    history: Mutex<NavigationHistory>,
}

impl Dashboard {
    pub fn new(
        config: &BreezeConfig,
        transport: Arc<dyn Transport>,
        geolocation: Arc<dyn GeolocationProvider>,
    ) -> Self {
        let geocoding = GeocodingClient::new(
            transport.clone(),
            config.providers.geocoding_url.clone(),
            &config.search,
        );
        let (state, _) = watch::channel(AppState::default());

        Self {
            resolver: LocationResolver::new(Arc::new(geocoding), geolocation),
            air_quality: AirQualityClient::new(
                transport.clone(),
                config.providers.air_quality_url.clone(),
            ),
            pollen: PollenService::from_config(transport.clone(), config),
            climate: ClimateClient::new(
                transport,
                config.providers.climate_archive_url.clone(),
                config.providers.forecast_url.clone(),
                config.climate.reference_years.clone(),
            ),
            preferences: None,
            debounce: Duration::from_millis(config.search.debounce_ms),
            state,
            history: Mutex::new(NavigationHistory::new()),
        }
    }

    /// Attach a preference store and load its flags into the state
    pub async fn with_preferences(mut self, store: PreferenceStore) -> Self {
        match store.load().await {
            Ok(prefs) => {
                self.state.send_modify(|state| {
                    state.dark_mode = prefs.dark_mode;
                    state.unit = prefs.unit;
                });
            }
            Err(e) => warn!("Failed to load preferences, using defaults: {:#}", e),
        }
        self.preferences = Some(store);
        self
    }

    /// Receiver that sees every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Debounced search box wired to this dashboard's geocoder
    #[must_use]
    pub fn search_input(&self) -> (SearchInput, mpsc::UnboundedReceiver<SearchResults>) {
        SearchInput::new(self.resolver.geocoding().clone(), self.debounce)
    }

    /// Suggestions for a query, without touching the state
    pub async fn search(&self, query: &str) -> Result<Vec<Suggestion>> {
        self.resolver.geocoding().search(query).await
    }

    /// Current AQI for the curated cities
    pub async fn ticker(&self) -> Result<Vec<CitySnapshot>> {
        self.air_quality.fetch_city_snapshots(&CURATED_CITIES).await
    }

    /// Apply an event unless it is stale; reports whether it was applied
    fn emit(&self, event: Event) -> bool {
        self.state.send_if_modified(|state| {
            if !is_current(state, &event) {
                return false;
            }
            *state = apply(std::mem::take(state), event);
            true
        })
    }

    /// Issue the next request id and enter `Resolving`
    fn begin(&self) -> RequestId {
        let mut issued = RequestId::default();
        self.state.send_modify(|state| {
            issued = state.latest_request.next();
            *state = apply(
                std::mem::take(state),
                Event::ResolutionStarted { request: issued },
            );
        });
        issued
    }

    /// Map a user action onto state transitions
    pub async fn dispatch(&self, action: Action) -> Result<()> {
        match action {
            Action::Search(query) => self.load(LocationRequest::Query(query), true).await,
            Action::SelectSuggestion(suggestion) => {
                self.load(LocationRequest::Suggestion(suggestion), true).await
            }
            Action::Geolocate => self.load(LocationRequest::Geolocate, true).await,
            Action::SelectCity(city) => self.load(LocationRequest::City(city), true).await,
            Action::OpenLink(link) => self.load(LocationRequest::Link(link), true).await,
            Action::Back => {
                let link = self.lock_history().back().cloned();
                self.navigate(link).await
            }
            Action::Forward => {
                let link = self.lock_history().forward().cloned();
                self.navigate(link).await
            }
            Action::ToggleUnit => {
                self.emit(Event::UnitToggled);
                let unit = self.state.borrow().unit;
                if let Some(store) = &self.preferences {
                    store
                        .set_temperature_unit(unit)
                        .await
                        .map_err(|e| BreezeError::preferences(format!("{e:#}")))?;
                }
                Ok(())
            }
            Action::SetDarkMode(enabled) => {
                self.emit(Event::DarkModeSet(enabled));
                if let Some(store) = &self.preferences {
                    store
                        .set_dark_mode(enabled)
                        .await
                        .map_err(|e| BreezeError::preferences(format!("{e:#}")))?;
                }
                Ok(())
            }
        }
    }

    fn lock_history(&self) -> std::sync::MutexGuard<'_, NavigationHistory> {
        // history stays usable even if a holder panicked
        self.history
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    async fn navigate(&self, link: Option<DeepLink>) -> Result<()> {
        match link {
            Some(link) => self.load(LocationRequest::Link(link), false).await,
            None => {
                debug!("No history entry in that direction");
                Ok(())
            }
        }
    }

    /// Resolve, then load conditions, then pollen and climate in parallel.
    /// Results are only applied while this is still the latest request.
    #[instrument(skip(self))]
    async fn load(&self, request: LocationRequest, record_history: bool) -> Result<()> {
        let id = self.begin();

        let location = match self.resolver.resolve(&request).await {
            Ok(location) => location,
            Err(e) => {
                self.emit(Event::ResolutionFailed {
                    request: id,
                    message: e.user_message(),
                });
                return Err(e);
            }
        };

        let conditions = match self.air_quality.fetch_current_conditions(&location).await {
            Ok(conditions) => conditions,
            Err(e) => {
                warn!("Air quality fetch failed for {}: {}", location.name, e);
                self.emit(Event::ResolutionFailed {
                    request: id,
                    message: e.user_message(),
                });
                return Err(e);
            }
        };

        if !self.emit(Event::ConditionsLoaded {
            request: id,
            location: location.clone(),
            conditions,
        }) {
            debug!("Discarding conditions for superseded request {}", id.value());
            return Ok(());
        }
        if record_history {
            self.lock_history().push(DeepLink::from_location(&location));
        }

        let (pollen, climate) = tokio::join!(
            self.pollen_panel(&location),
            self.climate_panel(&location)
        );
        self.emit(Event::PollenLoaded {
            request: id,
            pollen,
        });
        self.emit(Event::ClimateLoaded {
            request: id,
            climate,
        });

        info!("Dashboard loaded for {}", location.name);
        Ok(())
    }

    async fn pollen_panel(&self, location: &Location) -> Panel<PollenReport> {
        match self.pollen.fetch_pollen(location, Utc::now()).await {
            Ok(report) if !report.entries.is_empty() => Panel::Ready(report),
            Ok(_) => Panel::Unavailable(POLLEN_UNAVAILABLE.to_string()),
            Err(e) => {
                warn!("Pollen unavailable for {}: {}", location.name, e);
                Panel::Unavailable(POLLEN_UNAVAILABLE.to_string())
            }
        }
    }

    async fn climate_panel(&self, location: &Location) -> Panel<ClimateSeries> {
        let series = self
            .climate
            .fetch_climate_series(location, Local::now().date_naive())
            .await;
        if series.is_empty() {
            Panel::Unavailable(CLIMATE_UNAVAILABLE.to_string())
        } else {
            Panel::Ready(series)
        }
    }

    /// Complete view for one location without touching the shared state
    #[instrument(skip(self, location), fields(location = %location.name))]
    pub async fn fetch_view(&self, location: Location) -> Result<DashboardView> {
        let conditions = self.air_quality.fetch_current_conditions(&location).await?;
        let (pollen, climate) = tokio::join!(
            self.pollen_panel(&location),
            self.climate_panel(&location)
        );
        let mut view = DashboardView::new(location, conditions);
        view.pollen = pollen;
        view.climate = climate;
        Ok(view)
    }
}
