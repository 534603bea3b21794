//! Location Resolution Module
//!
//! Turns search text, suggestions, device geolocation, curated cities and
//! deep links into a [`Location`], and tracks the resolution state machine.

pub mod cities;
pub mod debounce;
pub mod deep_link;
pub mod suggestions;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::models::Location;
use crate::providers::{GeocodingClient, Suggestion};
use crate::{BreezeError, Result};

pub use cities::{CURATED_CITIES, City, CitySnapshot};
pub use debounce::{Debouncer, SearchInput, SearchResults};
pub use deep_link::{DeepLink, NavigationHistory};
pub use suggestions::{NavKey, NavOutcome, SuggestionList};

/// Display name used for device positions
pub const GEOLOCATED_NAME: &str = "Your Location";

/// Monotonic id of one resolution attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct RequestId(u64);

impl RequestId {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// `Idle -> Resolving -> Resolved | Failed`. `Failed` stays until the user
/// triggers another resolution.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResolutionState {
    #[default]
    Idle,
    Resolving { request: RequestId },
    Resolved { location: Location },
    Failed { message: String },
}

impl ResolutionState {
    #[must_use]
    pub fn is_resolving(&self) -> bool {
        matches!(self, ResolutionState::Resolving { .. })
    }

    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        match self {
            ResolutionState::Resolved { location } => Some(location),
            _ => None,
        }
    }
}

/// Where a resolution was triggered from
#[derive(Debug, Clone, PartialEq)]
pub enum LocationRequest {
    /// Free text typed and submitted; coordinates are accepted too
    Query(String),
    /// A suggestion picked from the dropdown
    Suggestion(Suggestion),
    /// Device position
    Geolocate,
    /// A ticker item
    City(City),
    /// Address bar at load time, or back/forward navigation
    Link(DeepLink),
}

/// Types of free-text input
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    /// Coordinates (latitude, longitude)
    Coordinates(f64, f64),
    /// Location name (city, region, etc.)
    Name(String),
}

/// Parser for free-text location input
pub struct LocationParser;

impl LocationParser {
    /// Coordinates such as `"46.8182,8.2275"` or `"46.8182 8.2275"`, else a name
    pub fn parse(input: &str) -> Result<LocationInput> {
        let input = input.trim();
        if input.is_empty() {
            return Err(BreezeError::unsupported("Please enter a location."));
        }

        match Self::parse_coordinates(input) {
            Some(coordinates) => {
                let (lat, lon) = coordinates?;
                Ok(LocationInput::Coordinates(lat, lon))
            }
            None => Ok(LocationInput::Name(input.to_string())),
        }
    }

    /// `None` when the input does not look like a coordinate pair at all
    fn parse_coordinates(input: &str) -> Option<Result<(f64, f64)>> {
        let parts: Vec<&str> = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();

        let [lat, lon] = parts.as_slice() else {
            return None;
        };
        let lat = lat.parse::<f64>().ok()?;
        let lon = lon.parse::<f64>().ok()?;

        Some(Location::try_new(String::new(), lat, lon).map(|_| (lat, lon)))
    }
}

/// Device position source
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    /// `(latitude, longitude)` of the device
    async fn current_position(&self) -> Result<(f64, f64)>;
}

/// No positioning hardware or permission
pub struct Unsupported;

#[async_trait]
impl GeolocationProvider for Unsupported {
    async fn current_position(&self) -> Result<(f64, f64)> {
        Err(BreezeError::unsupported("Geolocation not supported."))
    }
}

/// A fixed position, e.g. from the command line
pub struct FixedPosition {
    pub latitude: f64,
    pub longitude: f64,
}

#[async_trait]
impl GeolocationProvider for FixedPosition {
    async fn current_position(&self) -> Result<(f64, f64)> {
        Ok((self.latitude, self.longitude))
    }
}

/// Service for resolving location requests
pub struct LocationResolver {
    geocoding: Arc<GeocodingClient>,
    geolocation: Arc<dyn GeolocationProvider>,
}

impl LocationResolver {
    pub fn new(geocoding: Arc<GeocodingClient>, geolocation: Arc<dyn GeolocationProvider>) -> Self {
        Self {
            geocoding,
            geolocation,
        }
    }

    #[must_use]
    pub fn geocoding(&self) -> &Arc<GeocodingClient> {
        &self.geocoding
    }

    /// Resolve a request into a structured Location
    #[instrument(skip(self))]
    pub async fn resolve(&self, request: &LocationRequest) -> Result<Location> {
        let location = match request {
            LocationRequest::Query(text) => self.resolve_query(text).await?,
            LocationRequest::Suggestion(suggestion) => suggestion.to_location(),
            LocationRequest::Geolocate => {
                let (lat, lon) = self.geolocation.current_position().await?;
                Location::try_new(GEOLOCATED_NAME, lat, lon)?
            }
            LocationRequest::City(city) => city.location(),
            LocationRequest::Link(link) => Location::try_new(link.city.clone(), link.lat, link.lon)?,
        };

        debug!(
            "Resolved location: {} at ({}, {})",
            location.name, location.latitude, location.longitude
        );
        Ok(location)
    }

    async fn resolve_query(&self, text: &str) -> Result<Location> {
        match LocationParser::parse(text)? {
            LocationInput::Coordinates(lat, lon) => {
                Location::try_new(format!("{lat:.4}, {lon:.4}"), lat, lon)
            }
            LocationInput::Name(name) => {
                debug!("Geocoding location name: {}", name);
                self.geocoding
                    .search(&name)
                    .await?
                    .into_iter()
                    .next()
                    .map(|best| best.to_location())
                    .ok_or_else(|| BreezeError::no_data(format!("No locations found for \"{name}\".")))
            }
        }
    }
}
