//! Free-text location search against the Open-Meteo geocoding API

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{Normalize, Transport, fetch_normalized};
use crate::config::SearchConfig;
use crate::models::Location;
use crate::{BreezeError, Result};

#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    /// Omitted entirely when nothing matched
    pub results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodingResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub admin1: Option<String>,
    pub country: Option<String>,
}

/// One search candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    pub admin1: Option<String>,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Suggestion {
    /// `name[, admin1][, country]`
    #[must_use]
    pub fn full_name(&self) -> String {
        let mut parts = vec![self.name.as_str()];
        parts.extend(
            [self.admin1.as_deref(), self.country.as_deref()]
                .into_iter()
                .flatten()
                .filter(|part| !part.is_empty()),
        );
        parts.join(", ")
    }

    #[must_use]
    pub fn to_location(&self) -> Location {
        Location::new(self.full_name(), self.latitude, self.longitude)
    }
}

impl Normalize for GeocodingResponse {
    /// Maximum number of suggestions to keep
    type Context = usize;
    type Output = Vec<Suggestion>;

    fn normalize(self, limit: &usize) -> Result<Vec<Suggestion>> {
        Ok(self
            .results
            .unwrap_or_default()
            .into_iter()
            .take(*limit)
            .map(|result| Suggestion {
                name: result.name,
                admin1: result.admin1,
                country: result.country,
                latitude: result.latitude,
                longitude: result.longitude,
            })
            .collect())
    }
}

pub struct GeocodingClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    language: String,
    count: u8,
    min_query_len: usize,
}

impl GeocodingClient {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>, search: &SearchConfig) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            language: search.language.clone(),
            count: search.result_count,
            min_query_len: search.min_query_len,
        }
    }

    #[must_use]
    pub fn min_query_len(&self) -> usize {
        self.min_query_len
    }

    /// Whether `query` is long enough to be sent at all
    #[must_use]
    pub fn accepts(&self, query: &str) -> bool {
        query.trim().chars().count() >= self.min_query_len
    }

    /// Up to `count` candidates for `query`. Short queries fail without a request.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Suggestion>> {
        if !self.accepts(query) {
            return Err(BreezeError::unsupported(format!(
                "Search needs at least {} characters",
                self.min_query_len
            )));
        }

        let url = format!(
            "{}?name={}&count={}&language={}&format=json",
            self.base_url,
            urlencoding::encode(query.trim()),
            self.count,
            urlencoding::encode(&self.language)
        );
        let suggestions = fetch_normalized::<GeocodingResponse>(
            self.transport.as_ref(),
            "geocoding",
            &url,
            &usize::from(self.count),
        )
        .await?;

        debug!("{} suggestions for '{}'", suggestions.len(), query.trim());
        Ok(suggestions)
    }
}
