//! Address-bar deep links (`?city=..&lat=..&lon=..`) and back/forward history

use serde::{Deserialize, Serialize};

use crate::models::location::CANONICAL_PRECISION;
use crate::models::Location;

/// A location as carried in a shareable query string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeepLink {
    pub city: String,
    pub lat: f64,
    pub lon: f64,
}

impl DeepLink {
    /// Link for a location, coordinates cut to 4 decimals
    #[must_use]
    pub fn from_location(location: &Location) -> Self {
        let canonical = location.canonical();
        Self {
            city: canonical.name,
            lat: canonical.latitude,
            lon: canonical.longitude,
        }
    }

    #[must_use]
    pub fn to_location(&self) -> Location {
        Location::new(self.city.clone(), self.lat, self.lon)
    }

    /// Form-encoded query string, without the leading `?`
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let precision = CANONICAL_PRECISION as usize;
        format!(
            "city={}&lat={:.*}&lon={:.*}",
            form_encode(&self.city),
            precision,
            self.lat,
            precision,
            self.lon
        )
    }

    /// `base` followed by the query string
    #[must_use]
    pub fn url(&self, base: &str) -> String {
        format!("{}?{}", base, self.to_query_string())
    }

    /// Parse a query string, with or without the leading `?`.
    ///
    /// All three parameters must be present and non-empty, and the coordinates
    /// must be in range; otherwise there is nothing to auto-load.
    #[must_use]
    pub fn from_query(query: &str) -> Option<Self> {
        let mut city = None;
        let mut lat = None;
        let mut lon = None;

        for pair in query.trim_start_matches('?').split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = form_decode(value)?;
            if value.trim().is_empty() {
                continue;
            }
            match key {
                "city" => city = Some(value),
                "lat" => lat = value.trim().parse::<f64>().ok(),
                "lon" => lon = value.trim().parse::<f64>().ok(),
                _ => {}
            }
        }

        let link = Self {
            city: city?,
            lat: lat?,
            lon: lon?,
        };
        Location::try_new(link.city.clone(), link.lat, link.lon).ok()?;
        Some(link)
    }
}

fn form_encode(value: &str) -> String {
    urlencoding::encode(value).replace("%20", "+")
}

fn form_decode(value: &str) -> Option<String> {
    urlencoding::decode(&value.replace('+', " "))
        .ok()
        .map(|decoded| decoded.into_owned())
}

/// Linear browsing history with a cursor, like a browser tab's
#[derive(Debug, Clone, Default)]
pub struct NavigationHistory {
    entries: Vec<DeepLink>,
    cursor: Option<usize>,
}

impl NavigationHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly resolved location. Forward entries are discarded and a
    /// repeat of the current entry is not pushed twice.
    pub fn push(&mut self, link: DeepLink) {
        if self.current() == Some(&link) {
            return;
        }
        let keep = self.cursor.map_or(0, |cursor| cursor + 1);
        self.entries.truncate(keep);
        self.entries.push(link);
        self.cursor = Some(self.entries.len() - 1);
    }

    #[must_use]
    pub fn current(&self) -> Option<&DeepLink> {
        self.cursor.and_then(|cursor| self.entries.get(cursor))
    }

    pub fn back(&mut self) -> Option<&DeepLink> {
        let cursor = self.cursor?.checked_sub(1)?;
        self.cursor = Some(cursor);
        self.entries.get(cursor)
    }

    pub fn forward(&mut self) -> Option<&DeepLink> {
        let cursor = self.cursor? + 1;
        if cursor >= self.entries.len() {
            return None;
        }
        self.cursor = Some(cursor);
        self.entries.get(cursor)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn link(city: &str, lat: f64, lon: f64) -> DeepLink {
        DeepLink {
            city: city.to_string(),
            lat,
            lon,
        }
    }

    #[test]
    fn test_query_string_uses_four_decimals() {
        let location = Location::new("Paris, France", 48.856_613, 2.352_222);
        let link = DeepLink::from_location(&location);
        assert_eq!(
            link.to_query_string(),
            "city=Paris%2C+France&lat=48.8566&lon=2.3522"
        );
    }

    #[test]
    fn test_query_string_reproduces_location() {
        let original = Location::new("São Paulo, Brazil", -23.5505, -46.6333);
        let query = DeepLink::from_location(&original).to_query_string();
        let restored = DeepLink::from_query(&format!("?{query}")).unwrap().to_location();
        assert_eq!(restored, original);
    }

    #[rstest]
    #[case("?lat=1&lon=2")]
    #[case("?city=Paris&lon=2")]
    #[case("?city=Paris&lat=1")]
    #[case("?city=&lat=1&lon=2")]
    #[case("?city=Paris&lat=abc&lon=2")]
    #[case("?city=Paris&lat=91&lon=2")]
    #[case("")]
    fn test_incomplete_query_disables_auto_load(#[case] query: &str) {
        assert!(DeepLink::from_query(query).is_none());
    }

    #[test]
    fn test_history_back_and_forward() {
        let mut history = NavigationHistory::new();
        history.push(link("A", 1.0, 1.0));
        history.push(link("B", 2.0, 2.0));
        history.push(link("B", 2.0, 2.0));
        history.push(link("C", 3.0, 3.0));
        assert_eq!(history.len(), 3);

        assert_eq!(history.back().unwrap().city, "B");
        assert_eq!(history.back().unwrap().city, "A");
        assert!(history.back().is_none());
        assert_eq!(history.forward().unwrap().city, "B");

        // a new resolution drops the forward entries
        history.push(link("D", 4.0, 4.0));
        assert!(history.forward().is_none());
        assert_eq!(history.len(), 3);
        assert_eq!(history.current().unwrap().city, "D");
    }
}
