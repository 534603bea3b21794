//! Curated world cities shown in the ticker

use serde::Serialize;

use crate::classification::aqi::TickerBucket;
use crate::models::Location;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct City {
    pub name: &'static str,
    pub country: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

impl City {
    const fn new(name: &'static str, country: &'static str, latitude: f64, longitude: f64) -> Self {
        Self {
            name,
            country,
            latitude,
            longitude,
        }
    }

    /// `"<name>, <country>"` at the city's coordinates
    #[must_use]
    pub fn location(&self) -> Location {
        Location::new(
            format!("{}, {}", self.name, self.country),
            self.latitude,
            self.longitude,
        )
    }
}

pub const CURATED_CITIES: [City; 25] = [
    City::new("New York", "USA", 40.7128, -74.0060),
    City::new("Los Angeles", "USA", 34.0522, -118.2437),
    City::new("Chicago", "USA", 41.8781, -87.6298),
    City::new("London", "UK", 51.5074, -0.1278),
    City::new("Paris", "France", 48.8566, 2.3522),
    City::new("Tokyo", "Japan", 35.6762, 139.6503),
    City::new("Berlin", "Germany", 52.5200, 13.4050),
    City::new("Toronto", "Canada", 43.6532, -79.3832),
    City::new("Sydney", "Australia", -33.8688, 151.2093),
    City::new("Dubai", "UAE", 25.2048, 55.2708),
    City::new("Singapore", "Singapore", 1.3521, 103.8198),
    City::new("São Paulo", "Brazil", -23.5505, -46.6333),
    City::new("Mexico City", "Mexico", 19.4326, -99.1332),
    City::new("Madrid", "Spain", 40.4168, -3.7038),
    City::new("Rome", "Italy", 41.9028, 12.4964),
    City::new("Amsterdam", "Netherlands", 52.3676, 4.9041),
    City::new("Seoul", "South Korea", 37.5665, 126.9780),
    City::new("Mumbai", "India", 19.0760, 72.8777),
    City::new("Shanghai", "China", 31.2304, 121.4737),
    City::new("Istanbul", "Turkey", 41.0082, 28.9784),
    City::new("Moscow", "Russia", 55.7558, 37.6173),
    City::new("Cairo", "Egypt", 30.0444, 31.2357),
    City::new("Buenos Aires", "Argentina", -34.6037, -58.3816),
    City::new("Lagos", "Nigeria", 6.5244, 3.3792),
    City::new("Bangkok", "Thailand", 13.7563, 100.5018),
];

/// Find a curated city by name, ignoring case
#[must_use]
pub fn find_city(name: &str) -> Option<&'static City> {
    let name = name.trim();
    CURATED_CITIES
        .iter()
        .find(|city| city.name.eq_ignore_ascii_case(name))
}

/// A ticker item: a city and its current AQI, if the provider had one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitySnapshot {
    pub city: City,
    pub aqi: Option<f64>,
    pub bucket: TickerBucket,
}

impl CitySnapshot {
    #[must_use]
    pub fn new(city: City, aqi: Option<f64>) -> Self {
        Self {
            city,
            aqi,
            bucket: TickerBucket::from_aqi(aqi),
        }
    }

    /// Rounded AQI or `--`
    #[must_use]
    pub fn display_aqi(&self) -> String {
        match self.aqi {
            Some(aqi) => format!("{}", aqi.round() as i64),
            None => "--".to_string(),
        }
    }
}
