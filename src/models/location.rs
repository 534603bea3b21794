//! Location model for geographic coordinates and display name

use serde::{Deserialize, Serialize};

use crate::{BreezeError, Result};

/// Decimal places used when a location is persisted or shared
pub const CANONICAL_PRECISION: u32 = 4;

/// A resolved place. Replaced wholesale on every lookup, never mutated.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Human-readable name, e.g. "Paris, Ile-de-France, France"
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }

    /// Create a location after checking the coordinate ranges
    pub fn try_new(name: impl Into<String>, latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(BreezeError::unsupported(format!(
                "Latitude must be between -90 and 90, got: {latitude}"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(BreezeError::unsupported(format!(
                "Longitude must be between -180 and 180, got: {longitude}"
            )));
        }
        Ok(Self::new(name, latitude, longitude))
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Round coordinates to the given number of decimal places
    #[must_use]
    pub fn rounded_coordinates(&self, precision: u32) -> (f64, f64) {
        let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(4));
        let lat = (self.latitude * multiplier).round() / multiplier;
        let lon = (self.longitude * multiplier).round() / multiplier;
        (lat, lon)
    }

    /// The same place with coordinates cut to the canonical precision
    #[must_use]
    pub fn canonical(&self) -> Self {
        let (latitude, longitude) = self.rounded_coordinates(CANONICAL_PRECISION);
        Self {
            name: self.name.clone(),
            latitude,
            longitude,
        }
    }
}
