//! Data models for Breeze
//!
//! This module contains the core domain models organized by concern:
//! - Location: display name and coordinates
//! - Reading: one metric value, possibly unavailable
//! - Pollen: normalized pollen entries from either provider
//! - Climate: same-day temperature samples across decades

pub mod climate;
pub mod location;
pub mod pollen;
pub mod reading;

// Re-export all public types for convenient access
pub use climate::{ClimateSample, ClimateSeries, TemperatureUnit, WarmingTrend};
pub use location::Location;
pub use pollen::{
    PlantFacts, PollenCategory, PollenEntry, PollenEntryKind, PollenExtendedInfo, PollenReport,
    PollenSource,
};
pub use reading::{MetricId, Reading};
