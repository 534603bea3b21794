//! Breeze - air quality, pollen and climate at a glance
//!
//! This library resolves a location, fetches current air quality, pollen and
//! same-day historical temperatures from public APIs, and classifies every
//! reading into display-ready categories with health guidance.

pub mod api;
pub mod classification;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod preferences;
pub mod providers;
pub mod resolution;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use classification::{Classification, classify, fill_ratio};
pub use config::BreezeConfig;
pub use dashboard::{Action, AppState, Dashboard, DashboardView, Report};
pub use error::BreezeError;
pub use models::{ClimateSample, ClimateSeries, Location, MetricId, PollenEntry, Reading};
pub use preferences::PreferenceStore;
pub use providers::{CurrentConditions, HttpResponse, ReqwestTransport, Suggestion, Transport};
pub use resolution::{DeepLink, LocationRequest, LocationResolver, ResolutionState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, BreezeError>;
