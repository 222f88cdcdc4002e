//! `TripScout` - Natural-language travel assistant
//!
//! This library answers free-text travel queries by extracting a place
//! name and intent, resolving the place to coordinates, and querying
//! weather and points-of-interest services concurrently.

pub mod attractions;
pub mod config;
pub mod error;
pub mod geocode;
pub mod models;
pub mod planner;
pub mod query;
pub mod weather;

// Re-export core types for public API
pub use attractions::{AttractionService, OverpassClient, PoiElement, PoiProvider};
pub use config::TripScoutConfig;
pub use error::TripScoutError;
pub use geocode::{
    CoordinateCache, CoordinateResolver, GeocodeHit, GeocodingProvider, NominatimClient,
};
pub use models::{Coordinates, Temperature, WeatherReading};
pub use planner::TripPlanner;
pub use query::{Intent, classify_intent, extract_place};
pub use weather::{OpenMeteoClient, WeatherProvider, WeatherService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripScoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
