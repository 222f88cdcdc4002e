//! Data models for the TripScout application

pub mod location;
pub mod weather;

pub use location::Coordinates;
pub use weather::{Temperature, WeatherReading};
