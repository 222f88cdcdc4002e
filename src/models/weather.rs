//! Weather reading model and display methods

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current temperature, or a sentinel when the service returned no reading.
///
/// Distinguishes "no reading available" from an actual 0°C measurement.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum Temperature {
    /// Measured temperature in degrees Celsius
    Celsius(f64),
    /// Service returned no usable temperature
    Unavailable,
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Truncated toward zero, matching the user-facing sentence format
            Temperature::Celsius(value) => write!(f, "{}", value.trunc() as i64),
            Temperature::Unavailable => write!(f, "N/A"),
        }
    }
}

/// One current-conditions reading, built fresh per request
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherReading {
    /// Current temperature
    pub temperature: Temperature,
    /// Precipitation probability in percent, 0 when absent upstream
    pub precipitation_chance: i64,
    /// Upstream observation timestamp, when the service provided one
    pub observed_at: Option<DateTime<Utc>>,
}

impl WeatherReading {
    /// Create a reading without an observation timestamp
    #[must_use]
    pub fn new(temperature: Temperature, precipitation_chance: i64) -> Self {
        Self {
            temperature,
            precipitation_chance,
            observed_at: None,
        }
    }
}
