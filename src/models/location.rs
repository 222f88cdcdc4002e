//! Location model for geographic coordinates

use serde::{Deserialize, Serialize};

/// Geographic coordinates
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    /// Create a new coordinate pair
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are within valid degree ranges
    #[must_use]
    pub fn is_in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Format coordinates as a display string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_format() {
        let coords = Coordinates::new(46.8182, 8.2275);
        assert_eq!(coords.format_coordinates(), "46.8182, 8.2275");
    }

    #[test]
    fn test_coordinates_range_check() {
        assert!(Coordinates::new(48.8566, 2.3522).is_in_range());
        assert!(!Coordinates::new(91.0, 0.5).is_in_range());
        assert!(!Coordinates::new(12.9716, -200.0).is_in_range());
    }
}
