//! Planar (longitude, latitude) position.

use serde::{Deserialize, Serialize};

/// A point in the campus coordinate space.
///
/// Stored in (longitude, latitude) order, the same axis order as the
/// line geometries handed out by room-to-room search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub longitude: f64,
    pub latitude: f64,
}

impl Position {
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }

    /// `[latitude, longitude]`, the order used by graph-wide paths.
    pub fn lat_lng(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }

    /// `[longitude, latitude]`, the order used by line geometries.
    pub fn lng_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    pub fn is_finite(&self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.longitude, self.latitude)
    }
}
