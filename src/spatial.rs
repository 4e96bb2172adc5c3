//! Planar distance in coordinate space.
//!
//! Deliberately not geodesic: the same function drives the indexing
//! threshold and every reported cost, so thresholds and distances agree.
//! The conversion factor is an equirectangular approximation that only holds
//! near the reference latitude it was derived for.

use crate::model::Position;

/// Auto-connect threshold, in native coordinate units (≈ 11 m near the equator).
pub const DEFAULT_THRESHOLD_DEGREES: f64 = 0.0001;

/// Meters per degree used to convert planar distances.
pub const DEFAULT_METERS_PER_DEGREE: f64 = 111_000.0;

/// Distance function and conversion shared by the indexer and the search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialDistanceCalculator {
    meters_per_degree: f64,
}

impl Default for SpatialDistanceCalculator {
    fn default() -> Self {
        Self { meters_per_degree: DEFAULT_METERS_PER_DEGREE }
    }
}

impl SpatialDistanceCalculator {
    pub fn new(meters_per_degree: f64) -> Self {
        Self { meters_per_degree }
    }

    /// Euclidean distance between two (longitude, latitude) points.
    pub fn planar_distance(&self, a: &Position, b: &Position) -> f64 {
        (a.longitude - b.longitude).hypot(a.latitude - b.latitude)
    }

    pub fn to_meters(&self, d: f64) -> f64 {
        d * self.meters_per_degree
    }

    /// `to_meters(planar_distance(a, b))`.
    pub fn meters_between(&self, a: &Position, b: &Position) -> f64 {
        self.to_meters(self.planar_distance(a, b))
    }

    pub fn meters_per_degree(&self) -> f64 {
        self.meters_per_degree
    }
}
