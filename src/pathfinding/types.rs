//! Search parameters and results.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::SearchLimits;
use crate::model::{NodeId, Position};

/// Caller-driven cancellation for an in-flight search.
///
/// Clones share the same flag; cancelling any clone stops every search
/// holding it at its next expansion.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Bounds for a single search.
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Maximum nodes to settle before giving up (default: 100000).
    pub max_expansions: usize,
    /// Wall-clock budget, measured from the start of the search.
    pub timeout: Option<Duration>,
    pub cancel: Option<CancelToken>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self::from(SearchLimits::default())
    }
}

impl From<SearchLimits> for SearchParams {
    fn from(limits: SearchLimits) -> Self {
        Self {
            max_expansions: limits.max_expansions,
            timeout: limits.timeout(),
            cancel: None,
        }
    }
}

impl SearchParams {
    /// Builder: set maximum nodes to settle.
    #[must_use]
    pub fn max_expansions(mut self, max: usize) -> Self {
        self.max_expansions = max;
        self
    }

    /// Builder: set the wall-clock budget.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builder: run without a deadline.
    #[must_use]
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Builder: attach a cancellation token.
    #[must_use]
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// A shortest path from start to end, both inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPath {
    pub nodes: Vec<NodeId>,
    /// Position of each entry in `nodes`.
    pub positions: Vec<Position>,
    /// Sum of edge distances along the path.
    pub cost_meters: f64,
    /// Nodes settled before the target was reached.
    pub nodes_expanded: usize,
}

impl ShortestPath {
    pub fn start(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn end(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Number of hops.
    pub fn edge_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// `[[lat, lng], ...]`, the graph-wide output shape.
    pub fn lat_lng_pairs(&self) -> Vec<[f64; 2]> {
        self.positions.iter().map(Position::lat_lng).collect()
    }

    /// The path as a line geometry in (longitude, latitude) order.
    pub fn line_string(&self) -> LineString {
        let mut coordinates: Vec<[f64; 2]> = self.positions.iter().map(Position::lng_lat).collect();
        // A line needs two positions; a zero-length trip repeats its point.
        if coordinates.len() == 1 {
            coordinates.push(coordinates[0]);
        }
        LineString::new(coordinates)
    }
}

/// GeoJSON-style line geometry: `{"type": "LineString", "coordinates": [[lng, lat], ...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    #[serde(rename = "type")]
    pub kind: LineStringTag,
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStringTag {
    LineString,
}

impl LineString {
    pub fn new(coordinates: Vec<[f64; 2]>) -> Self {
        Self { kind: LineStringTag::LineString, coordinates }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> ShortestPath {
        ShortestPath {
            nodes: vec![NodeId(1), NodeId(2)],
            positions: vec![Position::new(36.1, -1.2), Position::new(36.2, -1.3)],
            cost_meters: 10.0,
            nodes_expanded: 2,
        }
    }

    #[test]
    fn test_lat_lng_pairs_order() {
        assert_eq!(path().lat_lng_pairs(), vec![[-1.2, 36.1], [-1.3, 36.2]]);
    }

    #[test]
    fn test_line_string_uses_lng_lat() {
        let json = serde_json::to_value(path().line_string()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "LineString", "coordinates": [[36.1, -1.2], [36.2, -1.3]]})
        );
    }

    #[test]
    fn test_single_point_line_repeats_position() {
        let p = ShortestPath {
            nodes: vec![NodeId(1)],
            positions: vec![Position::new(1.0, 2.0)],
            cost_meters: 0.0,
            nodes_expanded: 0,
        };
        assert_eq!(p.line_string().coordinates, vec![[1.0, 2.0], [1.0, 2.0]]);
        assert_eq!(p.edge_count(), 0);
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_params_from_limits() {
        let params = SearchParams::from(SearchLimits { max_expansions: 7, timeout_ms: None });
        assert_eq!(params.max_expansions, 7);
        assert!(params.timeout.is_none());
        assert!(params.cancel.is_none());
    }
}
