//! Undirected, weighted edge between two nodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::NodeId;

/// Opaque edge identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How an edge came to exist.
///
/// Re-indexing a floor only ever rewrites `Synthesized` edges; `Manual`
/// wiring survives it untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeOrigin {
    /// Created by proximity synthesis.
    #[default]
    Synthesized,
    /// Wired by hand, e.g. a staircase between floors.
    Manual,
}

/// An edge connecting `{start, end}`.
///
/// Stored canonically with `start < end`; the orientation carries no meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub start: NodeId,
    pub end: NodeId,
    pub distance_meters: f64,
    #[serde(default)]
    pub origin: EdgeOrigin,
    pub created_at: DateTime<Utc>,
}

impl Edge {
    /// Build an edge in canonical (low id → high id) orientation.
    pub fn new(id: EdgeId, a: NodeId, b: NodeId, distance_meters: f64) -> Self {
        let (start, end) = Self::canonical(a, b);
        Self {
            id,
            start,
            end,
            distance_meters,
            origin: EdgeOrigin::Synthesized,
            created_at: Utc::now(),
        }
    }

    pub fn with_origin(mut self, origin: EdgeOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn is_manual(&self) -> bool {
        self.origin == EdgeOrigin::Manual
    }

    /// Order a pair so that the lower id comes first.
    pub fn canonical(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
        if a <= b { (a, b) } else { (b, a) }
    }

    /// The "other" end of the edge from the given node.
    pub fn other_node(&self, from: NodeId) -> Option<NodeId> {
        if from == self.start { Some(self.end) }
        else if from == self.end { Some(self.start) }
        else { None }
    }

    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        Self::canonical(a, b) == (self.start, self.end)
    }
}
