//! # Graph Store Trait
//!
//! The contract between the indexer/query side and whatever persists nodes
//! and edges. Ports are deliberately narrow so a fake can stand in for the
//! real persistence layer in tests.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | In-memory reference implementation |

pub mod memory;

use async_trait::async_trait;
use crate::model::*;
use crate::Result;

pub use memory::MemoryStore;

/// Changes applied by [`GraphStore::replace_synthesized_edges`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeSetDiff {
    pub created: usize,
    /// Existing synthesized edges whose distance changed.
    pub updated: usize,
    pub removed: usize,
}

// ============================================================================
// GraphStore Trait
// ============================================================================

/// Persistence ports used by the indexer, the snapshot builder and the
/// pathfinding service.
///
/// Edges are undirected: implementations store one record per unordered pair
/// and must answer `edge_exists_between` for either orientation.
#[async_trait]
pub trait GraphStore: Send + Sync + 'static {
    // ========================================================================
    // Nodes
    // ========================================================================

    /// Create or update the node owned by `room`, keyed by room id.
    ///
    /// Returns the stored node and `true` if it was newly created. An update
    /// rewrites floor, kind and position but never the node id or
    /// `indexed_at`.
    async fn upsert_room_node(
        &self,
        room: RoomId,
        floor: FloorId,
        position: Position,
    ) -> Result<(Node, bool)>;

    /// Create a node that does not belong to a room (hallway, stairs, elevator).
    async fn create_node(&self, floor: FloorId, kind: NodeKind, position: Position) -> Result<Node>;

    /// Get a node by id. Returns None if not found.
    async fn get_node(&self, id: NodeId) -> Result<Option<Node>>;

    /// The node mapped to a room, if the room was ever registered.
    async fn node_for_room(&self, room: RoomId) -> Result<Option<Node>>;

    /// Delete a node and every edge touching it. Returns true if it existed.
    async fn delete_node(&self, id: NodeId) -> Result<bool>;

    /// All nodes on one floor.
    async fn list_nodes_by_floor(&self, floor: FloorId) -> Result<Vec<Node>>;

    /// Every node in the building.
    async fn all_nodes(&self) -> Result<Vec<Node>>;

    // ========================================================================
    // Edges
    // ========================================================================

    /// Whether an edge connects `a` and `b`, in either orientation.
    async fn edge_exists_between(&self, a: NodeId, b: NodeId) -> Result<bool>;

    /// Insert an edge between `a` and `b`.
    ///
    /// Fails with `ConstraintViolation` if the pair is already connected and
    /// with `NotFound` if either endpoint is missing.
    async fn insert_edge(
        &self,
        a: NodeId,
        b: NodeId,
        distance_meters: f64,
        origin: EdgeOrigin,
    ) -> Result<Edge>;

    /// Make `wanted` the synthesized edge set among the nodes of `floor`, as
    /// one change visible to readers all at once. Entries are
    /// `(a, b, distance_meters)`.
    ///
    /// Synthesized edges inside the floor with no entry in `wanted` are
    /// deleted. A wanted pair already joined by a synthesized edge gets its
    /// distance refreshed; one joined by a manual edge is left alone. Every
    /// other wanted pair is inserted as `Synthesized`. Edges leaving the
    /// floor are never touched.
    ///
    /// Fails with `NotFound` if an endpoint is missing and `InvalidInput` if
    /// one is on another floor or a pair is a self-loop. On failure nothing
    /// is changed.
    async fn replace_synthesized_edges(
        &self,
        floor: FloorId,
        wanted: Vec<(NodeId, NodeId, f64)>,
    ) -> Result<EdgeSetDiff>;

    /// Delete an edge. Returns true if it existed.
    async fn delete_edge(&self, id: EdgeId) -> Result<bool>;

    /// Every edge in the building.
    async fn all_edges(&self) -> Result<Vec<Edge>>;

    // ========================================================================
    // Introspection
    // ========================================================================

    async fn node_count(&self) -> Result<u64> {
        Ok(self.all_nodes().await?.len() as u64)
    }

    async fn edge_count(&self) -> Result<u64> {
        Ok(self.all_edges().await?.len() as u64)
    }

    /// Edges touching a node.
    ///
    /// Default: scans all edges.
    async fn edges_of(&self, node: NodeId) -> Result<Vec<Edge>> {
        Ok(self
            .all_edges()
            .await?
            .into_iter()
            .filter(|e| e.other_node(node).is_some())
            .collect())
    }
}
