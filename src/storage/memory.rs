//! In-memory graph store.
//!
//! This is the reference implementation of `GraphStore`. It uses plain
//! HashMaps protected by RwLock.
//!
//! ## Limitations
//!
//! - **No durability**: everything lives in process memory.
//! - **Per-collection locks**: each port is atomic on its own, but a
//!   check-then-insert spanning two calls is not. The indexer serializes
//!   per floor to cover that gap.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use parking_lot::RwLock;
use async_trait::async_trait;

use crate::model::*;
use crate::{Error, Result};
use super::{EdgeSetDiff, GraphStore};

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory node/edge storage.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    nodes: RwLock<HashMap<NodeId, Node>>,
    edges: RwLock<HashMap<EdgeId, Edge>>,
    /// canonical (low, high) pair → edge id
    pair_index: RwLock<HashMap<(NodeId, NodeId), EdgeId>>,
    /// node id → ids of edges touching it
    adjacency: RwLock<HashMap<NodeId, Vec<EdgeId>>>,
    /// room id → node id (at most one node per room)
    room_index: RwLock<HashMap<RoomId, NodeId>>,
    next_node_id: AtomicU64,
    next_edge_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                nodes: RwLock::new(HashMap::new()),
                edges: RwLock::new(HashMap::new()),
                pair_index: RwLock::new(HashMap::new()),
                adjacency: RwLock::new(HashMap::new()),
                room_index: RwLock::new(HashMap::new()),
                next_node_id: AtomicU64::new(1),
                next_edge_id: AtomicU64::new(1),
            }),
        }
    }

    fn alloc_node_id(&self) -> NodeId {
        NodeId(self.inner.next_node_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// GraphStore impl
// ============================================================================

#[async_trait]
impl GraphStore for MemoryStore {
    // ========================================================================
    // Nodes
    // ========================================================================

    async fn upsert_room_node(
        &self,
        room: RoomId,
        floor: FloorId,
        position: Position,
    ) -> Result<(Node, bool)> {
        // Hold the room index for the whole upsert so two registrations of
        // the same room cannot both create a node.
        let mut rooms = self.inner.room_index.write();

        if let Some(&id) = rooms.get(&room) {
            let mut nodes = self.inner.nodes.write();
            let node = nodes
                .get_mut(&id)
                .ok_or_else(|| Error::StorageError(format!("room {room} maps to missing node {id}")))?;
            node.floor = floor;
            node.position = position;
            node.kind = NodeKind::Room;
            return Ok((node.clone(), false));
        }

        let id = self.alloc_node_id();
        let node = Node::new(id, floor, NodeKind::Room, position).with_room(room);
        rooms.insert(room, id);
        self.inner.nodes.write().insert(id, node.clone());
        self.inner.adjacency.write().insert(id, Vec::new());
        Ok((node, true))
    }

    async fn create_node(&self, floor: FloorId, kind: NodeKind, position: Position) -> Result<Node> {
        let id = self.alloc_node_id();
        let node = Node::new(id, floor, kind, position);
        self.inner.nodes.write().insert(id, node.clone());
        self.inner.adjacency.write().insert(id, Vec::new());
        Ok(node)
    }

    async fn get_node(&self, id: NodeId) -> Result<Option<Node>> {
        Ok(self.inner.nodes.read().get(&id).cloned())
    }

    async fn node_for_room(&self, room: RoomId) -> Result<Option<Node>> {
        let rooms = self.inner.room_index.read();
        let nodes = self.inner.nodes.read();
        Ok(rooms.get(&room).and_then(|id| nodes.get(id)).cloned())
    }

    async fn delete_node(&self, id: NodeId) -> Result<bool> {
        let removed = self.inner.nodes.write().remove(&id);
        let Some(node) = removed else {
            return Ok(false);
        };

        if let Some(room) = node.room {
            self.inner.room_index.write().remove(&room);
        }

        // Cascade: drop every edge touching the node
        let edge_ids = self.inner.adjacency.write().remove(&id).unwrap_or_default();
        let mut edges = self.inner.edges.write();
        let mut pairs = self.inner.pair_index.write();
        let mut adj = self.inner.adjacency.write();
        for eid in edge_ids {
            if let Some(edge) = edges.remove(&eid) {
                pairs.remove(&(edge.start, edge.end));
                if let Some(other) = edge.other_node(id) {
                    if let Some(list) = adj.get_mut(&other) {
                        list.retain(|e| *e != eid);
                    }
                }
            }
        }

        Ok(true)
    }

    async fn list_nodes_by_floor(&self, floor: FloorId) -> Result<Vec<Node>> {
        Ok(self
            .inner
            .nodes
            .read()
            .values()
            .filter(|n| n.floor == floor)
            .cloned()
            .collect())
    }

    async fn all_nodes(&self) -> Result<Vec<Node>> {
        Ok(self.inner.nodes.read().values().cloned().collect())
    }

    // ========================================================================
    // Edges
    // ========================================================================

    async fn edge_exists_between(&self, a: NodeId, b: NodeId) -> Result<bool> {
        Ok(self.inner.pair_index.read().contains_key(&Edge::canonical(a, b)))
    }

    async fn insert_edge(
        &self,
        a: NodeId,
        b: NodeId,
        distance_meters: f64,
        origin: EdgeOrigin,
    ) -> Result<Edge> {
        // Verify both nodes exist. The read guard is held until the edge is
        // linked so a concurrent delete_node cannot strand it.
        let nodes = self.inner.nodes.read();
        if !nodes.contains_key(&a) {
            return Err(Error::NotFound(format!("Node {a}")));
        }
        if !nodes.contains_key(&b) {
            return Err(Error::NotFound(format!("Node {b}")));
        }

        // Lock order: nodes → edges → pair_index → adjacency
        let key = Edge::canonical(a, b);
        let mut edges = self.inner.edges.write();
        let mut pairs = self.inner.pair_index.write();
        if let Some(existing) = pairs.get(&key) {
            return Err(Error::ConstraintViolation(format!(
                "nodes {} and {} are already connected by edge {existing}",
                key.0, key.1
            )));
        }

        let id = EdgeId(self.inner.next_edge_id.fetch_add(1, Ordering::Relaxed));
        let edge = Edge::new(id, a, b, distance_meters).with_origin(origin);
        pairs.insert(key, id);
        edges.insert(id, edge.clone());

        let mut adj = self.inner.adjacency.write();
        adj.entry(edge.start).or_default().push(id);
        if edge.start != edge.end {
            adj.entry(edge.end).or_default().push(id);
        }
        drop(nodes);

        Ok(edge)
    }

    async fn replace_synthesized_edges(
        &self,
        floor: FloorId,
        wanted: Vec<(NodeId, NodeId, f64)>,
    ) -> Result<EdgeSetDiff> {
        // Validate everything before the first write.
        let nodes = self.inner.nodes.read();
        for &(a, b, _) in &wanted {
            if a == b {
                return Err(Error::InvalidInput(format!("self-loop on node {a}")));
            }
            for id in [a, b] {
                match nodes.get(&id) {
                    None => return Err(Error::NotFound(format!("Node {id}"))),
                    Some(n) if n.floor != floor => {
                        return Err(Error::InvalidInput(format!(
                            "node {id} is on floor {}, not {floor}",
                            n.floor
                        )));
                    }
                    Some(_) => {}
                }
            }
        }

        let wanted: HashMap<(NodeId, NodeId), f64> = wanted
            .into_iter()
            .map(|(a, b, d)| (Edge::canonical(a, b), d))
            .collect();
        let mut wanted: Vec<_> = wanted.into_iter().collect();
        wanted.sort_by_key(|(key, _)| *key);

        // Lock order: nodes → edges → pair_index → adjacency
        let mut edges = self.inner.edges.write();
        let mut pairs = self.inner.pair_index.write();
        let mut adj = self.inner.adjacency.write();
        let mut diff = EdgeSetDiff::default();

        let on_floor = |id: &NodeId| nodes.get(id).is_some_and(|n| n.floor == floor);
        let stale: Vec<EdgeId> = edges
            .values()
            .filter(|e| !e.is_manual() && on_floor(&e.start) && on_floor(&e.end))
            .filter(|e| wanted.binary_search_by_key(&(e.start, e.end), |(key, _)| *key).is_err())
            .map(|e| e.id)
            .collect();
        for id in stale {
            if let Some(edge) = edges.remove(&id) {
                pairs.remove(&(edge.start, edge.end));
                unlink(&mut adj, &edge);
                diff.removed += 1;
            }
        }

        for ((start, end), distance) in wanted {
            if let Some(id) = pairs.get(&(start, end)).copied() {
                if let Some(edge) = edges.get_mut(&id) {
                    if !edge.is_manual() && edge.distance_meters != distance {
                        edge.distance_meters = distance;
                        diff.updated += 1;
                    }
                }
                continue;
            }

            let id = EdgeId(self.inner.next_edge_id.fetch_add(1, Ordering::Relaxed));
            let edge = Edge::new(id, start, end, distance);
            pairs.insert((start, end), id);
            adj.entry(start).or_default().push(id);
            adj.entry(end).or_default().push(id);
            edges.insert(id, edge);
            diff.created += 1;
        }
        drop(nodes);

        Ok(diff)
    }

    async fn delete_edge(&self, id: EdgeId) -> Result<bool> {
        let removed = self.inner.edges.write().remove(&id);
        if let Some(edge) = &removed {
            self.inner.pair_index.write().remove(&(edge.start, edge.end));
            unlink(&mut self.inner.adjacency.write(), edge);
        }
        Ok(removed.is_some())
    }

    async fn all_edges(&self) -> Result<Vec<Edge>> {
        Ok(self.inner.edges.read().values().cloned().collect())
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    async fn node_count(&self) -> Result<u64> {
        Ok(self.inner.nodes.read().len() as u64)
    }

    async fn edge_count(&self) -> Result<u64> {
        Ok(self.inner.edges.read().len() as u64)
    }

    async fn edges_of(&self, node: NodeId) -> Result<Vec<Edge>> {
        let edges = self.inner.edges.read();
        let adj = self.inner.adjacency.read();
        Ok(adj
            .get(&node)
            .map(|ids| ids.iter().filter_map(|id| edges.get(id).cloned()).collect())
            .unwrap_or_default())
    }
}

fn unlink(adj: &mut HashMap<NodeId, Vec<EdgeId>>, edge: &Edge) {
    for endpoint in [edge.start, edge.end] {
        if let Some(list) = adj.get_mut(&endpoint) {
            list.retain(|e| *e != edge.id);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
