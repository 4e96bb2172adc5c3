//! # Graph Indexer
//!
//! Keeps the node/edge store in step with room registrations.
//!
//! A new node is connected to every node on its floor lying closer than the
//! threshold (planar distance, native coordinate units). Edges are computed
//! once, when the node is created; later moves or deletions never trigger a
//! recomputation. [`GraphIndexer::reindex_floor`] is the explicit repair
//! path.
//!
//! ## Concurrency
//!
//! The "edge exists?" check and the insert are two store calls. Every public
//! write below takes the floor's lock, so two nodes created at once on the
//! same floor always see each other; different floors proceed in parallel.

use std::sync::Arc;

use hashbrown::HashMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::NavConfig;
use crate::model::*;
use crate::spatial::SpatialDistanceCalculator;
use crate::storage::GraphStore;
use crate::{Error, Result};

/// What a registration did to the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexOutcome {
    pub node: Node,
    /// `false` when an existing node was updated in place.
    pub created: bool,
    /// Edges synthesized for a newly created node. Always empty on update.
    pub edges: Vec<Edge>,
}

/// Summary of a [`GraphIndexer::reindex_floor`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReindexReport {
    pub floor: Option<FloorId>,
    pub nodes: usize,
    pub edges_created: usize,
    /// Synthesized edges kept but re-measured after a node moved.
    pub edges_updated: usize,
    pub edges_removed: usize,
}

/// Synthesizes proximity edges as nodes are registered.
pub struct GraphIndexer<S: GraphStore> {
    store: Arc<S>,
    calc: SpatialDistanceCalculator,
    threshold: f64,
    floor_locks: parking_lot::Mutex<HashMap<FloorId, Arc<tokio::sync::Mutex<()>>>>,
}

impl<S: GraphStore> GraphIndexer<S> {
    pub fn new(store: Arc<S>, config: &NavConfig) -> Self {
        Self {
            store,
            calc: SpatialDistanceCalculator::new(config.meters_per_degree),
            threshold: config.threshold_degrees,
            floor_locks: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn calculator(&self) -> &SpatialDistanceCalculator {
        &self.calc
    }

    fn floor_lock(&self, floor: FloorId) -> Arc<tokio::sync::Mutex<()>> {
        self.floor_locks.lock().entry(floor).or_default().clone()
    }

    // ========================================================================
    // Room registration
    // ========================================================================

    /// Upsert the room's node and, if it is new, synthesize its edges.
    ///
    /// Does not return until indexing has finished; any store failure along
    /// the way is returned to the caller.
    pub async fn register_room(&self, room: &Room) -> Result<IndexOutcome> {
        let floor = require_floor(room)?;
        let lock = self.floor_lock(floor);
        let _guard = lock.lock().await;

        let (node, created) = self.upsert_unlocked(room, floor).await?;
        let edges = if created {
            self.synthesize_edges(&node).await?
        } else {
            Vec::new()
        };

        info!(
            room = %room.id,
            node = %node.id,
            floor = %floor,
            created,
            edges = edges.len(),
            "room indexed"
        );
        Ok(IndexOutcome { node, created, edges })
    }

    /// Create or update the node keyed by `room.id`, without synthesizing
    /// edges. Idempotent.
    pub async fn upsert_node_for_room(&self, room: &Room) -> Result<(Node, bool)> {
        let floor = require_floor(room)?;
        let lock = self.floor_lock(floor);
        let _guard = lock.lock().await;
        self.upsert_unlocked(room, floor).await
    }

    /// Connect a freshly created node to every same-floor node within the
    /// threshold that it is not already connected to.
    pub async fn on_node_created(&self, node: &Node) -> Result<Vec<Edge>> {
        let lock = self.floor_lock(node.floor);
        let _guard = lock.lock().await;
        self.synthesize_edges(node).await
    }

    async fn upsert_unlocked(&self, room: &Room, floor: FloorId) -> Result<(Node, bool)> {
        require_finite(&room.position)?;
        self.store.upsert_room_node(room.id, floor, room.position).await
    }

    /// Caller holds the lock of `node.floor`.
    async fn synthesize_edges(&self, node: &Node) -> Result<Vec<Edge>> {
        let mut candidates = self.store.list_nodes_by_floor(node.floor).await?;
        candidates.retain(|c| c.id != node.id);
        candidates.sort_by_key(|c| c.id);

        let mut created = Vec::new();
        for other in &candidates {
            let d = self.calc.planar_distance(&node.position, &other.position);
            if d >= self.threshold {
                continue;
            }
            if self.store.edge_exists_between(node.id, other.id).await? {
                continue;
            }

            let meters = self.calc.to_meters(d);
            match self.store.insert_edge(node.id, other.id, meters, EdgeOrigin::Synthesized).await {
                Ok(edge) => {
                    debug!(
                        edge = %edge.id,
                        from = %node.id,
                        to = %other.id,
                        meters = edge.distance_meters,
                        "edge synthesized"
                    );
                    created.push(edge);
                }
                // Wired manually in the meantime
                Err(Error::ConstraintViolation(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(created)
    }

    // ========================================================================
    // Building-data operations
    // ========================================================================

    /// Create a hallway, stairs or elevator node and connect it to its floor.
    pub async fn add_circulation_node(
        &self,
        floor: FloorId,
        kind: NodeKind,
        position: Position,
    ) -> Result<IndexOutcome> {
        if kind == NodeKind::Room {
            return Err(Error::InvalidInput(
                "room nodes are created by registering the room".into(),
            ));
        }
        require_finite(&position)?;

        let lock = self.floor_lock(floor);
        let _guard = lock.lock().await;

        let node = self.store.create_node(floor, kind, position).await?;
        let edges = self.synthesize_edges(&node).await?;
        info!(node = %node.id, floor = %floor, kind = %kind, edges = edges.len(), "circulation node added");
        Ok(IndexOutcome { node, created: true, edges })
    }

    /// Remove a room's node together with every edge touching it.
    pub async fn remove_room(&self, room: RoomId) -> Result<Node> {
        let node = self
            .store
            .node_for_room(room)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Room {room} has no graph node")))?;

        let lock = self.floor_lock(node.floor);
        let _guard = lock.lock().await;

        self.store.delete_node(node.id).await?;
        info!(room = %room, node = %node.id, floor = %node.floor, "room removed from graph");
        Ok(node)
    }

    /// Wire two nodes by hand, e.g. stairs or elevator landings on
    /// different floors. Distance defaults to the planar distance in meters.
    ///
    /// Manual edges are never rewritten by [`Self::reindex_floor`].
    pub async fn connect_nodes(
        &self,
        a: NodeId,
        b: NodeId,
        distance_meters: Option<f64>,
    ) -> Result<Edge> {
        if a == b {
            return Err(Error::InvalidInput(format!("cannot connect node {a} to itself")));
        }
        let na = self.require_node(a).await?;
        let nb = self.require_node(b).await?;

        let distance = match distance_meters {
            Some(d) if d.is_finite() && d >= 0.0 => d,
            Some(d) => {
                return Err(Error::InvalidInput(format!("edge distance must be finite and >= 0, got {d}")));
            }
            None => self.calc.meters_between(&na.position, &nb.position),
        };

        let edge = self.store.insert_edge(a, b, distance, EdgeOrigin::Manual).await?;
        info!(edge = %edge.id, from = %a, to = %b, meters = distance, "nodes connected manually");
        Ok(edge)
    }

    /// Recompute the synthesized edges of `floor` from the current node
    /// positions and swap them in as one store change.
    ///
    /// Manual edges and edges leaving the floor are kept. Readers see either
    /// the old edge set or the new one; if the store rejects the change the
    /// floor keeps its old edges.
    pub async fn reindex_floor(&self, floor: FloorId) -> Result<ReindexReport> {
        let lock = self.floor_lock(floor);
        let _guard = lock.lock().await;

        let mut nodes = self.store.list_nodes_by_floor(floor).await?;
        nodes.sort_by_key(|n| n.id);

        let mut wanted = Vec::new();
        for (i, a) in nodes.iter().enumerate() {
            for b in &nodes[i + 1..] {
                let d = self.calc.planar_distance(&a.position, &b.position);
                if d < self.threshold {
                    wanted.push((a.id, b.id, self.calc.to_meters(d)));
                }
            }
        }

        let diff = self.store.replace_synthesized_edges(floor, wanted).await?;
        let report = ReindexReport {
            floor: Some(floor),
            nodes: nodes.len(),
            edges_created: diff.created,
            edges_updated: diff.updated,
            edges_removed: diff.removed,
        };

        info!(
            floor = %floor,
            nodes = report.nodes,
            created = report.edges_created,
            updated = report.edges_updated,
            removed = report.edges_removed,
            "floor reindexed"
        );
        Ok(report)
    }

    async fn require_node(&self, id: NodeId) -> Result<Node> {
        self.store
            .get_node(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Node {id}")))
    }
}

fn require_floor(room: &Room) -> Result<FloorId> {
    room.floor
        .ok_or_else(|| Error::InvalidInput(format!("room {} has no floor", room.id)))
}

fn require_finite(position: &Position) -> Result<()> {
    if position.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("position {position} is not finite")))
    }
}

// ============================================================================
// Tests
// ============================================================================
