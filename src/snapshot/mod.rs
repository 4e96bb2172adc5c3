//! # Graph Snapshot
//!
//! An immutable, per-query view of the persisted graph. Nodes are loaded
//! (optionally for one floor), every edge whose endpoints both lie in that
//! node set is expanded into both directions, and everything else is left
//! out. Cost is O(V + E) over the filtered subset.
//!
//! Edges pointing at nodes that do not exist at all are excluded and logged;
//! a broken store degrades the graph, it never fails the query.

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::model::*;
use crate::storage::GraphStore;
use crate::Result;

/// Outgoing neighbors of one node: `(neighbor, weight in meters)`.
pub type Adjacency = SmallVec<[(NodeId, f64); 6]>;

/// Weighted undirected graph, built fresh for one query.
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
    nodes: HashMap<NodeId, Node>,
    adjacency: HashMap<NodeId, Adjacency>,
    edge_count: usize,
    floor: Option<FloorId>,
}

/// Load a snapshot from the store, optionally restricted to one floor.
pub async fn build_snapshot<S: GraphStore + ?Sized>(
    store: &S,
    floor: Option<FloorId>,
) -> Result<GraphSnapshot> {
    let nodes = match floor {
        Some(f) => store.list_nodes_by_floor(f).await?,
        None => store.all_nodes().await?,
    };
    let edges = store.all_edges().await?;

    // Only ids that exist anywhere in the store count as "known" when
    // deciding whether an excluded edge is dangling or just out of filter.
    let known: HashSet<NodeId> = match floor {
        Some(_) => store.all_nodes().await?.into_iter().map(|n| n.id).collect(),
        None => nodes.iter().map(|n| n.id).collect(),
    };

    let snapshot = GraphSnapshot::from_parts(nodes, edges, floor, |id| known.contains(&id));
    debug!(
        floor = ?floor,
        nodes = snapshot.node_count(),
        edges = snapshot.edge_count(),
        "graph snapshot built"
    );
    Ok(snapshot)
}

impl GraphSnapshot {
    /// Assemble a snapshot from already-loaded rows.
    ///
    /// `exists` reports whether a node id exists in the backing store at all;
    /// edges excluded because an endpoint fails it are logged as dangling.
    pub fn from_parts(
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        floor: Option<FloorId>,
        exists: impl Fn(NodeId) -> bool,
    ) -> Self {
        let mut adjacency: HashMap<NodeId, Adjacency> =
            nodes.iter().map(|n| (n.id, Adjacency::new())).collect();
        let nodes: HashMap<NodeId, Node> = nodes.into_iter().map(|n| (n.id, n)).collect();

        let mut edge_count = 0;
        for edge in edges {
            if !(nodes.contains_key(&edge.start) && nodes.contains_key(&edge.end)) {
                for endpoint in [edge.start, edge.end] {
                    if !exists(endpoint) {
                        warn!(
                            edge = %edge.id,
                            node = %endpoint,
                            "edge references a missing node; excluded from snapshot"
                        );
                    }
                }
                continue;
            }

            let weight = edge.distance_meters;
            if let Some(list) = adjacency.get_mut(&edge.start) {
                list.push((edge.end, weight));
            }
            if edge.start != edge.end {
                if let Some(list) = adjacency.get_mut(&edge.end) {
                    list.push((edge.start, weight));
                }
            }
            edge_count += 1;
        }

        // Fixed expansion order for deterministic tie-breaking
        for list in adjacency.values_mut() {
            list.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
        }

        Self { nodes, adjacency, edge_count, floor }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Neighbors of `id` in ascending id order. Empty for unknown ids.
    pub fn neighbors(&self, id: NodeId) -> &[(NodeId, f64)] {
        self.adjacency.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Weight of the cheapest direct connection between `a` and `b`.
    pub fn weight(&self, a: NodeId, b: NodeId) -> Option<f64> {
        self.neighbors(a)
            .iter()
            .filter(|(n, _)| *n == b)
            .map(|(_, w)| *w)
            .min_by(f64::total_cmp)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges included.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn floor(&self) -> Option<FloorId> {
        self.floor
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
