//! Structural dump: the graph as plain node and edge rows.
//!
//! Backs the structural-dump query and can be written straight to any
//! `std::io::Write` as JSON:
//!
//! ```text
//! {"nodes": [{"id", "type", "lat", "lng"}], "edges": [{"id", "from", "to", "distance"}]}
//! ```

use std::collections::HashSet;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::model::*;
use crate::storage::GraphStore;
use crate::Result;

/// All nodes (optionally of one floor) and the edges among them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDump {
    pub nodes: Vec<DumpNode>,
    pub edges: Vec<DumpEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpEdge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    /// Meters.
    pub distance: f64,
}

impl From<&Node> for DumpNode {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id,
            kind: node.kind,
            lat: node.position.latitude,
            lng: node.position.longitude,
        }
    }
}

impl From<&Edge> for DumpEdge {
    fn from(edge: &Edge) -> Self {
        Self {
            id: edge.id,
            from: edge.start,
            to: edge.end,
            distance: edge.distance_meters,
        }
    }
}

/// Collect the dump, sorted by id. With a floor, only edges whose both
/// endpoints are on that floor are included.
pub async fn structural_dump<S: GraphStore + ?Sized>(
    store: &S,
    floor: Option<FloorId>,
) -> Result<GraphDump> {
    let mut nodes = match floor {
        Some(f) => store.list_nodes_by_floor(f).await?,
        None => store.all_nodes().await?,
    };
    nodes.sort_by_key(|n| n.id);
    let ids: HashSet<NodeId> = nodes.iter().map(|n| n.id).collect();

    let mut edges: Vec<Edge> = store
        .all_edges()
        .await?
        .into_iter()
        .filter(|e| ids.contains(&e.start) && ids.contains(&e.end))
        .collect();
    edges.sort_by_key(|e| e.id);

    Ok(GraphDump {
        nodes: nodes.iter().map(DumpNode::from).collect(),
        edges: edges.iter().map(DumpEdge::from).collect(),
    })
}

/// Write the structural dump as pretty-printed JSON.
pub async fn write_dump_json<S: GraphStore + ?Sized>(
    store: &S,
    floor: Option<FloorId>,
    writer: &mut dyn Write,
) -> Result<()> {
    let dump = structural_dump(store, floor).await?;
    serde_json::to_writer_pretty(&mut *writer, &dump)?;
    writeln!(writer)?;
    Ok(())
}
