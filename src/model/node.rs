//! Node in the spatial graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::{Position, RoomId};

/// Opaque node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Floor identifier, owned by the building-data collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FloorId(pub u64);

impl std::fmt::Display for FloorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Room,
    Hallway,
    Stairs,
    Elevator,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Room => "room",
            NodeKind::Hallway => "hallway",
            NodeKind::Stairs => "stairs",
            NodeKind::Elevator => "elevator",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vertex of the campus graph.
///
/// A node with `room = Some(..)` always has `kind == NodeKind::Room` and the
/// room's position; the store enforces this on upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub room: Option<RoomId>,
    pub floor: FloorId,
    pub kind: NodeKind,
    pub position: Position,
    /// Set once when the node is first stored.
    pub indexed_at: DateTime<Utc>,
}

impl Node {
    pub fn new(id: NodeId, floor: FloorId, kind: NodeKind, position: Position) -> Self {
        Self {
            id,
            room: None,
            floor,
            kind,
            position,
            indexed_at: Utc::now(),
        }
    }

    pub fn with_room(mut self, room: RoomId) -> Self {
        self.room = Some(room);
        self.kind = NodeKind::Room;
        self
    }

    pub fn is_room(&self) -> bool {
        self.room.is_some()
    }
}
