//! Room upsert payload, produced by the room-management collaborator.

use serde::{Deserialize, Serialize};
use super::{FloorId, Position};

/// Opaque room identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomId(pub u64);

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A room as handed to the indexer after its own write has committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    /// `None` is rejected by the indexer.
    pub floor: Option<FloorId>,
    pub name: String,
    /// e.g. "classroom", "office", "amenity"
    pub room_type: String,
    pub position: Position,
}

impl Room {
    pub fn new(id: RoomId, floor: FloorId, position: Position) -> Self {
        Self {
            id,
            floor: Some(floor),
            name: String::new(),
            room_type: String::new(),
            position,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_room_type(mut self, room_type: impl Into<String>) -> Self {
        self.room_type = room_type.into();
        self
    }
}
