//! # Spatial Graph Model
//!
//! Plain DTOs shared by the store, the indexer, the snapshot builder and the
//! query surface. This module is pure data: no I/O, no state, no async.

pub mod node;
pub mod edge;
pub mod room;
pub mod position;

pub use node::{Node, NodeId, NodeKind, FloorId};
pub use edge::{Edge, EdgeId, EdgeOrigin};
pub use room::{Room, RoomId};
pub use position::Position;
