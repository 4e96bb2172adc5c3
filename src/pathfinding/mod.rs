//! # Pathfinding
//!
//! Two query shapes over one Dijkstra core:
//!
//! | Entry point | Input | Output |
//! |-------------|-------|--------|
//! | [`PathfindingService::graph_wide_path`] | node ids | `(lat, lng)` pairs |
//! | [`PathfindingService::room_to_room_path`] | room ids | line geometry in `(lng, lat)` |
//!
//! Each call builds its own whole-building snapshot, so concurrent queries
//! share no mutable state. A query racing a node insert may or may not see it.

mod frontier;
mod search;
mod types;

pub use search::{shortest_path, zero_heuristic};
pub use types::{CancelToken, LineString, LineStringTag, SearchParams, ShortestPath};

use std::sync::Arc;

use crate::model::{NodeId, RoomId};
use crate::snapshot::build_snapshot;
use crate::storage::GraphStore;
use crate::{Error, Result};

/// Read-only shortest-path queries against a store.
pub struct PathfindingService<S: GraphStore> {
    store: Arc<S>,
    defaults: SearchParams,
}

impl<S: GraphStore> PathfindingService<S> {
    pub fn new(store: Arc<S>, defaults: SearchParams) -> Self {
        Self { store, defaults }
    }

    /// Parameters used by calls that do not pass their own.
    pub fn default_params(&self) -> &SearchParams {
        &self.defaults
    }

    /// Uniform-cost search between two node ids over the whole building.
    pub async fn graph_wide_path(&self, start: NodeId, end: NodeId) -> Result<ShortestPath> {
        self.graph_wide_path_with(start, end, &self.defaults).await
    }

    pub async fn graph_wide_path_with(
        &self,
        start: NodeId,
        end: NodeId,
        params: &SearchParams,
    ) -> Result<ShortestPath> {
        let snapshot = build_snapshot(self.store.as_ref(), None).await?;
        shortest_path(&snapshot, start, end, zero_heuristic, params)
    }

    /// Informed search between the nodes mapped to two rooms.
    ///
    /// No useful admissible heuristic exists once manual edges may be shorter
    /// than the straight line, so this runs with h = 0 and is cost-equivalent
    /// to [`Self::graph_wide_path`].
    ///
    /// # Errors
    /// * `NotFound` - a room was never registered with the indexer
    /// * `NoPathFound` - both rooms are mapped but not connected
    pub async fn room_to_room_path(&self, start: RoomId, end: RoomId) -> Result<ShortestPath> {
        self.room_to_room_path_with(start, end, &self.defaults).await
    }

    pub async fn room_to_room_path_with(
        &self,
        start: RoomId,
        end: RoomId,
        params: &SearchParams,
    ) -> Result<ShortestPath> {
        let from = self.resolve_room(start).await?;
        let to = self.resolve_room(end).await?;
        let snapshot = build_snapshot(self.store.as_ref(), None).await?;
        shortest_path(&snapshot, from, to, zero_heuristic, params)
    }

    async fn resolve_room(&self, room: RoomId) -> Result<NodeId> {
        self.store
            .node_for_room(room)
            .await?
            .map(|n| n.id)
            .ok_or_else(|| Error::NotFound(format!("Room {room} has no graph node")))
    }
}
