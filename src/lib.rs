//! # indoor-nav — Campus Indoor Navigation Graph
//!
//! Indexes a campus's indoor spaces as a spatial graph and answers
//! shortest-path queries between rooms.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `GraphStore` is the contract between indexing/search and persistence
//! 2. **Clean DTOs**: `Node`, `Edge`, `Room`, `Position` cross all boundaries
//! 3. **Explicit indexing**: room management calls `register_room` after its own write; no event bus
//! 4. **One search core**: both query shapes run the same Dijkstra with an optional heuristic
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use indoor_nav::{Navigator, Room, RoomId, FloorId, Position};
//!
//! # async fn example() -> indoor_nav::Result<()> {
//! let nav = Navigator::open_memory();
//!
//! nav.register_room(&Room::new(RoomId(1), FloorId(1), Position::new(36.88650, -1.22350))).await?;
//! nav.register_room(&Room::new(RoomId(2), FloorId(1), Position::new(36.88655, -1.22350))).await?;
//!
//! let path = nav.room_to_room_path(RoomId(1), RoomId(2)).await?;
//! println!("{} m: {:?}", path.cost_meters, path.line_string().coordinates);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod spatial;
pub mod config;
pub mod storage;
pub mod index;
pub mod snapshot;
pub mod pathfinding;
pub mod export;
pub mod api;

use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Node, NodeId, NodeKind, FloorId,
    Edge, EdgeId, EdgeOrigin,
    Room, RoomId,
    Position,
};

// ============================================================================
// Re-exports: Components
// ============================================================================

pub use config::{NavConfig, SearchLimits};
pub use spatial::SpatialDistanceCalculator;
pub use storage::{EdgeSetDiff, GraphStore, MemoryStore};
pub use index::{GraphIndexer, IndexOutcome, ReindexReport};
pub use snapshot::{GraphSnapshot, build_snapshot};
pub use pathfinding::{CancelToken, LineString, PathfindingService, SearchParams, ShortestPath};
pub use export::GraphDump;

// ============================================================================
// Top-level Navigator handle
// ============================================================================

/// The primary entry point. A `Navigator` wraps a store and wires the
/// indexer and the pathfinding service to it.
pub struct Navigator<S: GraphStore> {
    store: Arc<S>,
    indexer: GraphIndexer<S>,
    paths: PathfindingService<S>,
    config: NavConfig,
}

impl<S: GraphStore> Navigator<S> {
    /// Create a Navigator over the given store.
    pub fn with_store(store: S, config: NavConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(store, config))
    }

    fn assemble(store: S, config: NavConfig) -> Self {
        let store = Arc::new(store);
        Self {
            indexer: GraphIndexer::new(store.clone(), &config),
            paths: PathfindingService::new(store.clone(), SearchParams::from(config.search)),
            store,
            config,
        }
    }

    /// Index a room after room management has committed it.
    pub async fn register_room(&self, room: &Room) -> Result<IndexOutcome> {
        self.indexer.register_room(room).await
    }

    /// Drop a deleted room's node and its edges.
    pub async fn remove_room(&self, room: RoomId) -> Result<Node> {
        self.indexer.remove_room(room).await
    }

    pub async fn add_circulation_node(
        &self,
        floor: FloorId,
        kind: NodeKind,
        position: Position,
    ) -> Result<IndexOutcome> {
        self.indexer.add_circulation_node(floor, kind, position).await
    }

    pub async fn connect_nodes(&self, a: NodeId, b: NodeId, distance_meters: Option<f64>) -> Result<Edge> {
        self.indexer.connect_nodes(a, b, distance_meters).await
    }

    pub async fn reindex_floor(&self, floor: FloorId) -> Result<ReindexReport> {
        self.indexer.reindex_floor(floor).await
    }

    pub async fn graph_wide_path(&self, start: NodeId, end: NodeId) -> Result<ShortestPath> {
        self.paths.graph_wide_path(start, end).await
    }

    pub async fn room_to_room_path(&self, start: RoomId, end: RoomId) -> Result<ShortestPath> {
        self.paths.room_to_room_path(start, end).await
    }

    /// Nodes and edges, optionally restricted to one floor.
    pub async fn structural_dump(&self, floor: Option<FloorId>) -> Result<GraphDump> {
        export::structural_dump(self.store.as_ref(), floor).await
    }

    /// Access the underlying store (for advanced use).
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn indexer(&self) -> &GraphIndexer<S> {
        &self.indexer
    }

    pub fn paths(&self) -> &PathfindingService<S> {
        &self.paths
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }
}

/// In-memory navigator for testing and embedding.
impl Navigator<MemoryStore> {
    pub fn open_memory() -> Self {
        Self::assemble(MemoryStore::new(), NavConfig::default())
    }

    pub fn open_memory_with(config: NavConfig) -> Result<Self> {
        Self::with_store(MemoryStore::new(), config)
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The search exhausted its frontier without settling `end`.
    #[error("No path found")]
    NoPathFound { start: NodeId, end: NodeId },

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Search gave up after settling {expanded} nodes")]
    SearchLimitExceeded { expanded: usize },

    #[error("Search timed out after {elapsed:?}")]
    SearchTimedOut { elapsed: Duration },

    #[error("Search cancelled")]
    Cancelled,

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
