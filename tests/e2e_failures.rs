//! Store failures and slow stores during indexing.
//!
//! Failures must reach the caller; a slow or failing re-index must never
//! leave readers looking at a half-wired floor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use indoor_nav::{
    Edge, EdgeId, EdgeOrigin, EdgeSetDiff, Error, FloorId, GraphStore, MemoryStore, NavConfig,
    Navigator, Node, NodeId, NodeKind, Position, Room, RoomId,
};
use pretty_assertions::assert_eq;

/// Delegates to `MemoryStore` but can be told to reject or stall edge writes.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_edge_writes: AtomicBool,
    slow_edge_writes: AtomicBool,
}

impl FlakyStore {
    async fn before_edge_write(&self) -> indoor_nav::Result<()> {
        if self.slow_edge_writes.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        if self.fail_edge_writes.load(Ordering::SeqCst) {
            return Err(Error::StorageError("edge table is read-only".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl GraphStore for FlakyStore {
    async fn upsert_room_node(&self, room: RoomId, floor: FloorId, position: Position) -> indoor_nav::Result<(Node, bool)> {
        self.inner.upsert_room_node(room, floor, position).await
    }

    async fn create_node(&self, floor: FloorId, kind: NodeKind, position: Position) -> indoor_nav::Result<Node> {
        self.inner.create_node(floor, kind, position).await
    }

    async fn get_node(&self, id: NodeId) -> indoor_nav::Result<Option<Node>> {
        self.inner.get_node(id).await
    }

    async fn node_for_room(&self, room: RoomId) -> indoor_nav::Result<Option<Node>> {
        self.inner.node_for_room(room).await
    }

    async fn delete_node(&self, id: NodeId) -> indoor_nav::Result<bool> {
        self.inner.delete_node(id).await
    }

    async fn list_nodes_by_floor(&self, floor: FloorId) -> indoor_nav::Result<Vec<Node>> {
        self.inner.list_nodes_by_floor(floor).await
    }

    async fn all_nodes(&self) -> indoor_nav::Result<Vec<Node>> {
        self.inner.all_nodes().await
    }

    async fn edge_exists_between(&self, a: NodeId, b: NodeId) -> indoor_nav::Result<bool> {
        self.inner.edge_exists_between(a, b).await
    }

    async fn insert_edge(
        &self,
        a: NodeId,
        b: NodeId,
        distance_meters: f64,
        origin: EdgeOrigin,
    ) -> indoor_nav::Result<Edge> {
        self.before_edge_write().await?;
        self.inner.insert_edge(a, b, distance_meters, origin).await
    }

    async fn replace_synthesized_edges(
        &self,
        floor: FloorId,
        wanted: Vec<(NodeId, NodeId, f64)>,
    ) -> indoor_nav::Result<EdgeSetDiff> {
        self.before_edge_write().await?;
        self.inner.replace_synthesized_edges(floor, wanted).await
    }

    async fn delete_edge(&self, id: EdgeId) -> indoor_nav::Result<bool> {
        self.inner.delete_edge(id).await
    }

    async fn all_edges(&self) -> indoor_nav::Result<Vec<Edge>> {
        self.inner.all_edges().await
    }
}

fn room(id: u64, lon: f64) -> Room {
    Room::new(RoomId(id), FloorId(1), Position::new(lon, 0.0))
}

#[tokio::test]
async fn test_edge_write_failure_propagates() {
    let nav = Navigator::with_store(FlakyStore::default(), NavConfig::default()).unwrap();
    nav.register_room(&room(1, 0.0)).await.unwrap();

    nav.store().fail_edge_writes.store(true, Ordering::SeqCst);
    let result = nav.register_room(&room(2, 0.00005)).await;

    match result {
        Err(Error::StorageError(msg)) => assert!(msg.contains("read-only")),
        other => panic!("expected StorageError, got {other:?}"),
    }
    assert_eq!(nav.store().edge_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_failure_without_neighbors_is_silent() {
    let nav = Navigator::with_store(FlakyStore::default(), NavConfig::default()).unwrap();
    nav.store().fail_edge_writes.store(true, Ordering::SeqCst);

    // No neighbors within reach, so no edge write is attempted
    nav.register_room(&room(1, 0.0)).await.unwrap();
    nav.register_room(&room(2, 0.01)).await.unwrap();
    assert_eq!(nav.store().node_count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_reindex_repairs_after_failure() {
    let nav = Navigator::with_store(FlakyStore::default(), NavConfig::default()).unwrap();
    nav.register_room(&room(1, 0.0)).await.unwrap();

    nav.store().fail_edge_writes.store(true, Ordering::SeqCst);
    assert!(nav.register_room(&room(2, 0.00005)).await.is_err());

    nav.store().fail_edge_writes.store(false, Ordering::SeqCst);
    let report = nav.reindex_floor(FloorId(1)).await.unwrap();
    assert_eq!(report.edges_created, 1);
    assert!(nav.room_to_room_path(RoomId(1), RoomId(2)).await.is_ok());
}

#[tokio::test]
async fn test_failed_reindex_keeps_old_edges() {
    let nav = Navigator::with_store(FlakyStore::default(), NavConfig::default()).unwrap();
    nav.register_room(&room(1, 0.0)).await.unwrap();
    nav.register_room(&room(2, 0.00005)).await.unwrap();
    let before = nav.structural_dump(None).await.unwrap();

    nav.store().fail_edge_writes.store(true, Ordering::SeqCst);
    assert!(matches!(nav.reindex_floor(FloorId(1)).await, Err(Error::StorageError(_))));

    assert_eq!(nav.structural_dump(None).await.unwrap(), before);
    assert!(nav.room_to_room_path(RoomId(1), RoomId(2)).await.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_queries_during_slow_reindex_see_a_wired_floor() {
    let nav = Arc::new(Navigator::with_store(FlakyStore::default(), NavConfig::default()).unwrap());
    nav.register_room(&room(1, 0.0)).await.unwrap();
    nav.register_room(&room(2, 0.00005)).await.unwrap();
    nav.store().slow_edge_writes.store(true, Ordering::SeqCst);

    let reindex = {
        let nav = nav.clone();
        tokio::spawn(async move { nav.reindex_floor(FloorId(1)).await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;

    let during = nav.room_to_room_path(RoomId(1), RoomId(2)).await.unwrap();
    let report = reindex.await.unwrap().unwrap();
    let after = nav.room_to_room_path(RoomId(1), RoomId(2)).await.unwrap();

    assert_eq!((report.edges_created, report.edges_updated, report.edges_removed), (0, 0, 0));
    assert_eq!(during.nodes, after.nodes);
    assert!((during.cost_meters - 5.55).abs() < 1e-6);
}
