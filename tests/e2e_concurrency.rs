//! Concurrent indexing and querying against one shared navigator.

use std::sync::Arc;

use indoor_nav::{FloorId, GraphStore, Navigator, Position, Room, RoomId};

const ROOMS: u64 = 16;

fn clustered_room(id: u64, floor: u64) -> Room {
    // 16 rooms spread over 0.00006 degrees: every pair is within reach
    Room::new(RoomId(id), FloorId(floor), Position::new(id as f64 * 0.000004, floor as f64))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_on_one_floor() {
    let nav = Arc::new(Navigator::open_memory());

    let mut tasks = Vec::new();
    for id in 0..ROOMS {
        let nav = nav.clone();
        tasks.push(tokio::spawn(async move { nav.register_room(&clustered_room(id, 1)).await }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(nav.store().node_count().await.unwrap(), ROOMS);
    assert_eq!(nav.store().edge_count().await.unwrap(), ROOMS * (ROOMS - 1) / 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_across_floors() {
    let nav = Arc::new(Navigator::open_memory());

    let mut tasks = Vec::new();
    for floor in 1..=3u64 {
        for id in 0..ROOMS {
            let nav = nav.clone();
            let room_id = floor * 100 + id;
            tasks.push(tokio::spawn(async move {
                let mut room = clustered_room(id, floor);
                room.id = RoomId(room_id);
                nav.register_room(&room).await
            }));
        }
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let per_floor = ROOMS * (ROOMS - 1) / 2;
    assert_eq!(nav.store().edge_count().await.unwrap(), 3 * per_floor);
    for floor in 1..=3u64 {
        let dump = nav.structural_dump(Some(FloorId(floor))).await.unwrap();
        assert_eq!(dump.edges.len() as u64, per_floor);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_queries_during_indexing() {
    let nav = Arc::new(Navigator::open_memory());
    nav.register_room(&clustered_room(0, 1)).await.unwrap();
    nav.register_room(&clustered_room(1, 1)).await.unwrap();

    let writer = {
        let nav = nav.clone();
        tokio::spawn(async move {
            for id in 2..ROOMS {
                nav.register_room(&clustered_room(id, 1)).await.unwrap();
            }
        })
    };
    let reader = {
        let nav = nav.clone();
        tokio::spawn(async move {
            for _ in 0..50 {
                let path = nav.room_to_room_path(RoomId(0), RoomId(1)).await.unwrap();
                assert_eq!(path.nodes.len(), 2);
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();
}
