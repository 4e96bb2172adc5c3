//! Uniform-cost search with an optional heuristic.
//!
//! Both public entry points of the pathfinding service run through
//! [`shortest_path`]. With [`zero_heuristic`] it is plain Dijkstra; with an
//! admissible heuristic it is A*.
//!
//! Tie-breaking: the frontier pops the lowest estimate first and, on equal
//! estimates, the lowest node id. Neighbors are relaxed in ascending id
//! order and a predecessor is replaced only by a strictly cheaper route, so
//! the first of several equal-cost paths found this way wins.

use std::collections::BinaryHeap;
use std::time::Instant;

use hashbrown::{HashMap, HashSet};
use tracing::debug;

use crate::model::{Node, NodeId};
use crate::snapshot::GraphSnapshot;
use crate::{Error, Result};

use super::frontier::FrontierEntry;
use super::types::{SearchParams, ShortestPath};

/// How often (in settled nodes) the wall clock is consulted.
const DEADLINE_CHECK_INTERVAL: usize = 64;

/// h(n) = 0. Admissible for any non-negative edge weights.
pub fn zero_heuristic(_node: &Node) -> f64 {
    0.0
}

/// Find the cheapest path from `start` to `goal` in `snapshot`.
///
/// # Errors
/// * `NoPathFound` - either endpoint is not in the snapshot, or the frontier
///   empties before `goal` is settled
/// * `SearchLimitExceeded` - more than `params.max_expansions` nodes settled
/// * `SearchTimedOut` - `params.timeout` elapsed
/// * `Cancelled` - `params.cancel` was triggered
pub fn shortest_path<H>(
    snapshot: &GraphSnapshot,
    start: NodeId,
    goal: NodeId,
    heuristic: H,
    params: &SearchParams,
) -> Result<ShortestPath>
where
    H: Fn(&Node) -> f64,
{
    let no_path = || Error::NoPathFound { start, end: goal };

    let (Some(start_node), Some(_)) = (snapshot.node(start), snapshot.node(goal)) else {
        return Err(no_path());
    };

    if start == goal {
        return Ok(ShortestPath {
            nodes: vec![start],
            positions: vec![start_node.position],
            cost_meters: 0.0,
            nodes_expanded: 0,
        });
    }

    let started = Instant::now();

    let mut frontier: BinaryHeap<FrontierEntry> = BinaryHeap::new();
    frontier.push(FrontierEntry::new(start, 0.0, heuristic(start_node)));

    let mut best: HashMap<NodeId, f64> = HashMap::new();
    best.insert(start, 0.0);
    let mut came_from: HashMap<NodeId, NodeId> = HashMap::new();
    let mut settled: HashSet<NodeId> = HashSet::new();
    let mut expanded = 0usize;

    while let Some(current) = frontier.pop() {
        if current.node == goal {
            let path = reconstruct(snapshot, &came_from, start, goal, current.cost, expanded)?;
            debug!(
                start = %start,
                end = %goal,
                hops = path.edge_count(),
                cost_meters = path.cost_meters,
                expanded,
                "path found"
            );
            return Ok(path);
        }

        // Stale duplicate of a node already settled at a lower cost
        if !settled.insert(current.node) {
            continue;
        }

        if params.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
            return Err(Error::Cancelled);
        }
        if expanded >= params.max_expansions {
            debug!(expanded, limit = params.max_expansions, "search expansion limit reached");
            return Err(Error::SearchLimitExceeded { expanded });
        }
        if let Some(timeout) = params.timeout {
            if expanded % DEADLINE_CHECK_INTERVAL == 0 && started.elapsed() >= timeout {
                return Err(Error::SearchTimedOut { elapsed: started.elapsed() });
            }
        }
        expanded += 1;

        for &(neighbor, weight) in snapshot.neighbors(current.node) {
            if settled.contains(&neighbor) {
                continue;
            }

            let tentative = current.cost + weight;
            let known = best.get(&neighbor).copied().unwrap_or(f64::INFINITY);
            if tentative >= known {
                continue;
            }

            best.insert(neighbor, tentative);
            came_from.insert(neighbor, current.node);

            let h = snapshot.node(neighbor).map(&heuristic).unwrap_or(0.0);
            frontier.push(FrontierEntry::new(neighbor, tentative, h));
        }
    }

    debug!(start = %start, end = %goal, expanded, "frontier exhausted");
    Err(no_path())
}

fn reconstruct(
    snapshot: &GraphSnapshot,
    came_from: &HashMap<NodeId, NodeId>,
    start: NodeId,
    goal: NodeId,
    cost: f64,
    expanded: usize,
) -> Result<ShortestPath> {
    let mut nodes = vec![goal];
    let mut node = goal;
    while node != start {
        node = *came_from
            .get(&node)
            .ok_or_else(|| Error::StorageError(format!("broken predecessor chain at node {node}")))?;
        nodes.push(node);
    }
    nodes.reverse();

    let positions = nodes
        .iter()
        .map(|id| {
            snapshot
                .node(*id)
                .map(|n| n.position)
                .ok_or_else(|| Error::StorageError(format!("path node {id} missing from snapshot")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ShortestPath { nodes, positions, cost_meters: cost, nodes_expanded: expanded })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use crate::pathfinding::CancelToken;

    fn node(id: u64, lon: f64) -> Node {
        Node::new(NodeId(id), FloorId(1), NodeKind::Hallway, Position::new(lon, 0.0))
    }

    fn edge(id: u64, a: u64, b: u64, d: f64) -> Edge {
        Edge::new(EdgeId(id), NodeId(a), NodeId(b), d)
    }

    /// 1 -2- 2 -2- 4 and a costlier detour 1 -1- 3 -5- 4, plus isolated 5.
    fn diamond() -> GraphSnapshot {
        GraphSnapshot::from_parts(
            (1..=5).map(|i| node(i, i as f64)).collect(),
            vec![edge(1, 1, 2, 2.0), edge(2, 2, 4, 2.0), edge(3, 1, 3, 1.0), edge(4, 3, 4, 5.0)],
            None,
            |_| true,
        )
    }

    #[test]
    fn test_finds_cheapest_route() {
        let path = shortest_path(&diamond(), NodeId(1), NodeId(4), zero_heuristic, &SearchParams::default()).unwrap();
        assert_eq!(path.nodes, vec![NodeId(1), NodeId(2), NodeId(4)]);
        assert_eq!(path.cost_meters, 4.0);
        assert_eq!(path.positions.len(), 3);
    }

    #[test]
    fn test_search_is_undirected() {
        let path = shortest_path(&diamond(), NodeId(4), NodeId(1), zero_heuristic, &SearchParams::default()).unwrap();
        assert_eq!(path.nodes, vec![NodeId(4), NodeId(2), NodeId(1)]);
    }

    #[test]
    fn test_same_start_and_end() {
        let path = shortest_path(&diamond(), NodeId(3), NodeId(3), zero_heuristic, &SearchParams::default()).unwrap();
        assert_eq!(path.nodes, vec![NodeId(3)]);
        assert_eq!(path.cost_meters, 0.0);
    }

    #[test]
    fn test_isolated_node_is_unreachable() {
        let result = shortest_path(&diamond(), NodeId(1), NodeId(5), zero_heuristic, &SearchParams::default());
        assert!(matches!(result, Err(Error::NoPathFound { .. })));
    }

    #[test]
    fn test_unknown_endpoint_is_no_path() {
        let result = shortest_path(&diamond(), NodeId(999), NodeId(9999), zero_heuristic, &SearchParams::default());
        assert!(matches!(result, Err(Error::NoPathFound { .. })));
    }

    #[test]
    fn test_equal_cost_tie_prefers_lower_ids() {
        // 1 -> 2 -> 4 and 1 -> 3 -> 4 both cost 2
        let snap = GraphSnapshot::from_parts(
            (1..=4).map(|i| node(i, 0.0)).collect(),
            vec![edge(1, 1, 3, 1.0), edge(2, 3, 4, 1.0), edge(3, 1, 2, 1.0), edge(4, 2, 4, 1.0)],
            None,
            |_| true,
        );
        let path = shortest_path(&snap, NodeId(1), NodeId(4), zero_heuristic, &SearchParams::default()).unwrap();
        assert_eq!(path.nodes, vec![NodeId(1), NodeId(2), NodeId(4)]);
    }

    #[test]
    fn test_heuristic_does_not_change_cost() {
        let goal_lon = 4.0;
        let admissible = |n: &Node| (goal_lon - n.position.longitude).abs() * 0.1;
        let informed = shortest_path(&diamond(), NodeId(1), NodeId(4), admissible, &SearchParams::default()).unwrap();
        let plain = shortest_path(&diamond(), NodeId(1), NodeId(4), zero_heuristic, &SearchParams::default()).unwrap();
        assert_eq!(informed.cost_meters, plain.cost_meters);
    }

    #[test]
    fn test_expansion_limit() {
        let params = SearchParams::default().max_expansions(1);
        let result = shortest_path(&diamond(), NodeId(1), NodeId(4), zero_heuristic, &params);
        assert!(matches!(result, Err(Error::SearchLimitExceeded { expanded: 1 })));
    }

    #[test]
    fn test_cancelled_search() {
        let token = CancelToken::new();
        token.cancel();
        let params = SearchParams::default().cancel_token(token);
        let result = shortest_path(&diamond(), NodeId(1), NodeId(4), zero_heuristic, &params);
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn test_zero_timeout() {
        let params = SearchParams::default().timeout(std::time::Duration::ZERO);
        let result = shortest_path(&diamond(), NodeId(1), NodeId(4), zero_heuristic, &params);
        assert!(matches!(result, Err(Error::SearchTimedOut { .. })));
    }
}
