//! Frontier entry for the priority queue.
//!
//! `BinaryHeap` is a max-heap; the ordering below is reversed so the entry
//! with the lowest estimate pops first, ties going to the lower node id.

use std::cmp::Ordering;

use crate::model::NodeId;

#[derive(Debug, Clone, Copy)]
pub(crate) struct FrontierEntry {
    pub node: NodeId,
    /// f(n) = g(n) + h(n).
    pub estimate: f64,
    /// g(n): accumulated cost from the start.
    pub cost: f64,
}

impl FrontierEntry {
    pub fn new(node: NodeId, cost: f64, heuristic: f64) -> Self {
        Self { node, estimate: cost + heuristic, cost }
    }
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .total_cmp(&self.estimate)
            .then_with(|| other.node.cmp(&self.node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BinaryHeap;

    #[test]
    fn test_lowest_estimate_pops_first() {
        let mut heap = BinaryHeap::new();
        heap.push(FrontierEntry::new(NodeId(1), 5.0, 0.0));
        heap.push(FrontierEntry::new(NodeId(2), 1.0, 0.0));
        heap.push(FrontierEntry::new(NodeId(3), 3.0, 0.0));

        let order: Vec<NodeId> = std::iter::from_fn(|| heap.pop()).map(|e| e.node).collect();
        assert_eq!(order, vec![NodeId(2), NodeId(3), NodeId(1)]);
    }

    #[test]
    fn test_ties_go_to_lower_id() {
        let mut heap = BinaryHeap::new();
        heap.push(FrontierEntry::new(NodeId(9), 2.0, 0.0));
        heap.push(FrontierEntry::new(NodeId(4), 2.0, 0.0));
        assert_eq!(heap.pop().map(|e| e.node), Some(NodeId(4)));
    }

    #[test]
    fn test_heuristic_contributes_to_estimate() {
        let mut heap = BinaryHeap::new();
        heap.push(FrontierEntry::new(NodeId(1), 1.0, 10.0));
        heap.push(FrontierEntry::new(NodeId(2), 4.0, 0.0));
        assert_eq!(heap.pop().map(|e| e.node), Some(NodeId(2)));
    }
}
