//! Chain decomposition: partitioning the graph into circular chains (at most
//! one per back-edge cycle) and linear chains covering the rest.

use std::collections::BTreeSet;
use std::ops::Index;

use slotmap::SlotMap;

use crate::graph::{Graph, NodeId};

slotmap::new_key_type! {
    pub struct ChainKey;
}

/// A run of graph nodes placed as one unit by the solver. Circular chains
/// close into a loop; linear chains are open paths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chain {
    pub nodes: Vec<NodeId>,
    pub is_circle: bool,
}

impl Chain {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Circular chains rank before linear ones, shorter before longer.
    pub fn sort_rank(&self) -> (u8, usize) {
        (if self.is_circle { 0 } else { 1 }, self.len())
    }
}

/// Chains in the order decomposition produced them.
#[derive(Clone, Debug, Default)]
pub struct ChainSet {
    arena: SlotMap<ChainKey, Chain>,
    order: Vec<ChainKey>,
}

impl ChainSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chain: Chain) -> ChainKey {
        let key = self.arena.insert(chain);
        self.order.push(key);
        key
    }

    pub fn keys(&self) -> impl Iterator<Item = ChainKey> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Index<ChainKey> for ChainSet {
    type Output = Chain;

    fn index(&self, key: ChainKey) -> &Chain {
        &self.arena[key]
    }
}

/// Split a graph into chains. Each back edge contributes the shortest simple
/// cycle through it as a circular chain (cycles of length two are degenerate
/// and skipped, as are cycles touching nodes a previous back edge already
/// claimed, so the chains stay a partition); remaining nodes are grouped into
/// linear chains grown in both directions from the lowest-index unassigned
/// node.
pub fn decompose(graph: &Graph) -> ChainSet {
    let mut chains = ChainSet::new();
    let mut unassigned: BTreeSet<NodeId> = (0..graph.node_count()).collect();

    for back_edge in graph.back_edges() {
        let cycle = shortest_cycle(back_edge.a, back_edge.b, graph);
        if cycle.is_empty() || cycle.iter().any(|node| !unassigned.contains(node)) {
            continue;
        }
        for &node in &cycle {
            unassigned.remove(&node);
        }
        chains.push(Chain { nodes: cycle, is_circle: true });
    }

    while let Some(&pivot) = unassigned.iter().next() {
        unassigned.remove(&pivot);
        let mut first_way = follow_chain(pivot, graph, &mut unassigned);
        let second_way = follow_chain(pivot, graph, &mut unassigned);
        first_way.reverse();
        first_way.push(pivot);
        first_way.extend(second_way);
        chains.push(Chain { nodes: first_way, is_circle: false });
    }

    chains
}

/// Shortest simple path from `from` to `to` with more than two nodes, which
/// together with the back edge forms the shortest proper cycle. Empty when no
/// such path exists. Enumerates every simple path, exponential in the worst
/// case; fine for the room-count graphs this crate targets.
fn shortest_cycle(from: NodeId, to: NodeId, graph: &Graph) -> Vec<NodeId> {
    let mut visited = vec![false; graph.node_count()];
    let mut current = Vec::new();
    let mut best: Vec<NodeId> = Vec::new();
    collect_simple_paths(from, to, graph, &mut visited, &mut current, &mut best);
    best
}

fn collect_simple_paths(
    node: NodeId,
    target: NodeId,
    graph: &Graph,
    visited: &mut [bool],
    current: &mut Vec<NodeId>,
    best: &mut Vec<NodeId>,
) {
    visited[node] = true;
    current.push(node);

    if node == target {
        if current.len() > 2 && (best.is_empty() || current.len() < best.len()) {
            *best = current.clone();
        }
    } else {
        for &neighbour in graph.neighbours(node) {
            if !visited[neighbour] {
                collect_simple_paths(neighbour, target, graph, visited, current, best);
            }
        }
    }

    current.pop();
    visited[node] = false;
}

/// Walk away from `pivot` along still-unassigned nodes, always taking the
/// first eligible neighbour, claiming nodes as it goes.
fn follow_chain(pivot: NodeId, graph: &Graph, unassigned: &mut BTreeSet<NodeId>) -> Vec<NodeId> {
    let mut way = Vec::new();
    let mut current = pivot;
    loop {
        let next = graph.neighbours(current).iter().copied().find(|n| unassigned.contains(n));
        match next {
            Some(node) => {
                unassigned.remove(&node);
                way.push(node);
                current = node;
            }
            None => return way,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::BackEdge;

    use super::*;

    #[test]
    fn four_cycle_becomes_a_single_circular_chain() {
        let graph =
            Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)], vec![BackEdge { a: 3, b: 0 }]);
        let chains = decompose(&graph);
        assert_eq!(chains.len(), 1);
        let key = chains.keys().next().expect("one chain");
        assert!(chains[key].is_circle);
        assert_eq!(chains[key].len(), 4);
        let nodes: BTreeSet<NodeId> = chains[key].nodes.iter().copied().collect();
        assert_eq!(nodes, BTreeSet::from([0, 1, 2, 3]));
    }

    #[test]
    fn line_graph_decomposes_into_one_linear_chain_covering_all_nodes() {
        let graph = Graph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4)], Vec::new());
        let chains = decompose(&graph);
        assert_eq!(chains.len(), 1);
        let key = chains.keys().next().expect("one chain");
        assert!(!chains[key].is_circle);
        // Growth happens away from the pivot first, so node 0 ends up last.
        assert_eq!(chains[key].nodes, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn singleton_graph_yields_one_chain_of_one_node() {
        let graph = Graph::from_edges(1, &[], Vec::new());
        let chains = decompose(&graph);
        assert_eq!(chains.len(), 1);
        let key = chains.keys().next().expect("one chain");
        assert_eq!(chains[key].nodes, vec![0]);
        assert!(!chains[key].is_circle);
    }

    #[test]
    fn cycle_with_a_tail_produces_a_circular_and_a_linear_chain() {
        // 0-1-2-0 cycle plus a tail 2-3-4.
        let graph = Graph::from_edges(5, &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4)], vec![
            BackEdge { a: 2, b: 0 },
        ]);
        let chains = decompose(&graph);
        assert_eq!(chains.len(), 2);
        let keys: Vec<ChainKey> = chains.keys().collect();
        assert!(chains[keys[0]].is_circle);
        assert_eq!(
            chains[keys[0]].nodes.iter().copied().collect::<BTreeSet<_>>(),
            BTreeSet::from([0, 1, 2])
        );
        assert!(!chains[keys[1]].is_circle);
        assert_eq!(
            chains[keys[1]].nodes.iter().copied().collect::<BTreeSet<_>>(),
            BTreeSet::from([3, 4])
        );
    }

    #[test]
    fn back_edge_without_a_proper_cycle_contributes_no_circular_chain() {
        // The only path from 0 to 1 is the direct edge; the cycle would have
        // length two and is skipped.
        let graph = Graph::from_edges(2, &[(0, 1)], vec![BackEdge { a: 0, b: 1 }]);
        let chains = decompose(&graph);
        assert!(chains.keys().all(|key| !chains[key].is_circle));
        let covered: BTreeSet<NodeId> =
            chains.keys().flat_map(|key| chains[key].nodes.iter().copied()).collect();
        assert_eq!(covered, BTreeSet::from([0, 1]));
    }

    #[test]
    fn overlapping_back_edge_cycles_keep_the_partition() {
        // Two triangles sharing the edge 0-1. Only the first back edge forms
        // a circular chain; node 3 falls through to a linear chain.
        let graph = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 0), (1, 3), (3, 0)], vec![
            BackEdge { a: 2, b: 0 },
            BackEdge { a: 3, b: 0 },
        ]);
        let chains = decompose(&graph);

        let mut seen = BTreeSet::new();
        for key in chains.keys() {
            for &node in &chains[key].nodes {
                assert!(seen.insert(node), "node {node} assigned to two chains");
            }
        }
        assert_eq!(seen, BTreeSet::from([0, 1, 2, 3]));
        assert_eq!(chains.keys().filter(|&key| chains[key].is_circle).count(), 1);
    }

    #[test]
    fn every_node_lands_in_exactly_one_chain() {
        let graph = Graph::from_edges(
            7,
            &[(0, 1), (1, 2), (2, 3), (3, 0), (3, 4), (4, 5), (5, 6)],
            vec![BackEdge { a: 3, b: 0 }],
        );
        let chains = decompose(&graph);
        let mut seen = BTreeSet::new();
        for key in chains.keys() {
            for &node in &chains[key].nodes {
                assert!(seen.insert(node), "node {node} assigned twice");
            }
        }
        assert_eq!(seen.len(), graph.node_count());
    }
}
