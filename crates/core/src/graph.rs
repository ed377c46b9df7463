//! Connectivity graph consumed by the layout pipeline.
//! The graph is built upstream (or by the convenience builder below) and is
//! read-only to the solver.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::Rng;
use serde::{Deserialize, Serialize};

/// Stable index of a node inside its graph.
pub type NodeId = usize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub index: NodeId,
    pub neighbours: Vec<NodeId>,
}

/// An edge that is not part of the spanning structure; every back edge marks
/// a cycle the layout must preserve as a closed loop of rooms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackEdge {
    pub a: NodeId,
    pub b: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    nodes: Vec<Node>,
    back_edges: Vec<BackEdge>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, back_edges: Vec<BackEdge>) -> Self {
        Self { nodes, back_edges }
    }

    /// Convenience constructor for tests and demos: undirected edges are
    /// expanded into per-node neighbour lists in the order given.
    pub fn from_edges(
        node_count: usize,
        edges: &[(NodeId, NodeId)],
        back_edges: Vec<BackEdge>,
    ) -> Self {
        let mut nodes: Vec<Node> =
            (0..node_count).map(|index| Node { index, neighbours: Vec::new() }).collect();
        for &(a, b) in edges {
            nodes[a].neighbours.push(b);
            nodes[b].neighbours.push(a);
        }
        Self { nodes, back_edges }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn neighbours(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node].neighbours
    }

    pub fn back_edges(&self) -> &[BackEdge] {
        &self.back_edges
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Random connected graph: a spanning tree grown node by node, then up to
    /// `back_edge_count` extra cycle-forming edges. Attach points with fewer
    /// than four edges are preferred so the result stays placeable with
    /// four-door room templates.
    pub fn random(node_count: usize, back_edge_count: usize, rng: &mut ChaCha8Rng) -> Self {
        let mut nodes: Vec<Node> =
            (0..node_count).map(|index| Node { index, neighbours: Vec::new() }).collect();

        for index in 1..node_count {
            let open: Vec<NodeId> =
                (0..index).filter(|&earlier| nodes[earlier].neighbours.len() < 4).collect();
            let parent = if open.is_empty() {
                (rng.next_u64() as usize) % index
            } else {
                open[(rng.next_u64() as usize) % open.len()]
            };
            nodes[parent].neighbours.push(index);
            nodes[index].neighbours.push(parent);
        }

        let mut back_edges = Vec::new();
        let mut attempts = 0;
        while back_edges.len() < back_edge_count && attempts < back_edge_count * 20 {
            attempts += 1;
            if node_count < 3 {
                break;
            }
            let a = (rng.next_u64() as usize) % node_count;
            let b = (rng.next_u64() as usize) % node_count;
            if a == b
                || nodes[a].neighbours.contains(&b)
                || nodes[a].neighbours.len() >= 4
                || nodes[b].neighbours.len() >= 4
            {
                continue;
            }
            nodes[a].neighbours.push(b);
            nodes[b].neighbours.push(a);
            back_edges.push(BackEdge { a, b });
        }

        Self { nodes, back_edges }
    }
}
