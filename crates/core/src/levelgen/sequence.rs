//! Solve ordering: arranging chains so placement grows outward from a seed
//! chain, circular chains first within each frontier wave.

use std::collections::BTreeSet;

use crate::graph::{Graph, NodeId};

use super::chains::{ChainKey, ChainSet};

/// Flattened node order for the placement solver. Starts from the shortest
/// circular chain (falling back to the first chain), then repeatedly pulls in
/// chains adjacent to what is already ordered, each wave sorted circular-first
/// then shorter-first. Within each chain, nodes are emitted anchored-first so
/// that every node after the very first has an already-ordered graph
/// neighbour. Chains unreachable from the seed are left out.
pub fn solve_order(chains: &ChainSet, graph: &Graph) -> Vec<NodeId> {
    let Some(seed) = seed_chain(chains) else {
        return Vec::new();
    };

    let mut ordered: Vec<ChainKey> = vec![seed];
    loop {
        let mut wave: Vec<ChainKey> = Vec::new();
        for &key in &ordered {
            for &node in &chains[key].nodes {
                for &neighbour in graph.neighbours(node) {
                    let Some(next) = chain_containing(neighbour, chains) else {
                        continue;
                    };
                    if !ordered.contains(&next) && !wave.contains(&next) {
                        wave.push(next);
                    }
                }
            }
        }
        if wave.is_empty() {
            break;
        }
        wave.sort_by_key(|&key| chains[key].sort_rank());
        ordered.extend(wave);
    }

    flatten(&ordered, chains, graph)
}

/// The shortest circular chain wins, first-found on ties; with no circular
/// chains the first chain in decomposition order seeds the order.
fn seed_chain(chains: &ChainSet) -> Option<ChainKey> {
    let first = chains.keys().next()?;

    let mut best: Option<ChainKey> = None;
    for key in chains.keys() {
        if !chains[key].is_circle {
            continue;
        }
        if best.is_none_or(|current| chains[key].len() < chains[current].len()) {
            best = Some(key);
        }
    }

    Some(best.unwrap_or(first))
}

fn chain_containing(node: NodeId, chains: &ChainSet) -> Option<ChainKey> {
    chains.keys().find(|&key| chains[key].nodes.contains(&node))
}

/// Emit chain nodes preferring ones with an already-emitted neighbour, so a
/// chain entered from its far end still yields a placeable order. A chain's
/// node list is a path, so once one node is out the rest always anchor.
fn flatten(ordered: &[ChainKey], chains: &ChainSet, graph: &Graph) -> Vec<NodeId> {
    let mut seen = BTreeSet::new();
    let mut nodes = Vec::new();
    for &key in ordered {
        let mut pending: Vec<NodeId> =
            chains[key].nodes.iter().copied().filter(|node| !seen.contains(node)).collect();
        while !pending.is_empty() {
            let anchored = pending.iter().position(|&node| {
                graph.neighbours(node).iter().any(|neighbour| seen.contains(neighbour))
            });
            let node = pending.remove(anchored.unwrap_or(0));
            seen.insert(node);
            nodes.push(node);
        }
    }
    nodes
}
