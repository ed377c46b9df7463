//! Backtracking placement: picking an absolute position for each node's room
//! so neighbouring rooms share doors and no two rooms illegally overlap.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::Rng;

use crate::catalog::RoomTemplate;
use crate::graph::{Graph, NodeId};
use crate::types::Pos;

use super::space::ConfigurationSpace;

/// Place every node of `solve_order`. Returns the full placement, or `None`
/// when the search space is exhausted.
pub(crate) fn place_all(
    graph: &Graph,
    solve_order: &[NodeId],
    templates: &[RoomTemplate],
    rng: &mut ChaCha8Rng,
) -> Option<Vec<ConfigurationSpace>> {
    solve(graph, solve_order.to_vec(), Vec::new(), templates, rng, 0)
}

fn solve(
    graph: &Graph,
    remaining: Vec<NodeId>,
    partial: Vec<ConfigurationSpace>,
    templates: &[RoomTemplate],
    rng: &mut ChaCha8Rng,
    deferrals: usize,
) -> Option<Vec<ConfigurationSpace>> {
    let Some(&node) = remaining.first() else {
        return Some(partial);
    };

    let placed_neighbours: Vec<usize> = graph
        .neighbours(node)
        .iter()
        .filter_map(|&neighbour| partial.iter().position(|space| space.node == neighbour))
        .collect();

    if placed_neighbours.is_empty() && !partial.is_empty() {
        // Nothing to anchor against yet. Push the node to the back of the
        // queue; a full rotation without progress means the order is stuck.
        if deferrals >= remaining.len() {
            return None;
        }
        let mut rotated = remaining;
        let deferred = rotated.remove(0);
        rotated.push(deferred);
        return solve(graph, rotated, partial, templates, rng, deferrals + 1);
    }

    let mut candidates = if partial.is_empty() {
        templates
            .iter()
            .map(|template| ConfigurationSpace::new(template.clone(), node, Pos::ORIGIN))
            .collect()
    } else {
        intersect_neighbour_candidates(node, &placed_neighbours, templates, &partial)
    };
    if candidates.is_empty() {
        return None;
    }

    shuffle(&mut candidates, rng);

    let rest = remaining[1..].to_vec();
    for candidate in candidates {
        let mut extended = partial.clone();
        extended.push(candidate);
        if let Some(solution) = solve(graph, rest.clone(), extended, templates, rng, 0) {
            return Some(solution);
        }
    }
    None
}

/// Candidates valid against every placed neighbour at once. The first
/// neighbour seeds the pool; each further neighbour regenerates candidates
/// from scratch and keeps only those matching an existing pool entry by
/// position and shape. A neighbour producing nothing resets the pool instead
/// of emptying it, inherited behaviour the rest of the pipeline relies on.
fn intersect_neighbour_candidates(
    node: NodeId,
    placed_neighbours: &[usize],
    templates: &[RoomTemplate],
    partial: &[ConfigurationSpace],
) -> Vec<ConfigurationSpace> {
    let mut pool: Vec<ConfigurationSpace> = Vec::new();
    for &neighbour_index in placed_neighbours {
        let fresh = candidates_against(&partial[neighbour_index], node, templates, partial);
        if pool.is_empty() {
            pool = fresh;
        } else {
            pool = fresh
                .into_iter()
                .filter(|candidate| {
                    pool.iter().any(|kept| {
                        kept.global_position == candidate.global_position
                            && kept.layout_equals(candidate)
                    })
                })
                .collect();
        }
    }
    pool
}

/// Every placement of every template whose doors line up with one of the
/// anchor room's doors and which collides with nothing already placed.
fn candidates_against(
    anchor: &ConfigurationSpace,
    node: NodeId,
    templates: &[RoomTemplate],
    partial: &[ConfigurationSpace],
) -> Vec<ConfigurationSpace> {
    let anchor_doors = anchor.absolute_doors();
    let mut candidates = Vec::new();
    for template in templates {
        let mut positions: Vec<Pos> = Vec::new();
        for &door_abs in &anchor_doors {
            for door in &template.doors {
                let position = Pos {
                    y: door_abs.y - (door.pos.y - template.local_ref.y),
                    x: door_abs.x - (door.pos.x - template.local_ref.x),
                };
                if !positions.contains(&position) {
                    positions.push(position);
                }
            }
        }
        for position in positions {
            let candidate = ConfigurationSpace::new(template.clone(), node, position);
            if partial.iter().all(|placed| !candidate.overlaps(placed)) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

/// Fisher-Yates over the candidate list using the generator's raw stream.
fn shuffle(candidates: &mut [ConfigurationSpace], rng: &mut ChaCha8Rng) {
    for i in (1..candidates.len()).rev() {
        let j = (rng.next_u64() as usize) % (i + 1);
        candidates.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use rand_chacha::rand_core::SeedableRng;

    use crate::catalog::TemplateCatalog;
    use crate::graph::BackEdge;
    use crate::levelgen::chains::decompose;
    use crate::levelgen::sequence::solve_order;
    use crate::types::DesignLabel;

    use super::*;

    fn expanded_templates() -> Vec<RoomTemplate> {
        TemplateCatalog::build_default()
            .templates_for(DesignLabel::Default)
            .iter()
            .flat_map(RoomTemplate::rotations)
            .collect()
    }

    fn solve_graph(graph: &Graph, seed: u64) -> Option<Vec<ConfigurationSpace>> {
        let templates = expanded_templates();
        let chains = decompose(graph);
        let order = solve_order(&chains, graph);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        place_all(graph, &order, &templates, &mut rng)
    }

    #[test]
    fn line_of_three_nodes_places_every_room() {
        let graph = Graph::from_edges(3, &[(0, 1), (1, 2)], Vec::new());
        let solution = solve_graph(&graph, 11).expect("line graph is solvable");
        assert_eq!(solution.len(), 3);
    }

    #[test]
    fn solved_neighbours_share_at_least_one_door_position() {
        let graph = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3)], Vec::new());
        let solution = solve_graph(&graph, 3).expect("path graph is solvable");
        for (a, b) in [(0usize, 1usize), (1, 2), (2, 3)] {
            let room_a = solution.iter().find(|s| s.node == a).expect("placed");
            let room_b = solution.iter().find(|s| s.node == b).expect("placed");
            assert!(
                !room_a.attaching_points(room_b).is_empty(),
                "neighbours {a} and {b} have no coinciding doors"
            );
        }
    }

    #[test]
    fn no_pair_of_placed_rooms_overlaps_illegally() {
        let graph = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)], vec![BackEdge {
            a: 3,
            b: 0,
        }]);
        let solution = solve_graph(&graph, 21).expect("four-cycle is solvable");
        for i in 0..solution.len() {
            for j in (i + 1)..solution.len() {
                assert!(
                    !solution[i].overlaps(&solution[j]),
                    "rooms for nodes {} and {} collide",
                    solution[i].node,
                    solution[j].node
                );
            }
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_placement() {
        let graph = Graph::from_edges(4, &[(0, 1), (1, 2), (1, 3)], Vec::new());
        let first = solve_graph(&graph, 99).expect("solvable");
        let second = solve_graph(&graph, 99).expect("solvable");
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.node, b.node);
            assert_eq!(a.global_position, b.global_position);
            assert!(a.layout_equals(b));
        }
    }

    #[test]
    fn empty_template_list_fails_cleanly() {
        let graph = Graph::from_edges(2, &[(0, 1)], Vec::new());
        let chains = decompose(&graph);
        let order = solve_order(&chains, &graph);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(place_all(&graph, &order, &[], &mut rng).is_none());
    }
}
