//! Placed-template geometry: coordinate mapping, overlap tests, and door
//! alignment between neighbouring rooms.

use crate::catalog::RoomTemplate;
use crate::graph::NodeId;
use crate::types::{CellKind, Pos};

/// A template pinned to an absolute position on behalf of one graph node.
/// `global_position` is where the template's local reference point lands in
/// world coordinates.
#[derive(Clone, Debug)]
pub struct ConfigurationSpace {
    pub template: RoomTemplate,
    pub node: NodeId,
    pub global_position: Pos,
}

impl ConfigurationSpace {
    pub fn new(template: RoomTemplate, node: NodeId, global_position: Pos) -> Self {
        Self { template, node, global_position }
    }

    pub fn to_absolute(&self, local: Pos) -> Pos {
        Pos {
            y: self.global_position.y + local.y - self.template.local_ref.y,
            x: self.global_position.x + local.x - self.template.local_ref.x,
        }
    }

    pub fn to_local(&self, absolute: Pos) -> Pos {
        Pos {
            y: absolute.y - self.global_position.y + self.template.local_ref.y,
            x: absolute.x - self.global_position.x + self.template.local_ref.x,
        }
    }

    /// Absolute positions of every door cell.
    pub fn absolute_doors(&self) -> Vec<Pos> {
        self.template.doors.iter().map(|door| self.to_absolute(door.pos)).collect()
    }

    /// Two placements collide when any non-void cell of one lands on a
    /// non-void cell of the other, except where both cells are outer walls.
    /// Shared outer walls are how adjacent rooms join.
    pub fn overlaps(&self, other: &ConfigurationSpace) -> bool {
        for y in 0..self.template.height() as i32 {
            for x in 0..self.template.width() as i32 {
                let local = Pos { y, x };
                if self.template.cell(local) == CellKind::Skip {
                    continue;
                }
                let absolute = self.to_absolute(local);
                let other_local = other.to_local(absolute);
                if other.template.cell(other_local) == CellKind::Skip {
                    continue;
                }
                if self.is_outer_wall(local) && other.is_outer_wall(other_local) {
                    continue;
                }
                return true;
            }
        }
        false
    }

    /// A wall cell is outer when it sits on the grid border, or when an
    /// uninterrupted straight run of void cells connects it to an edge in at
    /// least one of the four cardinal directions.
    pub fn is_outer_wall(&self, local: Pos) -> bool {
        if self.template.cell(local) != CellKind::Wall {
            return false;
        }
        let height = self.template.height() as i32;
        let width = self.template.width() as i32;
        if local.y == 0 || local.x == 0 || local.y == height - 1 || local.x == width - 1 {
            return true;
        }
        for (dy, dx) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            let mut probe = local.offset(dy, dx);
            while self.template.in_bounds(probe) {
                if self.template.cell(probe) != CellKind::Skip {
                    break;
                }
                probe = probe.offset(dy, dx);
            }
            if !self.template.in_bounds(probe) {
                return true;
            }
        }
        false
    }

    /// Same template shape at the same orientation. Door usage flags and
    /// node identity are ignored.
    pub fn layout_equals(&self, other: &ConfigurationSpace) -> bool {
        self.template.layout == other.template.layout
            && self.template.local_ref == other.template.local_ref
    }

    /// Door pairs of `self` and `other` that coincide in absolute space,
    /// returned as (own local door, other's local door).
    pub fn attaching_points(&self, other: &ConfigurationSpace) -> Vec<(Pos, Pos)> {
        let mut pairs = Vec::new();
        for own in &self.template.doors {
            let absolute = self.to_absolute(own.pos);
            for theirs in &other.template.doors {
                if other.to_absolute(theirs.pos) == absolute {
                    pairs.push((own.pos, theirs.pos));
                }
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Door;

    fn small_square() -> RoomTemplate {
        let w = CellKind::Wall;
        let f = CellKind::Floor;
        RoomTemplate {
            layout: vec![vec![w, w, w], vec![w, f, w], vec![w, w, w]],
            local_ref: Pos { y: 1, x: 1 },
            doors: vec![
                Door { pos: Pos { y: 0, x: 1 }, used: false },
                Door { pos: Pos { y: 1, x: 0 }, used: false },
                Door { pos: Pos { y: 1, x: 2 }, used: false },
                Door { pos: Pos { y: 2, x: 1 }, used: false },
            ],
        }
    }

    fn l_shape() -> RoomTemplate {
        let s = CellKind::Skip;
        let w = CellKind::Wall;
        let f = CellKind::Floor;
        RoomTemplate {
            layout: vec![
                vec![w, w, w, s, s],
                vec![w, f, w, s, s],
                vec![w, f, w, w, w],
                vec![w, f, f, f, w],
                vec![w, w, w, w, w],
            ],
            local_ref: Pos { y: 2, x: 2 },
            doors: Vec::new(),
        }
    }

    #[test]
    fn absolute_and_local_coordinates_invert_each_other() {
        let space = ConfigurationSpace::new(small_square(), 0, Pos { y: 10, x: -4 });
        let local = Pos { y: 2, x: 1 };
        assert_eq!(space.to_local(space.to_absolute(local)), local);
        assert_eq!(space.to_absolute(Pos { y: 1, x: 1 }), Pos { y: 10, x: -4 });
    }

    #[test]
    fn side_by_side_rooms_share_a_wall_without_colliding() {
        let left = ConfigurationSpace::new(small_square(), 0, Pos::ORIGIN);
        let right = ConfigurationSpace::new(small_square(), 1, Pos { y: 0, x: 2 });
        assert!(!left.overlaps(&right));
        assert!(!right.overlaps(&left));
    }

    #[test]
    fn rooms_stacked_on_the_same_spot_collide() {
        let a = ConfigurationSpace::new(small_square(), 0, Pos::ORIGIN);
        let b = ConfigurationSpace::new(small_square(), 1, Pos { y: 0, x: 1 });
        assert!(a.overlaps(&b));
    }

    #[test]
    fn distant_rooms_never_collide() {
        let a = ConfigurationSpace::new(small_square(), 0, Pos::ORIGIN);
        let b = ConfigurationSpace::new(small_square(), 1, Pos { y: 50, x: 50 });
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn inner_corner_wall_reaching_an_edge_through_void_counts_as_outer() {
        let space = ConfigurationSpace::new(l_shape(), 0, Pos::ORIGIN);
        // (2,3) sits inside the grid but only void cells lie above it.
        assert!(space.is_outer_wall(Pos { y: 2, x: 3 }));
        // Border cells are outer by definition.
        assert!(space.is_outer_wall(Pos { y: 0, x: 0 }));
        // A floor cell is never an outer wall.
        assert!(!space.is_outer_wall(Pos { y: 1, x: 1 }));
    }

    #[test]
    fn coinciding_doors_are_reported_as_attaching_points() {
        let left = ConfigurationSpace::new(small_square(), 0, Pos::ORIGIN);
        let right = ConfigurationSpace::new(small_square(), 1, Pos { y: 0, x: 2 });
        let pairs = left.attaching_points(&right);
        assert_eq!(pairs, vec![(Pos { y: 1, x: 2 }, Pos { y: 1, x: 0 })]);
    }

    #[test]
    fn layout_equality_ignores_node_and_position() {
        let a = ConfigurationSpace::new(small_square(), 0, Pos::ORIGIN);
        let b = ConfigurationSpace::new(small_square(), 7, Pos { y: 3, x: 3 });
        assert!(a.layout_equals(&b));
    }
}
