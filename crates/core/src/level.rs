//! Final level representation: materialized rooms, a flattened tile cache
//! over the bounding box, and queries the game layer needs.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::graph::NodeId;
use crate::types::{CellKind, Pos};

/// One materialized tile of a room: the structural kind plus an optional
/// cosmetic variant applied from the replacement catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub kind: CellKind,
    pub variant: Option<String>,
}

/// A room fixed in world space with doors already resolved into the layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub node: NodeId,
    pub global_position: Pos,
    pub local_ref: Pos,
    pub layout: Vec<Vec<Cell>>,
}

impl Room {
    pub fn height(&self) -> usize {
        self.layout.len()
    }

    pub fn width(&self) -> usize {
        self.layout.first().map_or(0, Vec::len)
    }

    pub fn to_absolute(&self, local: Pos) -> Pos {
        Pos {
            y: self.global_position.y + local.y - self.local_ref.y,
            x: self.global_position.x + local.x - self.local_ref.x,
        }
    }

    /// Iterate cells with their absolute positions.
    pub fn cells(&self) -> impl Iterator<Item = (Pos, &Cell)> + '_ {
        self.layout.iter().enumerate().flat_map(move |(y, row)| {
            row.iter().enumerate().map(move |(x, cell)| {
                (self.to_absolute(Pos { y: y as i32, x: x as i32 }), cell)
            })
        })
    }

    /// The floor cell closest to the centre of the room's grid, in absolute
    /// coordinates. `None` only for rooms without floor, which validated
    /// templates cannot produce.
    pub fn center_floor_tile(&self) -> Option<Pos> {
        let center_y = self.height() as i32 / 2;
        let center_x = self.width() as i32 / 2;
        let mut best: Option<(i32, Pos)> = None;
        for (y, row) in self.layout.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                if cell.kind != CellKind::Floor {
                    continue;
                }
                let local = Pos { y: y as i32, x: x as i32 };
                let distance = (local.y - center_y).abs() + (local.x - center_x).abs();
                if best.is_none_or(|(current, _)| distance < current) {
                    best = Some((distance, local));
                }
            }
        }
        best.map(|(_, local)| self.to_absolute(local))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Level {
    pub rooms: Vec<Room>,
    pub start_tile: Pos,
    pub end_tile: Pos,
    y_offset: i32,
    x_offset: i32,
    width: usize,
    height: usize,
    tiles: Vec<CellKind>,
}

impl Level {
    /// Build the flattened tile cache over the rooms' bounding box. Where
    /// rooms share a wall the cells agree, except that a resolved door wins
    /// over the partner room's plain wall.
    pub fn new(rooms: Vec<Room>, start_tile: Pos, end_tile: Pos) -> Self {
        let mut min = Pos { y: i32::MAX, x: i32::MAX };
        let mut max = Pos { y: i32::MIN, x: i32::MIN };
        for room in &rooms {
            for (absolute, cell) in room.cells() {
                if cell.kind == CellKind::Skip {
                    continue;
                }
                min.y = min.y.min(absolute.y);
                min.x = min.x.min(absolute.x);
                max.y = max.y.max(absolute.y);
                max.x = max.x.max(absolute.x);
            }
        }
        if rooms.is_empty() || min.y > max.y {
            return Self {
                rooms,
                start_tile,
                end_tile,
                y_offset: 0,
                x_offset: 0,
                width: 0,
                height: 0,
                tiles: Vec::new(),
            };
        }

        let width = (max.x - min.x + 1) as usize;
        let height = (max.y - min.y + 1) as usize;
        let mut tiles = vec![CellKind::Skip; width * height];
        for room in &rooms {
            for (absolute, cell) in room.cells() {
                if cell.kind == CellKind::Skip {
                    continue;
                }
                let index =
                    (absolute.y - min.y) as usize * width + (absolute.x - min.x) as usize;
                // A door resolved in one room must not be walled off by its
                // partner's copy of the shared cell.
                if tiles[index] == CellKind::Door && cell.kind == CellKind::Wall {
                    continue;
                }
                tiles[index] = cell.kind;
            }
        }

        Self {
            rooms,
            start_tile,
            end_tile,
            y_offset: min.y,
            x_offset: min.x,
            width,
            height,
            tiles,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_at(&self, pos: Pos) -> CellKind {
        let y = pos.y - self.y_offset;
        let x = pos.x - self.x_offset;
        if y < 0 || x < 0 || y as usize >= self.height || x as usize >= self.width {
            return CellKind::Skip;
        }
        self.tiles[y as usize * self.width + x as usize]
    }

    pub fn is_walkable(&self, pos: Pos) -> bool {
        matches!(self.tile_at(pos), CellKind::Floor | CellKind::Door)
    }

    /// Breadth-first over walkable tiles.
    pub fn is_reachable(&self, from: Pos, to: Pos) -> bool {
        if !self.is_walkable(from) || !self.is_walkable(to) {
            return false;
        }
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();
        visited.insert(from);
        queue.push_back(from);
        while let Some(current) = queue.pop_front() {
            if current == to {
                return true;
            }
            for (dy, dx) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                let next = current.offset(dy, dx);
                if self.is_walkable(next) && visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        false
    }

    /// Stable byte encoding of everything gameplay-relevant: dimensions,
    /// tile grid, and the start and end tiles.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.tiles.len() + 40);
        for value in [
            self.width as i64,
            self.height as i64,
            self.y_offset as i64,
            self.x_offset as i64,
            self.start_tile.y as i64,
            self.start_tile.x as i64,
            self.end_tile.y as i64,
            self.end_tile.x as i64,
        ] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes.extend(self.tiles.iter().map(|kind| match kind {
            CellKind::Skip => 0u8,
            CellKind::Wall => 1,
            CellKind::Floor => 2,
            CellKind::Door => 3,
        }));
        bytes
    }

    pub fn layout_fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }

    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let pos = Pos { y: y + self.y_offset, x: x + self.x_offset };
                let symbol = if pos == self.start_tile {
                    'S'
                } else if pos == self.end_tile {
                    'E'
                } else {
                    match self.tile_at(pos) {
                        CellKind::Skip => ' ',
                        CellKind::Wall => '#',
                        CellKind::Floor => '.',
                        CellKind::Door => '+',
                    }
                };
                out.push(symbol);
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(kind: CellKind) -> Cell {
        Cell { kind, variant: None }
    }

    fn square_room(node: NodeId, global_position: Pos, door_local: Pos) -> Room {
        let mut layout: Vec<Vec<Cell>> = (0..3)
            .map(|y| {
                (0..3)
                    .map(|x| {
                        if y == 1 && x == 1 {
                            plain(CellKind::Floor)
                        } else {
                            plain(CellKind::Wall)
                        }
                    })
                    .collect()
            })
            .collect();
        layout[door_local.y as usize][door_local.x as usize] = plain(CellKind::Door);
        Room { node, global_position, local_ref: Pos { y: 1, x: 1 }, layout }
    }

    fn two_room_level() -> Level {
        // Two squares sharing the wall column between them, joined by a door.
        let left = square_room(0, Pos::ORIGIN, Pos { y: 1, x: 2 });
        let right = square_room(1, Pos { y: 0, x: 2 }, Pos { y: 1, x: 0 });
        Level::new(vec![left, right], Pos::ORIGIN, Pos { y: 0, x: 2 })
    }

    #[test]
    fn bounding_box_covers_both_rooms() {
        let level = two_room_level();
        assert_eq!(level.width(), 5);
        assert_eq!(level.height(), 3);
        assert_eq!(level.tile_at(Pos { y: 0, x: 0 }), CellKind::Floor);
        assert_eq!(level.tile_at(Pos { y: 0, x: 2 }), CellKind::Floor);
        assert_eq!(level.tile_at(Pos { y: 0, x: 1 }), CellKind::Door);
        assert_eq!(level.tile_at(Pos { y: -1, x: -1 }), CellKind::Wall);
        assert_eq!(level.tile_at(Pos { y: 9, x: 9 }), CellKind::Skip);
    }

    #[test]
    fn door_is_not_walled_off_by_the_partner_room() {
        // Right room writes a plain wall at the door cell; the door written
        // by the left room must survive regardless of paint order.
        let left = square_room(0, Pos::ORIGIN, Pos { y: 1, x: 2 });
        let mut right = square_room(1, Pos { y: 0, x: 2 }, Pos { y: 1, x: 0 });
        right.layout[1][0] = Cell { kind: CellKind::Wall, variant: None };
        let level = Level::new(vec![left, right], Pos::ORIGIN, Pos { y: 0, x: 2 });
        assert_eq!(level.tile_at(Pos { y: 0, x: 1 }), CellKind::Door);
    }

    #[test]
    fn end_tile_is_reachable_through_the_shared_door() {
        let level = two_room_level();
        assert!(level.is_reachable(level.start_tile, level.end_tile));
    }

    #[test]
    fn walled_off_tile_is_unreachable() {
        let left = square_room(0, Pos::ORIGIN, Pos { y: 1, x: 2 });
        let mut right = square_room(1, Pos { y: 0, x: 2 }, Pos { y: 1, x: 0 });
        // Seal both copies of the shared cell.
        right.layout[1][0] = plain(CellKind::Wall);
        let mut sealed_left = left.clone();
        sealed_left.layout[1][2] = plain(CellKind::Wall);
        let level = Level::new(vec![sealed_left, right], Pos::ORIGIN, Pos { y: 0, x: 2 });
        assert!(!level.is_reachable(level.start_tile, level.end_tile));
    }

    #[test]
    fn fingerprint_is_stable_and_sensitive_to_layout_changes() {
        let level = two_room_level();
        assert_eq!(level.layout_fingerprint(), two_room_level().layout_fingerprint());

        let left = square_room(0, Pos::ORIGIN, Pos { y: 1, x: 2 });
        let right = square_room(1, Pos { y: 0, x: 2 }, Pos { y: 1, x: 0 });
        let moved_end = Level::new(vec![left, right], Pos::ORIGIN, Pos { y: 0, x: 0 });
        assert_ne!(level.layout_fingerprint(), moved_end.layout_fingerprint());
    }

    #[test]
    fn center_floor_tile_prefers_the_middle_of_the_room() {
        let room = square_room(0, Pos { y: 4, x: 4 }, Pos { y: 1, x: 2 });
        assert_eq!(room.center_floor_tile(), Some(Pos { y: 4, x: 4 }));
    }

    #[test]
    fn render_marks_start_and_end() {
        let level = two_room_level();
        let art = level.render_ascii();
        assert!(art.contains('S'));
        assert!(art.contains('E'));
        assert_eq!(art.lines().count(), level.height());
    }
}
