//! Turning a solved placement into a playable level: resolving doors where
//! neighbouring rooms touch, stamping cosmetic variants, and choosing start
//! and end rooms.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::Rng;

use crate::catalog::ReplacementCatalog;
use crate::level::{Cell, Level, Room};
use crate::types::{CellKind, DesignLabel, Pos};

use super::space::ConfigurationSpace;

/// Mark as used every door that coincides with a door of another placed
/// room. Both sides of a junction are marked.
pub(crate) fn resolve_doors(solution: &mut [ConfigurationSpace]) {
    let mut marks: Vec<(usize, Pos)> = Vec::new();
    for i in 0..solution.len() {
        for j in (i + 1)..solution.len() {
            for (own, theirs) in solution[i].attaching_points(&solution[j]) {
                marks.push((i, own));
                marks.push((j, theirs));
            }
        }
    }
    for (index, local) in marks {
        for door in &mut solution[index].template.doors {
            if door.pos == local {
                door.used = true;
            }
        }
    }
}

/// Stamp each placement into a concrete room: used doors become door cells,
/// and the design's first matching replacement sets a cell's variant.
pub(crate) fn materialize_rooms(
    solution: &[ConfigurationSpace],
    design: DesignLabel,
    replacements: &ReplacementCatalog,
) -> Vec<Room> {
    let palette = replacements.replacements_for(design);
    solution
        .iter()
        .map(|space| {
            let mut layout: Vec<Vec<Cell>> = space
                .template
                .layout
                .iter()
                .map(|row| row.iter().map(|&kind| Cell { kind, variant: None }).collect())
                .collect();
            for door in &space.template.doors {
                if door.used {
                    layout[door.pos.y as usize][door.pos.x as usize].kind = CellKind::Door;
                }
            }
            for row in &mut layout {
                for cell in row.iter_mut() {
                    if let Some(replacement) =
                        palette.iter().find(|replacement| replacement.target == cell.kind)
                    {
                        cell.variant = Some(replacement.variant.clone());
                    }
                }
            }
            Room {
                node: space.node,
                global_position: space.global_position,
                local_ref: space.template.local_ref,
                layout,
            }
        })
        .collect()
}

/// Assemble a full level from a solved placement. The end room is drawn
/// uniformly, the start room uniformly among the others; their centre floor
/// tiles become the start and end tiles.
pub(crate) fn assemble(
    mut solution: Vec<ConfigurationSpace>,
    design: DesignLabel,
    replacements: &ReplacementCatalog,
    rng: &mut ChaCha8Rng,
) -> Level {
    resolve_doors(&mut solution);
    let rooms = materialize_rooms(&solution, design, replacements);

    let end_index = (rng.next_u64() as usize) % rooms.len();
    let start_index = if rooms.len() == 1 {
        end_index
    } else {
        let shift = 1 + (rng.next_u64() as usize) % (rooms.len() - 1);
        (end_index + shift) % rooms.len()
    };

    let start_tile = rooms[start_index]
        .center_floor_tile()
        .expect("validated template has at least one floor cell");
    let end_tile = rooms[end_index]
        .center_floor_tile()
        .expect("validated template has at least one floor cell");

    Level::new(rooms, start_tile, end_tile)
}
